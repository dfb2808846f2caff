//! Current-state detection

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, FsOp, Result};
use crate::mode::FileMode;
use crate::types::{ObservedFileState, Presence};

/// Inspect the filesystem at `path`
///
/// Content is only read when the file exists and `presence` is
/// [`Presence::Present`]; deleting a file never needs its bytes.
/// A missing path is a normal observation, any other stat failure is an error.
pub fn observe(path: &Path, presence: Presence) -> Result<ObservedFileState> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(ObservedFileState::missing());
        }
        Err(e) => return Err(Error::io(FsOp::Stat, path, e)),
    };

    let content = match presence {
        Presence::Present => Some(fs::read(path).map_err(|e| Error::io(FsOp::Read, path, e))?),
        Presence::Absent => None,
    };

    Ok(ObservedFileState {
        exists: true,
        content,
        mode: Some(FileMode::from_st_mode(metadata.permissions().mode())),
    })
}
