//! Content checksums

use blake3::Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, FsOp, Result};

/// Compute the BLAKE3 hash of a file, hex-encoded
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(FsOp::Read, path, e))?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = Hasher::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::io(FsOp::Read, path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
