//! Error types for the converge crate

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::identity::IdentityKind;

/// Filesystem operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Stat,
    Read,
    Write,
    Remove,
    CreateDir,
    Chmod,
    Chown,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Stat => "stat",
            Self::Read => "read",
            Self::Write => "write",
            Self::Remove => "remove",
            Self::CreateDir => "create directory",
            Self::Chmod => "change mode of",
            Self::Chown => "change ownership of",
        };
        f.write_str(verb)
    }
}

/// Broad category of a failure, as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A filesystem operation failed
    IoFailure,
    /// An owner or group name could not be resolved
    IdentityResolutionFailure,
    /// An argument could not be interpreted
    MalformedInput,
}

/// Errors that can occur while reconciling a file
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failed
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Name not present in the account database
    #[error("{kind} '{name}' does not exist")]
    UnknownIdentity { kind: IdentityKind, name: String },

    /// Account database lookup itself failed
    #[error("failed to look up {kind} '{name}': {source}")]
    IdentityLookup {
        kind: IdentityKind,
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Mode string is not a valid octal permission value
    #[error("invalid mode '{0}': expected an octal permission string such as 0644")]
    InvalidMode(String),
}

impl Error {
    pub(crate) fn io(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::UnknownIdentity { .. } | Self::IdentityLookup { .. } => {
                ErrorKind::IdentityResolutionFailure
            }
            Self::InvalidMode(_) => ErrorKind::MalformedInput,
        }
    }
}

/// Result type for converge operations
pub type Result<T> = std::result::Result<T, Error>;
