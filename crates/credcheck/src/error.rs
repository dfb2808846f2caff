//! Error types for the credcheck crate

use thiserror::Error;

/// Errors that can occur while validating credentials
#[derive(Error, Debug)]
pub enum Error {
    /// Key could not be decoded as JSON in any of the accepted forms
    #[error("service account key is not valid JSON: {reason}")]
    MalformedInput { reason: String },
}

/// Result type for credcheck operations
pub type Result<T> = std::result::Result<T, Error>;
