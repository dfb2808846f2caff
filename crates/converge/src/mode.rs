//! Permission mode parsing

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Highest value a permission mode may take (setuid, setgid, sticky + rwx)
const MAX_MODE: u32 = 0o7777;

/// Permission bits of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(u32);

impl FileMode {
    /// Wrap raw permission bits, rejecting anything above `0o7777`
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits > MAX_MODE {
            return Err(Error::InvalidMode(format!("{bits:o}")));
        }
        Ok(Self(bits))
    }

    /// Extract the permission bits from a full `st_mode` value
    pub fn from_st_mode(st_mode: u32) -> Self {
        Self(st_mode & MAX_MODE)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

/// Parse an octal mode string such as `0644`, `644` or `0o644`
pub fn parse_mode(input: &str) -> Result<FileMode> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(Error::InvalidMode(input.to_string()));
    }

    let bits =
        u32::from_str_radix(digits, 8).map_err(|_| Error::InvalidMode(input.to_string()))?;
    if bits > MAX_MODE {
        return Err(Error::InvalidMode(input.to_string()));
    }
    Ok(FileMode(bits))
}
