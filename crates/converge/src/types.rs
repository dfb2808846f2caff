//! Core types for file reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::diff::FileDiff;
use crate::error::Result;
use crate::mode::{FileMode, parse_mode};

/// Whether the file should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// File exists with the desired content
    #[default]
    Present,
    /// File does not exist
    Absent,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative target for a single file
///
/// `mode`, `owner` and `group` left as `None` are not managed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredFileState {
    pub path: PathBuf,
    pub presence: Presence,
    pub content: Vec<u8>,
    pub mode: Option<FileMode>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl DesiredFileState {
    /// A file that should exist with the given content
    pub fn present(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            presence: Presence::Present,
            content: content.into(),
            mode: None,
            owner: None,
            group: None,
        }
    }

    /// A file that should not exist
    pub fn absent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            presence: Presence::Absent,
            content: Vec::new(),
            mode: None,
            owner: None,
            group: None,
        }
    }

    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the mode from an octal string such as `0644`
    pub fn with_mode_str(self, mode: &str) -> Result<Self> {
        Ok(self.with_mode(parse_mode(mode)?))
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Whether ownership is managed at all
    pub fn manages_ownership(&self) -> bool {
        self.owner.is_some() || self.group.is_some()
    }
}

/// What is on disk at the target path right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedFileState {
    pub exists: bool,
    /// Only read when the file exists and should be present
    pub content: Option<Vec<u8>>,
    pub mode: Option<FileMode>,
}

impl ObservedFileState {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Outcome of a single reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// A corrective action was taken (or would be, in dry-run)
    pub changed: bool,
    /// Content length after reconciliation, when the file is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// BLAKE3 hex digest of the file as read back from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<FileDiff>,
}

impl ReconciliationResult {
    pub fn unchanged() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_display_and_default() {
        assert_eq!(Presence::Absent.to_string(), "absent");
        assert_eq!(Presence::Present.as_str(), "present");
        assert_eq!(Presence::default(), Presence::Present);
    }

    #[test]
    fn test_builders() {
        let desired = DesiredFileState::present("/tmp/a", "hi")
            .with_mode_str("0600")
            .unwrap()
            .with_owner("root");

        assert_eq!(desired.presence, Presence::Present);
        assert_eq!(desired.content, b"hi");
        assert_eq!(desired.mode.map(FileMode::bits), Some(0o600));
        assert!(desired.manages_ownership());

        let absent = DesiredFileState::absent("/tmp/a");
        assert!(absent.content.is_empty());
        assert!(!absent.manages_ownership());
    }

    #[test]
    fn test_with_mode_str_rejects_invalid() {
        assert!(DesiredFileState::present("/tmp/a", "").with_mode_str("abc").is_err());
    }
}
