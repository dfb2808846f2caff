//! Before/after snapshots for diff output

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text of a file before and after reconciliation
///
/// Mirrors the `before`/`after` shape automation hosts expect when they
/// run modules in diff mode. Non-UTF-8 bytes are replaced lossily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub before: String,
    pub after: String,
    pub before_header: String,
    pub after_header: String,
}

impl FileDiff {
    pub fn new(path: &Path, before: Option<&[u8]>, after: Option<&[u8]>) -> Self {
        let header = path.display().to_string();
        Self {
            before: before
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            after: after
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            before_header: if before.is_some() {
                header.clone()
            } else {
                "/dev/null".to_string()
            },
            after_header: if after.is_some() {
                header
            } else {
                "/dev/null".to_string()
            },
        }
    }

    /// Whether the two sides differ
    pub fn has_changes(&self) -> bool {
        self.before != self.after || self.before_header != self.after_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_uses_dev_null_header() {
        let diff = FileDiff::new(Path::new("/tmp/x"), None, Some(b"hello"));
        assert_eq!(diff.before_header, "/dev/null");
        assert_eq!(diff.after_header, "/tmp/x");
        assert_eq!(diff.after, "hello");
        assert!(diff.has_changes());
    }

    #[test]
    fn test_identical_sides_have_no_changes() {
        let diff = FileDiff::new(Path::new("/tmp/x"), Some(b"a\n"), Some(b"a\n"));
        assert!(!diff.has_changes());
    }
}
