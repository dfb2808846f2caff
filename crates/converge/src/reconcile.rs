//! Reconciliation engine - converges a file to its desired state
//!
//! One call observes the path once, decides whether anything must change,
//! and applies the smallest set of operations that gets there:
//!
//! - `absent`: remove the file if it exists
//! - `present`: rewrite the content and mode when either differs, creating
//!   parent directories for new files and applying ownership on every write
//!
//! Ownership never factors into the change decision. A file whose content
//! and mode already match is left alone even if its owner differs.
//!
//! Nothing is retried or rolled back: if the write succeeds and a later
//! chmod fails, the new content stays on disk and the error is returned.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::checksum::hash_file;
use crate::diff::FileDiff;
use crate::error::{Error, FsOp, Result};
use crate::identity::{IdentityResolver, SystemAccounts};
use crate::observe::observe;
use crate::types::{DesiredFileState, ObservedFileState, Presence, ReconciliationResult};

/// Applies desired file states
pub struct Reconciler {
    identities: Box<dyn IdentityResolver>,
    capture_diff: bool,
}

impl Reconciler {
    /// Create a reconciler using the given identity resolver
    pub fn new(identities: impl IdentityResolver + 'static) -> Self {
        Self {
            identities: Box::new(identities),
            capture_diff: false,
        }
    }

    /// Create a reconciler backed by the system account database
    pub fn system() -> Self {
        Self::new(SystemAccounts)
    }

    /// Include before/after snapshots in results
    pub fn with_diff(mut self, capture_diff: bool) -> Self {
        self.capture_diff = capture_diff;
        self
    }

    /// Converge `desired.path` to `desired`
    ///
    /// With `dry_run` set nothing on disk is touched, but `changed` and
    /// `size` are reported as if the change had been made.
    pub fn reconcile(
        &self,
        desired: &DesiredFileState,
        dry_run: bool,
    ) -> Result<ReconciliationResult> {
        let observed = observe(&desired.path, desired.presence)?;
        log::debug!(
            "{}: exists={}, desired={}{}",
            desired.path.display(),
            observed.exists,
            desired.presence,
            if dry_run { " (dry run)" } else { "" }
        );

        match desired.presence {
            Presence::Absent => self.reconcile_absent(&desired.path, &observed, dry_run),
            Presence::Present => self.reconcile_present(desired, &observed, dry_run),
        }
    }

    fn reconcile_absent(
        &self,
        path: &Path,
        observed: &ObservedFileState,
        dry_run: bool,
    ) -> Result<ReconciliationResult> {
        if !observed.exists {
            return Ok(ReconciliationResult::unchanged());
        }

        // Content is only observed for present files, so read it here for the diff
        let diff = if self.capture_diff {
            let before = fs::read(path).map_err(|e| Error::io(FsOp::Read, path, e))?;
            Some(FileDiff::new(path, Some(&before), None))
        } else {
            None
        };

        if dry_run {
            log::info!("Would remove {}", path.display());
        } else {
            fs::remove_file(path).map_err(|e| Error::io(FsOp::Remove, path, e))?;
            log::info!("Removed {}", path.display());
        }

        Ok(ReconciliationResult {
            changed: true,
            diff,
            ..ReconciliationResult::unchanged()
        })
    }

    fn reconcile_present(
        &self,
        desired: &DesiredFileState,
        observed: &ObservedFileState,
        dry_run: bool,
    ) -> Result<ReconciliationResult> {
        let path = desired.path.as_path();
        let changed = needs_change(desired, observed);

        if changed {
            if dry_run {
                log::info!("Would write {} bytes to {}", desired.content.len(), path.display());
            } else {
                self.write(desired, observed.exists)?;
            }
        }

        let current: &[u8] = if changed {
            &desired.content
        } else {
            observed.content.as_deref().unwrap_or_default()
        };

        let checksum = if dry_run && !observed.exists {
            None
        } else {
            Some(hash_file(path)?)
        };

        Ok(ReconciliationResult {
            changed,
            size: Some(current.len() as u64),
            checksum,
            diff: self
                .capture_diff
                .then(|| FileDiff::new(path, observed.content.as_deref(), Some(current))),
        })
    }

    /// Truncate-and-replace the content, then apply mode and ownership
    fn write(&self, desired: &DesiredFileState, existed: bool) -> Result<()> {
        let path = desired.path.as_path();

        // Resolve before touching the file so an unknown name leaves it as it was
        let uid = desired
            .owner
            .as_deref()
            .map(|name| self.identities.resolve_user(name))
            .transpose()?;
        let gid = desired
            .group
            .as_deref()
            .map(|name| self.identities.resolve_group(name))
            .transpose()?;

        if !existed
            && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(FsOp::CreateDir, parent, e))?;
        }

        fs::write(path, &desired.content).map_err(|e| Error::io(FsOp::Write, path, e))?;
        log::info!("Wrote {} bytes to {}", desired.content.len(), path.display());

        if let Some(mode) = desired.mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
                .map_err(|e| Error::io(FsOp::Chmod, path, e))?;
            log::debug!("Set mode {mode} on {}", path.display());
        }

        if desired.manages_ownership() {
            std::os::unix::fs::chown(path, uid, gid)
                .map_err(|e| Error::io(FsOp::Chown, path, e))?;
            log::debug!("Set ownership {uid:?}:{gid:?} on {}", path.display());
        }

        Ok(())
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::system()
    }
}

/// Content or managed mode differs; a missing file always needs a write
fn needs_change(desired: &DesiredFileState, observed: &ObservedFileState) -> bool {
    if !observed.exists {
        return true;
    }

    let content_differs = observed.content.as_deref() != Some(desired.content.as_slice());
    let mode_differs = desired.mode.is_some_and(|mode| observed.mode != Some(mode));

    content_differs || mode_differs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::identity::StaticIdentities;
    use crate::mode::FileMode;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(StaticIdentities::new())
    }

    #[test]
    fn test_create_new_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hello.txt");
        let desired = DesiredFileState::present(&path, "hello")
            .with_mode_str("0644")
            .unwrap();

        let result = reconciler().reconcile(&desired, false).unwrap();

        assert!(result.changed);
        assert_eq!(result.size, Some(5));
        assert_eq!(
            result.checksum.as_deref(),
            Some(blake3::hash(b"hello").to_hex().as_str())
        );
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert_eq!(mode_of(&path), 0o644);
    }

    #[test]
    fn test_reapply_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hello.txt");
        fs::write(&path, "hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let desired = DesiredFileState::present(&path, "hello")
            .with_mode_str("0644")
            .unwrap();

        let result = reconciler().reconcile(&desired, false).unwrap();

        assert!(!result.changed);
        assert_eq!(result.size, Some(5));
        assert!(result.checksum.is_some());
    }

    #[test]
    fn test_idempotent_sequence() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conf");
        let desired = DesiredFileState::present(&path, "a = 1\n")
            .with_mode_str("600")
            .unwrap();
        let r = reconciler();

        let first = r.reconcile(&desired, false).unwrap();
        let second = r.reconcile(&desired, false).unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.checksum, second.checksum);
    }

    #[test]
    fn test_remove_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone");
        fs::write(&path, "bye").unwrap();

        let result = reconciler()
            .reconcile(&DesiredFileState::absent(&path), false)
            .unwrap();

        assert!(result.changed);
        assert!(result.size.is_none());
        assert!(result.checksum.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_absent_when_missing_is_noop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("never");

        let result = reconciler()
            .reconcile(&DesiredFileState::absent(&path), false)
            .unwrap();

        assert_eq!(result, ReconciliationResult::unchanged());
        assert!(!path.exists());
    }

    #[test]
    fn test_content_change_rewrites_whole_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "a much longer original body").unwrap();

        let result = reconciler()
            .reconcile(&DesiredFileState::present(&path, "short"), false)
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.size, Some(5));
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_mode_only_change() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "same").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let desired = DesiredFileState::present(&path, "same")
            .with_mode(FileMode::from_bits(0o600).unwrap());
        let result = reconciler().reconcile(&desired, false).unwrap();

        assert!(result.changed);
        assert_eq!(mode_of(&path), 0o600);
    }

    #[test]
    fn test_unmanaged_mode_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "same").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let result = reconciler()
            .reconcile(&DesiredFileState::present(&path, "same"), false)
            .unwrap();

        assert!(!result.changed);
        assert_eq!(mode_of(&path), 0o600);
    }

    #[test]
    fn test_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("c.txt");

        let result = reconciler()
            .reconcile(&DesiredFileState::present(&path, "deep"), false)
            .unwrap();

        assert!(result.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "deep");
    }

    #[test]
    fn test_empty_content_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty");

        let result = reconciler()
            .reconcile(&DesiredFileState::present(&path, ""), false)
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.size, Some(0));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_dry_run_create_does_not_touch_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub").join("new.txt");
        let desired = DesiredFileState::present(&path, "hello")
            .with_mode_str("0644")
            .unwrap();

        let result = reconciler().reconcile(&desired, true).unwrap();

        assert!(result.changed);
        assert_eq!(result.size, Some(5));
        assert!(result.checksum.is_none());
        assert!(!path.exists());
        assert!(!tmp.path().join("sub").exists());
    }

    #[test]
    fn test_dry_run_update_keeps_old_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let desired = DesiredFileState::present(&path, "newer")
            .with_mode_str("0600")
            .unwrap();
        let result = reconciler().reconcile(&desired, true).unwrap();

        assert!(result.changed);
        assert_eq!(result.size, Some(5));
        // Checksum describes what is actually on disk
        assert_eq!(
            result.checksum.as_deref(),
            Some(blake3::hash(b"old").to_hex().as_str())
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(mode_of(&path), 0o644);
    }

    #[test]
    fn test_dry_run_remove_keeps_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "keep").unwrap();

        let result = reconciler()
            .reconcile(&DesiredFileState::absent(&path), true)
            .unwrap();

        assert!(result.changed);
        assert!(path.exists());
    }

    #[test]
    fn test_ownership_applied_on_write() {
        let tmp = TempDir::new().unwrap();
        let probe = tmp.path().join("probe");
        fs::write(&probe, "").unwrap();
        let meta = fs::metadata(&probe).unwrap();

        let ids = StaticIdentities::new()
            .with_user("me", meta.uid())
            .with_group("mine", meta.gid());
        let path = tmp.path().join("owned");
        let desired = DesiredFileState::present(&path, "x")
            .with_owner("me")
            .with_group("mine");

        let result = Reconciler::new(ids).reconcile(&desired, false).unwrap();

        assert!(result.changed);
        let owned = fs::metadata(&path).unwrap();
        assert_eq!(owned.uid(), meta.uid());
        assert_eq!(owned.gid(), meta.gid());
    }

    #[test]
    fn test_ownership_alone_does_not_register_change() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "same").unwrap();

        // Unknown owner is never resolved because no write happens
        let desired = DesiredFileState::present(&path, "same").with_owner("somebody-else");
        let result = reconciler().reconcile(&desired, false).unwrap();

        assert!(!result.changed);
        assert_eq!(result.size, Some(4));
    }

    #[test]
    fn test_unknown_owner_fails_before_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        let desired = DesiredFileState::present(&path, "data").with_owner("ghost");

        let err = reconciler().reconcile(&desired, false).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IdentityResolutionFailure);
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_owner_ignored_in_dry_run() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        let desired = DesiredFileState::present(&path, "data").with_owner("ghost");

        let result = reconciler().reconcile(&desired, true).unwrap();
        assert!(result.changed);
    }

    #[test]
    fn test_parent_is_a_file_is_io_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = reconciler()
            .reconcile(&DesiredFileState::present(blocker.join("child"), "x"), false)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_absent_on_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir");
        fs::create_dir(&dir).unwrap();

        let err = reconciler()
            .reconcile(&DesiredFileState::absent(&dir), false)
            .unwrap_err();

        assert!(matches!(err, Error::Io { op: FsOp::Remove, .. }));
        assert!(dir.exists());
    }

    #[test]
    fn test_diff_capture() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "one\n").unwrap();

        let result = reconciler()
            .with_diff(true)
            .reconcile(&DesiredFileState::present(&path, "two\n"), true)
            .unwrap();

        let diff = result.diff.unwrap();
        assert_eq!(diff.before, "one\n");
        assert_eq!(diff.after, "two\n");
        assert!(diff.has_changes());
    }

    #[test]
    fn test_diff_capture_on_remove() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        fs::write(&path, "last words\n").unwrap();

        let result = reconciler()
            .with_diff(true)
            .reconcile(&DesiredFileState::absent(&path), false)
            .unwrap();

        let diff = result.diff.unwrap();
        assert_eq!(diff.before, "last words\n");
        assert_eq!(diff.before_header, path.display().to_string());
        assert_eq!(diff.after, "");
        assert_eq!(diff.after_header, "/dev/null");
        assert!(!path.exists());
    }

    #[test]
    fn test_no_diff_by_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");

        let result = reconciler()
            .reconcile(&DesiredFileState::present(&path, "x"), true)
            .unwrap();
        assert!(result.diff.is_none());
    }

    #[test]
    fn test_needs_change_rules() {
        let desired = DesiredFileState::present("/x", "abc")
            .with_mode(FileMode::from_bits(0o644).unwrap());

        let matching = ObservedFileState {
            exists: true,
            content: Some(b"abc".to_vec()),
            mode: Some(FileMode::from_bits(0o644).unwrap()),
        };
        assert!(!needs_change(&desired, &matching));

        let other_mode = ObservedFileState {
            mode: Some(FileMode::from_bits(0o600).unwrap()),
            ..matching.clone()
        };
        assert!(needs_change(&desired, &other_mode));

        assert!(needs_change(&desired, &ObservedFileState::missing()));
    }
}
