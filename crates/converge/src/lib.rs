//! # Converge
//!
//! Idempotent file reconciliation.
//!
//! This crate compares the desired state of a single file against what is
//! on disk and applies the minimal set of operations to make them match.
//!
//! ## Core Concepts
//!
//! - **DesiredFileState**: What the file should look like (presence, content, mode, ownership)
//! - **ObservedFileState**: What the file looks like right now, read fresh on every call
//! - **Reconciler**: Compares the two and converges, optionally as a dry run
//! - **ReconciliationResult**: Whether anything changed, plus size and checksum
//!
//! ## Example
//!
//! ```no_run
//! use converge::{DesiredFileState, Reconciler};
//!
//! let desired = DesiredFileState::present("/tmp/motd", "hello")
//!     .with_mode_str("0644")?;
//!
//! let reconciler = Reconciler::system();
//! let result = reconciler.reconcile(&desired, false)?;
//! assert_eq!(result.size, Some(5));
//!
//! // Applying the same state again is a no-op
//! let again = reconciler.reconcile(&desired, false)?;
//! assert!(!again.changed);
//! # Ok::<(), converge::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! Owner and group names are resolved through [`IdentityResolver`], so the
//! account database can be swapped out in tests or for hosts that resolve
//! identities themselves.

pub mod checksum;
pub mod diff;
pub mod error;
pub mod identity;
pub mod mode;
pub mod observe;
pub mod reconcile;
pub mod types;

// Re-export main types at crate root
pub use checksum::hash_file;
pub use diff::FileDiff;
pub use error::{Error, ErrorKind, FsOp, Result};
pub use identity::{IdentityKind, IdentityResolver, StaticIdentities, SystemAccounts};
pub use mode::{FileMode, parse_mode};
pub use observe::observe;
pub use reconcile::Reconciler;
pub use types::{DesiredFileState, ObservedFileState, Presence, ReconciliationResult};
