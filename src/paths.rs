//! Path handling for module arguments
//!
//! Paths accept `~` and environment variables, the way automation hosts
//! treat `path`-typed arguments. Unset variables are left as written.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Expand `~` and `$VARS` in a path
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Anchor a relative command-line path at the current directory
///
/// Module arguments must already be absolute; this is only for interactive use.
pub fn anchor(path: &str) -> Result<String> {
    if expand(path).is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    Ok(cwd.join(path).to_string_lossy().into_owned())
}
