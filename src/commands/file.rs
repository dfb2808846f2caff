//! `file` module - idempotent file state

use anyhow::{Context as _, Result};
use converge::{DesiredFileState, Reconciler};

use crate::Context;
use crate::cli::FileArgs;
use crate::module::{FileParams, ModeParam};
use crate::paths;
use crate::report::{self, FileReport};

/// Run from command-line flags
pub fn run(ctx: &Context, args: FileArgs) -> Result<()> {
    let params = FileParams {
        state: args.state.into(),
        path: paths::anchor(&args.path)?,
        content: args.content.unwrap_or_default(),
        mode: args.mode.map(ModeParam::Octal),
        owner: args.owner,
        group: args.group,
    };

    let mut desired = params.into_desired()?;
    if let Some(file) = &args.content_file {
        desired.content = std::fs::read(file)
            .with_context(|| format!("Could not read content from {}", file.display()))?;
    }

    apply(ctx, desired, args.check, args.diff)
}

/// Reconcile one file and emit the report
pub fn apply(
    ctx: &Context,
    desired: DesiredFileState,
    check_mode: bool,
    diff: bool,
) -> Result<()> {
    log::debug!("Desired state: {desired:?}");

    let result = Reconciler::system()
        .with_diff(diff)
        .reconcile(&desired, check_mode)
        .with_context(|| format!("Failed to reconcile {}", desired.path.display()))?;

    report::emit(
        ctx.format,
        &FileReport::new(&desired.path, desired.presence, result),
    )
}
