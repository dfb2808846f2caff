//! `auth-test` module - offline credential shape check

use anyhow::Result;
use credcheck::AuthCheckRequest;
use serde_json::Value;

use crate::Context;
use crate::cli::AuthTestArgs;
use crate::report::{self, AuthReport};

/// Run from command-line flags
pub fn run(ctx: &Context, args: AuthTestArgs) -> Result<()> {
    let request = AuthCheckRequest {
        service_account_key: Value::String(args.service_account_key),
        folder_id: args.folder_id,
        validate_only: args.validate_only,
    };
    apply(ctx, &request)
}

/// Check the request and emit the report
///
/// A malformed key is part of the report, never a failure.
pub fn apply(ctx: &Context, request: &AuthCheckRequest) -> Result<()> {
    let outcome = credcheck::check(request);
    log::info!(
        "Credential check for folder {}: validation_passed={}, authenticated={}",
        outcome.folder_id,
        outcome.validation_passed,
        outcome.authenticated
    );
    report::emit(ctx.format, &AuthReport(outcome))
}
