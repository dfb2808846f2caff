pub mod auth;
pub mod file;

use anyhow::Result;
use std::path::Path;

use crate::Context;
use crate::cli::ModuleName;
use crate::module::{self, AuthTestParams, FileParams, Invocation};

/// Run a module with host-supplied arguments
pub fn run_module(ctx: &Context, name: ModuleName, args_file: &Path) -> Result<()> {
    let raw = module::read_args_file(args_file)?;

    match name {
        ModuleName::File => {
            let Invocation {
                params,
                check_mode,
                diff,
            } = module::parse_invocation::<FileParams>(&raw)?;
            file::apply(ctx, params.into_desired()?, check_mode, diff)
        }
        ModuleName::AuthTest => {
            let invocation = module::parse_invocation::<AuthTestParams>(&raw)?;
            auth::apply(ctx, &invocation.params.into())
        }
    }
}
