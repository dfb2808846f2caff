mod cli;
mod commands;
mod module;
mod paths;
mod report;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use report::FailureReport;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub format: OutputFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity; logs go to stderr, reports to stdout
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context { format: cli.format };

    let outcome = match cli.command {
        Command::File(args) => commands::file::run(&ctx, args),
        Command::AuthTest(args) => commands::auth::run(&ctx, args),
        Command::Module { name, args_file } => commands::run_module(&ctx, name, &args_file),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "filekeep", &mut io::stdout());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{err:?}");
            if let Err(emit_err) = report::emit(ctx.format, &FailureReport::from_error(&err)) {
                ui::failed(&format!("{err:#} (report could not be written: {emit_err})"));
            }
            ExitCode::FAILURE
        }
    }
}
