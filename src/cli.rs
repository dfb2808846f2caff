use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filekeep")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Idempotent file and credential-check modules for automation hosts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report format written to stdout
    #[arg(long, value_enum, global = true, env = "FILEKEEP_FORMAT", default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ensure a file exists with the given content, mode and ownership, or is absent
    File(FileArgs),

    /// Check the shape of a service-account key and folder id (no network calls)
    AuthTest(AuthTestArgs),

    /// Run a module with arguments read from a host-supplied JSON file
    Module {
        /// Module to run
        #[arg(value_enum)]
        name: ModuleName,

        /// JSON arguments file, or '-' for stdin
        args_file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModuleName {
    File,
    AuthTest,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for converge::Presence {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Parser)]
pub struct FileArgs {
    /// Path of the managed file (~ and $VARS are expanded)
    #[arg(short, long)]
    pub path: String,

    /// Whether the file should exist
    #[arg(short, long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// File content
    #[arg(short, long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read file content from this file instead (copied byte for byte)
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Permission bits as an octal string, e.g. 0644
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Owning user name
    #[arg(long)]
    pub owner: Option<String>,

    /// Owning group name
    #[arg(long)]
    pub group: Option<String>,

    /// Report what would change without touching the filesystem
    #[arg(long, env = "FILEKEEP_CHECK_MODE")]
    pub check: bool,

    /// Include before/after content in the report
    #[arg(long)]
    pub diff: bool,
}

// ============================================================================
// Auth Test
// ============================================================================

#[derive(Parser)]
pub struct AuthTestArgs {
    /// Service-account key as JSON text (escaped quotes are accepted)
    #[arg(long)]
    pub service_account_key: String,

    /// Folder identifier
    #[arg(long)]
    pub folder_id: String,

    /// Only validate the format (remote verification is not supported)
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub validate_only: bool,
}
