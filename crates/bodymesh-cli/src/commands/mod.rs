//! CLI command definitions and handlers.

pub mod create;
pub mod measure;
pub mod serve;
mod wiring;

use clap::{Parser, Subcommand};

/// Bodymesh - body measurements and 3D avatar sessions
#[derive(Parser)]
#[command(name = "bodymesh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Compute measurements from landmark JSON files, offline
    Measure(measure::MeasureArgs),
    /// Create one avatar and start its reconstruction session
    Create(create::CreateArgs),
    /// Run the session poller until interrupted
    Serve(serve::ServeArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
