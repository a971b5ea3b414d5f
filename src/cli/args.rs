//! CLI argument definitions using clap
//!
//! Commands:
//! - restorecheck run
//! - restorecheck status

use clap::{Parser, Subcommand};

/// restorecheck - daily restorability verification for managed PostgreSQL backups
#[derive(Parser, Debug)]
#[command(name = "restorecheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify today's backups for every managed server
    Run,

    /// Print the outcome of the last completed verification pass
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
