//! CLI module for restorecheck
//!
//! Provides the command-line interface:
//! - run: execute today's verification pass (parameter-free; everything
//!   comes from the catalog snapshot)
//! - status: print the status record persisted by the last completed pass

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run, run_check, show_status};
pub use errors::{CliError, CliResult};
