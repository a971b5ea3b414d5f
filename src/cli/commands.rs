//! CLI command implementations
//!
//! `run` wires the production capability implementations into the
//! coordinator and executes one pass. `status` reads the persisted record
//! back for the operator.

use std::path::Path;

use chrono::{Local, TimeZone};

use crate::catalog::DiagnoseReader;
use crate::coordinator::{
    Coordinator, FileStatusStore, RunOutcome, StatusStore, VerifyPipeline, LOCK_PATH, STATUS_PATH,
};
use crate::instance::PgCtlController;
use crate::poll::{PsqlProbe, SleepPause};
use crate::staging::{HardLinkWalLinker, PostgresConfigPatcher, RsyncSyncer};

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Parse arguments and dispatch.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Run => run_check(),
        Command::Status => {
            show_status();
            Ok(())
        }
    }
}

/// Execute today's verification pass with the production stack.
pub fn run_check() -> CliResult<()> {
    let catalog = DiagnoseReader::default();
    let status_store = FileStatusStore::new(Path::new(STATUS_PATH));

    let coordinator = Coordinator {
        catalog: &catalog,
        pipeline: VerifyPipeline {
            syncer: &RsyncSyncer,
            linker: &HardLinkWalLinker,
            patcher: &PostgresConfigPatcher,
            controller: &PgCtlController,
            probe: &PsqlProbe,
            pause: &SleepPause,
            poll_budget: None,
        },
        status_store: &status_store,
        lock_path: LOCK_PATH.into(),
    };

    // All three outcomes are clean exits; the persisted record carries the
    // verification result.
    let _outcome: RunOutcome = coordinator.run(Local::now())?;
    Ok(())
}

/// Print the persisted status record, if any.
pub fn show_status() {
    let store = FileStatusStore::new(Path::new(STATUS_PATH));
    match store.load() {
        Some(record) => {
            let when = match Local.timestamp_opt(record.timestamp as i64, 0) {
                chrono::LocalResult::Single(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
                _ => format!("@{}", record.timestamp),
            };
            println!("{}  status={}  {}", when, record.status, record.message);
        }
        None => println!("No verification pass has been recorded on this host."),
    }
}
