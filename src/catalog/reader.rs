//! Snapshot acquisition
//!
//! The reader shells out to the catalog's diagnose command and parses its
//! stdout. The command line is logged at debug before it runs, like every
//! other external invocation in this tool.

use std::process::{Command, Stdio};

use crate::observability;

use super::errors::{CatalogError, CatalogResult};
use super::model::InventorySnapshot;

/// Source of inventory snapshots.
pub trait CatalogReader {
    /// Obtain a point-in-time snapshot of all servers and backups.
    fn fetch(&self) -> CatalogResult<InventorySnapshot>;
}

/// Production reader invoking the catalog command-line tool.
pub struct DiagnoseReader {
    command: Vec<String>,
}

impl DiagnoseReader {
    /// Reader over a custom command line (first element is the program).
    pub fn with_command(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Default for DiagnoseReader {
    fn default() -> Self {
        Self::with_command(vec!["barman".to_string(), "diagnose".to_string()])
    }
}

impl CatalogReader for DiagnoseReader {
    fn fetch(&self) -> CatalogResult<InventorySnapshot> {
        observability::debug(&self.command.join(" "));

        let output = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(CatalogError::Invoke)?;

        if !output.status.success() {
            return Err(CatalogError::Failed(output.status.to_string()));
        }

        let snapshot = serde_json::from_slice(&output.stdout)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_echoing(json: &str) -> DiagnoseReader {
        DiagnoseReader::with_command(vec!["echo".to_string(), json.to_string()])
    }

    #[test]
    fn test_fetch_parses_command_output() {
        let json = r#"{"global": {"config": {"barman_home": "/srv/backups",
                       "log_file": "/var/log/barman/barman.log"}}, "servers": {}}"#;
        let snapshot = reader_echoing(json).fetch().unwrap();
        assert!(snapshot.servers.is_empty());
    }

    #[test]
    fn test_fetch_fails_on_nonzero_exit() {
        let reader = DiagnoseReader::with_command(vec!["false".to_string()]);
        assert!(matches!(reader.fetch(), Err(CatalogError::Failed(_))));
    }

    #[test]
    fn test_fetch_fails_on_missing_binary() {
        let reader =
            DiagnoseReader::with_command(vec!["restorecheck-no-such-binary".to_string()]);
        assert!(matches!(reader.fetch(), Err(CatalogError::Invoke(_))));
    }

    #[test]
    fn test_fetch_fails_on_malformed_output() {
        let reader = reader_echoing("this is not json");
        assert!(matches!(reader.fetch(), Err(CatalogError::Malformed(_))));
    }
}
