//! Per-server staging context
//!
//! Ephemeral, created per server per run. Resolves every path the pipeline
//! touches and the connection descriptor rewritten to target the staged
//! instance. Removed from disk only after a fully successful verification.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::catalog::BackupRecord;

/// Directory inside the scratch path that receives the linked WAL segments.
const WAL_STAGE_DIR: &str = "staged_xlogs";

/// Everything one server's verification needs to know about where it runs.
#[derive(Debug, Clone)]
pub struct StagingContext {
    /// Server name, used in log lines and the failure list.
    pub server: String,
    /// Identifier of the backup under verification.
    pub backup_id: String,
    /// Source base data directory of the backup.
    pub base_dir: PathBuf,
    /// Root of the server's archived WAL subdirectories.
    pub wals_dir: PathBuf,
    /// Fixed per-server scratch path the engine boots from.
    pub scratch: PathBuf,
    /// Staging WAL directory inside the scratch path.
    pub wal_stage: PathBuf,
    /// Engine version string (`major.minor`) for version-specific tooling.
    pub engine_version: String,
    /// Connection descriptor rewritten to target the staged instance.
    pub conninfo: String,
}

impl StagingContext {
    /// Resolve the context for one backup of one server under the catalog's
    /// storage root.
    pub fn for_backup(
        storage_root: &Path,
        server: &str,
        backup_id: &str,
        backup: &BackupRecord,
        conninfo: &str,
    ) -> Self {
        let server_root = storage_root.join(server);
        let scratch = server_root.join("pgdata");
        Self {
            server: server.to_string(),
            backup_id: backup_id.to_string(),
            base_dir: server_root.join("base").join(backup_id).join("pgdata"),
            wals_dir: server_root.join("wals"),
            wal_stage: scratch.join(WAL_STAGE_DIR),
            scratch,
            engine_version: backup.engine_version(),
            conninfo: rewrite_host_localhost(conninfo),
        }
    }
}

/// Replace the host component of a connection descriptor so the sentinel
/// query lands on the staged instance instead of the live cluster.
fn rewrite_host_localhost(conninfo: &str) -> String {
    match Regex::new(r"host=[0-9A-Za-z_.\-]*") {
        Ok(re) => re.replace(conninfo, "host=localhost").into_owned(),
        Err(_) => conninfo.to_string(),
    }
}
