//! Typed inventory snapshot
//!
//! Field names mirror the catalog's diagnose JSON. Servers and backups live
//! in `BTreeMap`s, so every scan over them is in lexicographic key order and
//! a full run is reproducible from the same snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Point-in-time description of all managed servers and their backups.
#[derive(Debug, Clone, Deserialize)]
pub struct InventorySnapshot {
    pub global: GlobalSection,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerRecord>,
}

/// The catalog's global section; only its `config` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalSection {
    pub config: GlobalConfig,
}

/// Catalog-wide configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    /// Root of per-server backup storage.
    pub barman_home: PathBuf,
    /// The catalog's own log file; our sink lives next to it.
    pub log_file: PathBuf,
}

/// One managed server: its connection descriptor and its backups.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRecord {
    pub config: ServerConfig,
    #[serde(default)]
    pub backups: BTreeMap<String, BackupRecord>,
}

/// Per-server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// libpq-style connection descriptor for the live cluster.
    pub conninfo: String,
}

/// One backup of one server.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupRecord {
    pub status: BackupStatus,
    pub begin_wal: WalSegmentId,
    pub end_wal: WalSegmentId,
    /// Engine version code: major = v / 10000, minor = (v / 100) % 100.
    pub version: u32,
}

impl BackupRecord {
    /// Render the engine version as `major.minor`, the form the engine's
    /// installation paths use.
    pub fn engine_version(&self) -> String {
        format!("{}.{}", self.version / 10000, self.version / 100 % 100)
    }
}

/// Backup status as reported by the catalog. Only `Done` backups are usable;
/// every other value, including statuses this build does not know about, is
/// treated as "not usable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BackupStatus {
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "STARTED")]
    Started,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "EMPTY")]
    Empty,
    #[serde(other)]
    Other,
}

/// A WAL segment identifier: 24 hex characters structured as
/// `[8 timeline][8 log-file counter][8 segment-in-file]`.
///
/// Validated at parse time, so the accessors are infallible.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct WalSegmentId {
    raw: String,
    counter: u64,
}

impl WalSegmentId {
    /// Parse and validate a segment name.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.len() != 24 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("not a WAL segment name: {:?}", raw));
        }
        let counter = u64::from_str_radix(&raw[8..16], 16)
            .map_err(|e| format!("not a WAL segment name: {:?}: {}", raw, e))?;
        Ok(Self {
            raw: raw.to_string(),
            counter,
        })
    }

    /// The timeline component, as 8 hex characters.
    pub fn timeline(&self) -> &str {
        &self.raw[..8]
    }

    /// The log-file counter component, decoded.
    pub fn log_counter(&self) -> u64 {
        self.counter
    }

    /// The full 24-character segment name.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for WalSegmentId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl fmt::Display for WalSegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Name of the per-counter WAL source subdirectory: timeline followed by the
/// counter as 8 upper-case hex digits.
pub fn wal_dir_name(timeline: &str, counter: u64) -> String {
    format!("{}{:08X}", timeline, counter)
}
