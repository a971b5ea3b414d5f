//! Persisted run status
//!
//! A singleton record surviving across runs: one line,
//! `<epochSeconds>;<status>;<message>`. Read once at the start of a run to
//! decide whether today's check already happened; overwritten once at the
//! end of every completed pass. External monitoring consumes this file, not
//! the process exit code.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Well-known status record path.
pub const STATUS_PATH: &str = "/tmp/restorecheck.status";

/// The durable outcome of one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatusRecord {
    /// Completion time, epoch seconds.
    pub timestamp: f64,
    /// 0 = every server verified, 1 = at least one failure.
    pub status: i32,
    /// Free-text summary naming failed servers, if any.
    pub message: String,
}

impl RunStatusRecord {
    /// Parse the single-line wire form. Malformed input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim_end().splitn(3, ';');
        let timestamp = fields.next()?.parse().ok()?;
        let status = fields.next()?.parse().ok()?;
        let message = fields.next().unwrap_or("").to_string();
        Some(Self {
            timestamp,
            status,
            message,
        })
    }

    /// Render the single-line wire form. Timestamps are written as whole
    /// seconds and read back as floats.
    pub fn to_line(&self) -> String {
        format!("{};{};{}\n", self.timestamp as i64, self.status, self.message)
    }
}

/// Narrow read-then-write store for the status record. The run touches it
/// exactly twice, both at the run boundary.
pub trait StatusStore {
    /// Last persisted record, if a readable one exists.
    fn load(&self) -> Option<RunStatusRecord>;

    /// Overwrite the record.
    fn store(&self, record: &RunStatusRecord) -> io::Result<()>;
}

/// Production store over a single file.
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl StatusStore for FileStatusStore {
    fn load(&self) -> Option<RunStatusRecord> {
        let contents = fs::read_to_string(&self.path).ok()?;
        RunStatusRecord::parse(&contents)
    }

    fn store(&self, record: &RunStatusRecord) -> io::Result<()> {
        fs::write(&self.path, record.to_line())
    }
}
