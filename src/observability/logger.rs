//! Line-oriented file logger
//!
//! - One log line = one event
//! - Synchronous, no buffering
//! - Single fixed format: `LEVEL\t<local timestamp>\t\t<message>`
//! - One threshold, debug and above

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

/// Name of the sink file, placed in the same directory as the catalog's log.
const LOG_FILE_NAME: &str = "restorecheck.log";

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Command traces and staging detail
    Debug = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues, retried probes
    Warning = 2,
    /// Per-server failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the sink path from the catalog's configured log file: same
/// directory, fixed file name.
pub fn sibling_log_path(catalog_log_file: &Path) -> PathBuf {
    catalog_log_file.with_file_name(LOG_FILE_NAME)
}

/// A synchronous line logger writing to a single sink.
pub struct Logger {
    sink: Mutex<Box<dyn Write + Send>>,
    threshold: Severity,
}

impl Logger {
    /// Open (append) the sink file and build a logger over it.
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::to_writer(Box::new(file)))
    }

    /// Build a logger over an arbitrary sink. Threshold is debug-and-above.
    pub fn to_writer(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
            threshold: Severity::Debug,
        }
    }

    /// Write one formatted line; below-threshold events are dropped.
    pub fn log(&self, severity: Severity, message: &str) {
        if severity < self.threshold {
            return;
        }
        let line = format!(
            "{}\t{}\t\t{}\n",
            severity.as_str(),
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            message
        );
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.write_all(line.as_bytes());
            let _ = sink.flush();
        }
    }
}
