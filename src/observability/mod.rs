//! Observability for restorecheck
//!
//! One logging sink, one line format. The sink is a file sitting next to the
//! backup catalog's own log file; until it is installed, lines fall back to
//! stderr so early failures are never silent.

mod logger;

pub use logger::{sibling_log_path, Logger, Severity};

use std::path::Path;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install the file-backed logger derived from the catalog's log location.
///
/// Installation happens once per process; a second call is a no-op. Failure
/// to open the sink leaves the stderr fallback in place.
pub fn init_file_logger(catalog_log_file: &Path) -> std::io::Result<()> {
    let logger = Logger::to_file(&sibling_log_path(catalog_log_file))?;
    let _ = GLOBAL.set(logger);
    Ok(())
}

/// Log a line at the given severity through the installed sink.
pub fn log(severity: Severity, message: &str) {
    match GLOBAL.get() {
        Some(logger) => logger.log(severity, message),
        None => eprintln!("{}\t{}", severity, message),
    }
}

/// Debug-level line (every external command is logged here before it runs).
pub fn debug(message: &str) {
    log(Severity::Debug, message);
}

/// Info-level line.
pub fn info(message: &str) {
    log(Severity::Info, message);
}

/// Warning-level line.
pub fn warning(message: &str) {
    log(Severity::Warning, message);
}

/// Error-level line.
pub fn error(message: &str) {
    log(Severity::Error, message);
}
