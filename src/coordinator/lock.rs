//! Cross-process run exclusion
//!
//! A host-local advisory lock on one well-known path. Held for the lifetime
//! of the run; released on drop, and by the operating system on process exit
//! by any means. Acquisition failure means another run is already in
//! progress — that is a clean outcome, not an error.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;

/// Well-known lock path shared by every invocation on the host.
pub const LOCK_PATH: &str = "/tmp/restorecheck.lock";

/// An acquired exclusion lock. Dropping it releases the lock.
pub struct ExclusionLock {
    file: File,
}

impl ExclusionLock {
    /// Try to acquire the lock at `path`.
    ///
    /// `Ok(None)` means another process holds it. `Err` means the lock file
    /// itself could not be opened.
    pub fn acquire(path: &Path) -> io::Result<Option<Self>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        if file.try_lock_exclusive().is_err() {
            return Ok(None);
        }
        Ok(Some(Self { file }))
    }
}

impl Drop for ExclusionLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
