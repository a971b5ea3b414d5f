//! Configuration patching
//!
//! The third staging sub-step rewrites the staged configuration so the engine
//! boots in isolation and recovers from the staging WAL directory:
//!
//! 1. `shared_preload_libraries` emptied
//! 2. `shared_buffers` pinned to 4GB
//! 3. `stats_temp_directory` reset to its relative default
//! 4. `hba_file` repointed at the staged copy
//! 5. `recovery.conf` written with an immediate recovery target and the
//!    staging WAL directory as archive source
//!
//! The steps run in this fixed order; the first failing step aborts the
//! sub-step and nothing after it runs.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};

use super::context::StagingContext;
use super::errors::{StagingError, StagingResult};

/// Capability: patch a staged configuration for isolated startup.
pub trait ConfigPatcher {
    fn patch(&self, ctx: &StagingContext) -> StagingResult<()>;
}

/// Production patcher editing `conf.d/postgresql.conf` in place and writing
/// `recovery.conf`.
pub struct PostgresConfigPatcher;

impl PostgresConfigPatcher {
    fn conf_path(scratch: &Path) -> PathBuf {
        scratch.join("conf.d").join("postgresql.conf")
    }

    fn hba_path(scratch: &Path) -> PathBuf {
        scratch.join("conf.d").join("pg_hba.conf")
    }
}

impl ConfigPatcher for PostgresConfigPatcher {
    fn patch(&self, ctx: &StagingContext) -> StagingResult<()> {
        let conf = Self::conf_path(&ctx.scratch);

        edit_directive(&conf, r"(?m)^(shared_preload_libraries\s*=\s*)'[^']*'", |caps| {
            format!("{}''", &caps[1])
        })?;

        edit_directive(&conf, r"(?m)^(shared_buffers\s*=).*$", |caps| {
            format!("{} 4GB", &caps[1])
        })?;

        edit_directive(&conf, r"(?m)^(stats_temp_directory\s*=).*$", |caps| {
            format!("{} 'pg_stat_tmp'", &caps[1])
        })?;

        let hba = Self::hba_path(&ctx.scratch);
        edit_directive(&conf, r"(?m)^(hba_file\s*=\s*)'[^']*'", |caps| {
            format!("{}'{}'", &caps[1], hba.display())
        })?;

        write_recovery_conf(ctx)
    }
}

/// One read-modify-write pass over the configuration file, rewriting every
/// line that begins with the target directive.
fn edit_directive<F>(path: &Path, pattern: &str, replacement: F) -> StagingResult<()>
where
    F: FnMut(&Captures<'_>) -> String,
{
    let re = Regex::new(pattern).map_err(|e| StagingError::ConfigPatchFailed(e.to_string()))?;
    let text = fs::read_to_string(path)
        .map_err(|e| StagingError::ConfigPatchFailed(format!("{}: {}", path.display(), e)))?;
    let patched = re.replace_all(&text, replacement);
    fs::write(path, patched.as_bytes())
        .map_err(|e| StagingError::ConfigPatchFailed(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Step 5: instruct the engine to recover to immediate consistency, restoring
/// segments out of the staging WAL directory.
fn write_recovery_conf(ctx: &StagingContext) -> StagingResult<()> {
    let path = ctx.scratch.join("recovery.conf");
    let contents = format!(
        "recovery_target = 'immediate'\nrestore_command = 'cp {}/%f %p'\n",
        ctx.wal_stage.display()
    );
    fs::write(&path, contents)
        .map_err(|e| StagingError::ConfigPatchFailed(format!("{}: {}", path.display(), e)))
}
