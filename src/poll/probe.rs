//! Liveness probe
//!
//! One probe = open a connection by descriptor, run the sentinel query,
//! check the scalar. The engine's client binary is an external collaborator;
//! its exit code and stderr carry everything the poller needs.

use std::process::Command;

/// The sentinel query and the scalar it must produce.
const SENTINEL_QUERY: &str = "SELECT 42;";
const SENTINEL_ANSWER: &str = "42";

/// Marker the engine emits while still replaying WAL; probes failing with it
/// are not worth a log line.
const STARTING_UP_MARKER: &str = "the database system is starting up";

/// Result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The instance answered the sentinel query.
    Ready,
    /// The instance is still starting up; retry silently.
    StartingUp,
    /// Some other failure; retry, but say so.
    Failed(String),
}

/// Capability: one liveness attempt against a connection descriptor.
pub trait ReadinessProbe {
    fn probe(&self, conninfo: &str) -> ProbeOutcome;
}

/// Production probe shelling out to `psql`.
pub struct PsqlProbe;

impl ReadinessProbe for PsqlProbe {
    fn probe(&self, conninfo: &str) -> ProbeOutcome {
        let output = Command::new("psql")
            .arg(conninfo)
            .args(["-tA", "-c", SENTINEL_QUERY])
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        if output.status.success() {
            let answer = String::from_utf8_lossy(&output.stdout);
            if answer.trim() == SENTINEL_ANSWER {
                return ProbeOutcome::Ready;
            }
            return ProbeOutcome::Failed(format!(
                "sentinel query answered {:?}",
                answer.trim()
            ));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(STARTING_UP_MARKER) {
            ProbeOutcome::StartingUp
        } else {
            ProbeOutcome::Failed(stderr.trim().to_string())
        }
    }
}
