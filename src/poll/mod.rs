//! Readiness polling
//!
//! After the engine starts it replays the staged WAL until consistent; that
//! can take hours. The poller repeatedly sleeps then probes with a sentinel
//! query until the instance answers or the attempt budget runs out.
//!
//! Probe outcomes during the wait:
//! - still starting up: swallowed silently, loop continues
//! - any other failure: logged as a warning, loop continues
//! - success: return immediately
//!
//! Only the attempt budget ends the loop; there is no fatal-error
//! short-circuit and no external cancellation.

mod errors;
mod probe;

pub use errors::{PollError, PollResult};
pub use probe::{ProbeOutcome, PsqlProbe, ReadinessProbe};

use std::thread;
use std::time::Duration;

use crate::observability;

/// Default attempt budget: 360 probes a minute apart, about six hours.
const POLL_ATTEMPTS: u32 = 360;
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Capability: wait between probe attempts. Production sleeps; tests count.
pub trait Pause {
    fn pause(&self, interval: Duration);
}

/// Production pause: a real blocking sleep.
pub struct SleepPause;

impl Pause for SleepPause {
    fn pause(&self, interval: Duration) {
        thread::sleep(interval);
    }
}

/// Sleep-then-probe loop over a probe and a pause source.
pub struct Poller<'a> {
    probe: &'a dyn ReadinessProbe,
    pause: &'a dyn Pause,
    attempts: u32,
    interval: Duration,
}

impl<'a> Poller<'a> {
    /// Poller with the production budget.
    pub fn new(probe: &'a dyn ReadinessProbe, pause: &'a dyn Pause) -> Self {
        Self::with_budget(probe, pause, POLL_ATTEMPTS, POLL_INTERVAL)
    }

    /// Poller with an explicit budget, for callers that need a shorter one.
    pub fn with_budget(
        probe: &'a dyn ReadinessProbe,
        pause: &'a dyn Pause,
        attempts: u32,
        interval: Duration,
    ) -> Self {
        Self {
            probe,
            pause,
            attempts,
            interval,
        }
    }

    /// Block until the instance answers the sentinel query or the budget is
    /// exhausted. Each attempt pauses first, then probes.
    pub fn poll_until_ready(&self, conninfo: &str) -> PollResult<()> {
        for _ in 0..self.attempts {
            self.pause.pause(self.interval);
            match self.probe.probe(conninfo) {
                ProbeOutcome::Ready => return Ok(()),
                ProbeOutcome::StartingUp => continue,
                ProbeOutcome::Failed(message) => {
                    observability::warning(&message);
                    continue;
                }
            }
        }
        Err(PollError::NotReadyTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedProbe {
        script: RefCell<Vec<ProbeOutcome>>,
    }

    impl ScriptedProbe {
        fn new(mut outcomes: Vec<ProbeOutcome>) -> Self {
            outcomes.reverse();
            Self {
                script: RefCell::new(outcomes),
            }
        }
    }

    impl ReadinessProbe for ScriptedProbe {
        fn probe(&self, _conninfo: &str) -> ProbeOutcome {
            self.script
                .borrow_mut()
                .pop()
                .unwrap_or(ProbeOutcome::StartingUp)
        }
    }

    struct CountingPause {
        count: RefCell<u32>,
    }

    impl CountingPause {
        fn new() -> Self {
            Self {
                count: RefCell::new(0),
            }
        }
    }

    impl Pause for CountingPause {
        fn pause(&self, _interval: Duration) {
            *self.count.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_succeeds_on_first_ready_probe() {
        let probe = ScriptedProbe::new(vec![
            ProbeOutcome::StartingUp,
            ProbeOutcome::StartingUp,
            ProbeOutcome::Ready,
        ]);
        let pause = CountingPause::new();

        Poller::with_budget(&probe, &pause, 10, Duration::from_secs(60))
            .poll_until_ready("host=localhost")
            .unwrap();

        // One pause before every probe, including the successful one.
        assert_eq!(*pause.count.borrow(), 3);
    }

    #[test]
    fn test_other_failures_are_retried_until_budget() {
        let probe = ScriptedProbe::new(vec![
            ProbeOutcome::Failed("fe_sendauth: no password supplied".to_string()),
            ProbeOutcome::Failed("connection refused".to_string()),
            ProbeOutcome::Ready,
        ]);
        let pause = CountingPause::new();

        Poller::with_budget(&probe, &pause, 10, Duration::from_secs(60))
            .poll_until_ready("host=localhost")
            .unwrap();

        assert_eq!(*pause.count.borrow(), 3);
    }

    #[test]
    fn test_budget_exhaustion_times_out() {
        let probe = ScriptedProbe::new(vec![]);
        let pause = CountingPause::new();

        let result = Poller::with_budget(&probe, &pause, 5, Duration::from_secs(60))
            .poll_until_ready("host=localhost");

        assert!(matches!(result, Err(PollError::NotReadyTimeout)));
        assert_eq!(*pause.count.borrow(), 5);
    }
}
