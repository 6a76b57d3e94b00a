//! Bounded polling until the printer reports idle.

use std::thread;
use std::time::{Duration, Instant};

use super::types::PrinterError;
use super::PrinterControl;

/// Default delay between status polls (0.5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default upper bound on a single wait for idle (2 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// How often to poll and how long to keep trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Poll `printer` until it reports idle.
///
/// The status is always checked at least once, so a printer that is already
/// idle returns immediately even with a zero timeout.
///
/// # Errors
/// * `PrinterError::IdleTimeout` - still not idle once `policy.timeout` elapsed
/// * any error from [`PrinterControl::status`]
pub fn wait_for_idle<P>(printer: &P, policy: &PollPolicy) -> Result<(), PrinterError>
where
    P: PrinterControl + ?Sized,
{
    let started = Instant::now();
    let mut polls = 0u32;

    loop {
        let status = printer.status()?;
        polls += 1;

        if status.is_idle() {
            log::debug!("Printer idle after {} poll(s)", polls);
            return Ok(());
        }

        if started.elapsed() >= policy.timeout {
            return Err(PrinterError::IdleTimeout {
                waited: started.elapsed(),
                last_status: status,
            });
        }

        log::trace!("Printer {}, waiting {:?}", status, policy.interval);
        thread::sleep(policy.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterStatus;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedPrinter {
        statuses: RefCell<VecDeque<PrinterStatus>>,
        polls: RefCell<u32>,
    }

    impl ScriptedPrinter {
        fn new(statuses: Vec<PrinterStatus>) -> Self {
            Self {
                statuses: RefCell::new(statuses.into()),
                polls: RefCell::new(0),
            }
        }
    }

    impl PrinterControl for ScriptedPrinter {
        fn send_gcode(&self, _command: &str) -> Result<(), PrinterError> {
            Ok(())
        }

        fn status(&self) -> Result<PrinterStatus, PrinterError> {
            *self.polls.borrow_mut() += 1;
            let mut statuses = self.statuses.borrow_mut();
            // Repeat the last scripted status forever
            if statuses.len() > 1 {
                Ok(statuses.pop_front().unwrap())
            } else {
                Ok(statuses.front().cloned().unwrap())
            }
        }
    }

    fn fast_policy(timeout_ms: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(500));
        assert_eq!(policy.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_returns_immediately_when_idle() {
        let printer = ScriptedPrinter::new(vec![PrinterStatus::Idle]);
        wait_for_idle(&printer, &fast_policy(0)).unwrap();
        assert_eq!(*printer.polls.borrow(), 1);
    }

    #[test]
    fn test_waits_through_busy_states() {
        let printer = ScriptedPrinter::new(vec![
            PrinterStatus::Busy,
            PrinterStatus::ChangingTool,
            PrinterStatus::Unknown("x".to_string()),
            PrinterStatus::Idle,
        ]);
        wait_for_idle(&printer, &fast_policy(5_000)).unwrap();
        assert_eq!(*printer.polls.borrow(), 4);
    }

    #[test]
    fn test_times_out_when_never_idle() {
        let printer = ScriptedPrinter::new(vec![PrinterStatus::Processing]);
        let err = wait_for_idle(&printer, &fast_policy(20)).unwrap_err();
        match err {
            PrinterError::IdleTimeout { last_status, .. } => {
                assert_eq!(last_status, PrinterStatus::Processing)
            }
            other => panic!("Expected IdleTimeout, got {:?}", other),
        }
        assert!(*printer.polls.borrow() > 1);
    }
}
