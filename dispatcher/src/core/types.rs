//! Shared deterministic types for dispatcher core logic.

use crate::exit_codes;

/// How a harness run ended, from the dispatcher's point of view.
///
/// The dispatcher never interprets the harness's own exit code; `Exited`
/// carries it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessOutcome {
    /// Harness exited on its own with this code.
    Exited(i32),
    /// Harness was terminated by this signal.
    Signaled(i32),
    /// Harness outlived the configured timeout and was killed.
    TimedOut,
    /// No harness at the planned path.
    NotFound,
    /// Harness exists but the OS refused to execute it.
    NotExecutable,
}

impl HarnessOutcome {
    /// Exit status the dispatcher should terminate with.
    pub fn exit_code(&self) -> i32 {
        match *self {
            HarnessOutcome::Exited(code) => code,
            HarnessOutcome::Signaled(signal) => exit_codes::SIGNAL_BASE + signal,
            HarnessOutcome::TimedOut => exit_codes::TIMED_OUT,
            HarnessOutcome::NotFound => exit_codes::NOT_FOUND,
            HarnessOutcome::NotExecutable => exit_codes::NOT_EXECUTABLE,
        }
    }
}
