//! Stable exit codes owned by the dispatcher.
//!
//! Any other code is the harness's own exit status, passed through verbatim.

/// Harness ran and exited successfully.
pub const OK: i32 = 0;
/// Dispatcher failed before the harness ran (bad config, unresolvable script).
pub const INVALID: i32 = 1;
/// Harness exceeded the configured timeout and was killed.
pub const TIMED_OUT: i32 = 124;
/// Harness exists but could not be executed.
pub const NOT_EXECUTABLE: i32 = 126;
/// Harness does not exist in the test directory.
pub const NOT_FOUND: i32 = 127;
/// Added to the signal number when the harness is killed by a signal.
pub const SIGNAL_BASE: i32 = 128;
