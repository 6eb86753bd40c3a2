//! Regression-test dispatcher.
//!
//! Test scripts use the `dispatch` binary as their interpreter. For each
//! script the dispatcher resolves where the script lives, derives the
//! `src_dir`/`test_dir`/`script_name` context and hands control to the
//! external `non_native_setup` harness, returning whatever it returns.
//!
//! - **[`core`]**: Pure, deterministic logic (context derivation, invocation
//!   planning, header parsing). No I/O.
//! - **[`io`]**: Side-effecting operations (path resolution, config, process
//!   execution, script discovery).
//!
//! [`dispatch`] coordinates the two to implement the CLI commands.

pub mod core;
pub mod dispatch;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
