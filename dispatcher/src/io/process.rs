//! Spawning the harness and classifying how it ended.

use std::io::ErrorKind;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::invocation::Invocation;
use crate::core::types::HarnessOutcome;
use crate::exit_codes;

/// Runs a planned invocation. The seam lets orchestration be tested without
/// spawning processes.
pub trait HarnessRunner {
    fn run(&self, invocation: &Invocation) -> Result<HarnessOutcome>;
}

/// Runs the harness as a real child process.
pub struct ProcessRunner;

impl HarnessRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<HarnessOutcome> {
        run_harness(invocation)
    }
}

/// Build the `Command` for an invocation. Standard streams are inherited.
pub fn build_command(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.current_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if !invocation.inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&invocation.env);
    cmd
}

/// Spawn the harness and wait for it, honoring the optional timeout.
///
/// A harness that cannot be spawned because it is missing or not executable
/// is an outcome, not an error; nothing has been started in that case.
#[instrument(skip_all, fields(program = %invocation.program.display()))]
pub fn run_harness(invocation: &Invocation) -> Result<HarnessOutcome> {
    let mut cmd = build_command(invocation);

    debug!(args = ?invocation.args, "spawning harness");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(err = %e, "harness not found");
            return Ok(HarnessOutcome::NotFound);
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            error!(err = %e, "harness not executable");
            return Ok(HarnessOutcome::NotExecutable);
        }
        Err(e) => {
            error!(err = %e, "failed to spawn harness");
            return Err(e).with_context(|| format!("spawn {}", invocation.program.display()));
        }
    };

    let status = match invocation.timeout {
        Some(timeout) => match child.wait_timeout(timeout).context("wait for harness")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = timeout.as_secs(), "harness timed out, killing");
                child.kill().context("kill harness")?;
                child.wait().context("wait harness after kill")?;
                return Ok(HarnessOutcome::TimedOut);
            }
        },
        None => child.wait().context("wait for harness")?,
    };

    let outcome = classify_status(status);
    debug!(?outcome, "harness finished");
    Ok(outcome)
}

/// Map an exit status to an outcome.
pub fn classify_status(status: ExitStatus) -> HarnessOutcome {
    if let Some(code) = status.code() {
        return HarnessOutcome::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return HarnessOutcome::Signaled(signal);
        }
    }
    HarnessOutcome::Exited(exit_codes::INVALID)
}

#[cfg(all(test, unix))]
mod tests {
    use std::collections::BTreeMap;
    use std::ffi::OsString;
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::core::config::DispatchConfig;
    use crate::core::context::DispatchContext;
    use crate::core::invocation::plan_invocation;
    use crate::test_support::TestDir;

    fn plan(dir: &TestDir, target: Option<&str>, config: &DispatchConfig) -> Invocation {
        let test_dir = dir.canonical();
        let context = DispatchContext::from_resolved(&test_dir.join("mxs585.py"), &test_dir)
            .expect("context");
        plan_invocation(&context, target, config)
    }

    #[test]
    fn propagates_harness_exit_code() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_harness("exit 0").expect("harness");
        let outcome = run_harness(&plan(&dir, Some("t"), &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::Exited(0));

        dir.write_harness("exit 7").expect("harness");
        let outcome = run_harness(&plan(&dir, Some("t"), &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::Exited(7));
    }

    #[test]
    fn harness_sees_arguments_env_and_cwd() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_harness(
            r#"printf '%s|%s|%s\n' "$#" "$1" "$2" > seen.txt
printf '%s|%s|%s|%s\n' "$src_dir" "$test_dir" "$script_name" "$(pwd -P)" >> seen.txt"#,
        )
        .expect("harness");

        let outcome = run_harness(&plan(&dir, None, &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::Exited(0));

        let seen = std::fs::read_to_string(dir.path().join("seen.txt")).expect("read");
        let root = dir.canonical();
        let root = root.display();
        assert_eq!(seen, format!("2||mxs585.py\n{root}|{root}|mxs585.py|{root}\n"));
    }

    #[test]
    fn missing_harness_is_not_found() {
        let dir = TestDir::new().expect("tempdir");
        let outcome = run_harness(&plan(&dir, Some("t"), &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::NotFound);
        assert_eq!(outcome.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn non_executable_harness_is_reported() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_file("non_native_setup", "#!/bin/sh\nexit 0\n")
            .expect("write");
        let outcome = run_harness(&plan(&dir, Some("t"), &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::NotExecutable);
    }

    #[test]
    fn timeout_kills_harness() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_harness("exec sleep 30").expect("harness");
        let mut invocation = plan(&dir, Some("t"), &DispatchConfig::default());
        invocation.timeout = Some(Duration::from_millis(200));

        let outcome = run_harness(&invocation).expect("run");
        assert_eq!(outcome, HarnessOutcome::TimedOut);
    }

    #[test]
    fn signal_death_is_classified() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_harness("kill -TERM $$").expect("harness");
        let outcome = run_harness(&plan(&dir, Some("t"), &DispatchConfig::default())).expect("run");
        assert_eq!(outcome, HarnessOutcome::Signaled(15));
        assert_eq!(outcome.exit_code(), 143);
    }

    #[test]
    fn cleared_env_drops_inherited_vars() {
        let dir = TestDir::new().expect("tempdir");
        dir.write_harness(r#"/usr/bin/env > env.txt"#).expect("harness");
        let config = DispatchConfig {
            inherit_env: false,
            env: BTreeMap::from([("extra".to_string(), "1".to_string())]),
            ..DispatchConfig::default()
        };

        let outcome = run_harness(&plan(&dir, Some("t"), &config)).expect("run");
        assert_eq!(outcome, HarnessOutcome::Exited(0));

        let env = std::fs::read_to_string(dir.path().join("env.txt")).expect("read");
        let names: Vec<&str> = env
            .lines()
            .filter_map(|line| line.split_once('=').map(|(name, _)| name))
            .collect();
        for expected in ["extra", "script_name", "src_dir", "test_dir"] {
            assert!(names.contains(&expected), "missing {expected} in {names:?}");
        }
        // Set by cargo for every test process, so only an inherited env has it.
        assert!(std::env::var_os("CARGO_MANIFEST_DIR").is_some());
        assert!(!names.contains(&"CARGO_MANIFEST_DIR"));
    }

    #[test]
    fn command_carries_planned_parts() {
        let invocation = Invocation {
            program: Path::new("/tests/non_native_setup").to_path_buf(),
            args: vec![OsString::from("smoke"), OsString::from("mxs585.py")],
            env: BTreeMap::new(),
            inherit_env: true,
            current_dir: Path::new("/tests").to_path_buf(),
            timeout: None,
        };
        let cmd = build_command(&invocation);
        assert_eq!(cmd.get_program(), "/tests/non_native_setup");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["smoke", "mxs585.py"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/tests")));
    }
}
