//! `dispatch`: interpreter for regression-test scripts.
//!
//! A test script starts with `#!/usr/bin/env dispatch`, so running
//! `./mxs585.py smoke` becomes `dispatch ./mxs585.py smoke`. The dispatcher
//! hands the script over to `non_native_setup` in the current directory and
//! exits with its status.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dispatcher::core::config::ConfigOverrides;
use dispatcher::dispatch::{DispatchRequest, plan_dispatch, run_dispatch};
use dispatcher::exit_codes;
use dispatcher::io::catalog::discover_scripts;
use dispatcher::io::config::ProcessEnv;
use dispatcher::io::process::ProcessRunner;
use dispatcher::io::resolve::current_test_dir;
use dispatcher::logging;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "dispatch",
    version,
    about = "Hand regression-test scripts over to the non_native_setup harness",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Print the planned harness invocation as JSON without running it.
    Plan(RunArgs),
    /// List documented test scripts (`## @file` headers) in a directory.
    List {
        /// Directory to scan. Defaults to the current directory.
        dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Config file (default: `dispatch.toml` in the current directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Harness program to run instead of `non_native_setup`.
    #[arg(long)]
    harness: Option<String>,

    /// Kill the harness after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Test script (passed by the kernel for `#!` scripts), then the target.
    ///
    /// Everything after the script belongs to the harness and is never
    /// parsed as a dispatcher option, so options go before the script.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        value_name = "SCRIPT [TARGET]"
    )]
    argv: Vec<String>,
}

impl RunArgs {
    fn into_request(self) -> DispatchRequest {
        let mut argv = self.argv.into_iter();
        let script = argv.next().map(PathBuf::from).unwrap_or_default();
        let target = argv.next();
        let extra: Vec<String> = argv.collect();
        if !extra.is_empty() {
            warn!(?extra, "ignoring arguments after target");
        }
        DispatchRequest {
            script,
            target,
            config_path: self.config,
            overrides: ConfigOverrides {
                harness: self.harness,
                timeout_secs: self.timeout_secs,
                inherit_env: None,
            },
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("dispatch: {:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let test_dir = current_test_dir()?;
    match cli.command {
        Some(Command::Plan(args)) => cmd_plan(args, &test_dir),
        Some(Command::List { dir }) => cmd_list(dir, &test_dir),
        None => cmd_run(cli.run, &test_dir),
    }
}

fn cmd_run(args: RunArgs, test_dir: &Path) -> Result<i32> {
    let request = args.into_request();
    let outcome = run_dispatch(&request, test_dir, &ProcessEnv, &ProcessRunner)?;
    Ok(outcome.exit_code())
}

fn cmd_plan(args: RunArgs, test_dir: &Path) -> Result<i32> {
    let request = args.into_request();
    let invocation = plan_dispatch(&request, test_dir, &ProcessEnv)?;
    println!("{}", serde_json::to_string_pretty(&invocation.to_json())?);
    Ok(exit_codes::OK)
}

fn cmd_list(dir: Option<PathBuf>, test_dir: &Path) -> Result<i32> {
    let dir = match dir {
        Some(dir) => test_dir.join(dir),
        None => test_dir.to_path_buf(),
    };
    for script in discover_scripts(&dir)? {
        println!("{}\t{}", script.header.name, script.header.summary);
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: &[&str]) -> DispatchRequest {
        Cli::parse_from(args).run.into_request()
    }

    #[test]
    fn parse_shebang_form() {
        let cli = Cli::parse_from(["dispatch", "./mxs585.py", "smoke"]);
        assert!(cli.command.is_none());
        let request = cli.run.into_request();
        assert_eq!(request.script, PathBuf::from("./mxs585.py"));
        assert_eq!(request.target.as_deref(), Some("smoke"));
    }

    #[test]
    fn parse_without_target() {
        let request = request(&["dispatch", "/tests/mxs598.py"]);
        assert_eq!(request.script, PathBuf::from("/tests/mxs598.py"));
        assert_eq!(request.target, None);
    }

    #[test]
    fn parse_extra_arguments_are_dropped() {
        let request = request(&["dispatch", "mxs585.py", "smoke", "ignored", "too"]);
        assert_eq!(request.script, PathBuf::from("mxs585.py"));
        assert_eq!(request.target.as_deref(), Some("smoke"));
    }

    #[test]
    fn hyphenated_target_is_forwarded_verbatim() {
        for target in ["-v", "-1", "--help", "--version", "--harness"] {
            let request = request(&["dispatch", "mxs585.py", target]);
            assert_eq!(request.target.as_deref(), Some(target), "target {target}");
            assert_eq!(request.overrides, ConfigOverrides::default());
        }
    }

    #[test]
    fn options_after_script_belong_to_harness() {
        let request = request(&["dispatch", "mxs585.py", "--timeout-secs", "5"]);
        assert_eq!(request.target.as_deref(), Some("--timeout-secs"));
        assert_eq!(request.overrides.timeout_secs, None);
    }

    #[test]
    fn parse_overrides_before_script() {
        let request = request(&[
            "dispatch",
            "--harness",
            "other_setup",
            "--timeout-secs",
            "60",
            "--config",
            "ci.toml",
            "mxs585.py",
        ]);
        assert_eq!(request.overrides.harness.as_deref(), Some("other_setup"));
        assert_eq!(request.overrides.timeout_secs, Some(60));
        assert_eq!(request.config_path, Some(PathBuf::from("ci.toml")));
        assert_eq!(request.script, PathBuf::from("mxs585.py"));
    }

    #[test]
    fn parse_plan() {
        let cli = Cli::parse_from(["dispatch", "plan", "mxs585.py", "-v"]);
        match cli.command {
            Some(Command::Plan(args)) => {
                let request = args.into_request();
                assert_eq!(request.script, PathBuf::from("mxs585.py"));
                assert_eq!(request.target.as_deref(), Some("-v"));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn parse_list() {
        let cli = Cli::parse_from(["dispatch", "list", "scripts"]);
        assert!(matches!(
            cli.command,
            Some(Command::List { dir: Some(ref dir) }) if dir == Path::new("scripts")
        ));
    }

    #[test]
    fn script_is_required_without_subcommand() {
        assert!(Cli::try_parse_from(["dispatch"]).is_err());
    }
}
