//! Orchestration of a single dispatch: resolve, configure, plan, run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::core::config::{ConfigOverrides, DispatchConfig, apply_overrides};
use crate::core::context::DispatchContext;
use crate::core::invocation::{Invocation, plan_invocation};
use crate::core::types::HarnessOutcome;
use crate::io::config::{DEFAULT_CONFIG_FILE, EnvSource, env_overrides, load_config};
use crate::io::process::HarnessRunner;
use crate::io::resolve::resolve_script;

/// Everything the CLI collected for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    /// Script path as invoked (relative to `test_dir` or absolute).
    pub script: PathBuf,
    /// Target identifier forwarded to the harness.
    pub target: Option<String>,
    /// Explicit config file; must exist when set.
    pub config_path: Option<PathBuf>,
    /// Command-line overrides, applied last.
    pub overrides: ConfigOverrides,
}

/// Layer configuration: CLI > environment > file > defaults.
pub fn resolve_config(
    test_dir: &Path,
    config_path: Option<&Path>,
    env: &dyn EnvSource,
    cli: &ConfigOverrides,
) -> Result<DispatchConfig> {
    let path = match config_path {
        Some(path) => {
            let path = test_dir.join(path);
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            path
        }
        None => test_dir.join(DEFAULT_CONFIG_FILE),
    };
    let file = load_config(&path)?;
    let from_env = env_overrides(env)?;
    let merged = apply_overrides(file, &from_env).context("apply environment overrides")?;
    apply_overrides(merged, cli).context("apply command-line overrides")
}

/// Resolve the script and configuration into a harness invocation.
///
/// Performs no writes and spawns nothing.
#[instrument(skip_all, fields(script = %request.script.display()))]
pub fn plan_dispatch(
    request: &DispatchRequest,
    test_dir: &Path,
    env: &dyn EnvSource,
) -> Result<Invocation> {
    let script = resolve_script(&request.script, test_dir)?;
    let context = DispatchContext::from_resolved(&script, test_dir)?;
    debug!(
        src_dir = %context.src_dir.display(),
        test_dir = %context.test_dir.display(),
        script_name = ?context.script_name,
        "dispatch context"
    );
    let config = resolve_config(
        test_dir,
        request.config_path.as_deref(),
        env,
        &request.overrides,
    )?;
    let invocation = plan_invocation(&context, request.target.as_deref(), &config);
    debug!(program = %invocation.program.display(), args = ?invocation.args, "planned invocation");
    Ok(invocation)
}

/// Plan and run the harness, returning how it ended.
pub fn run_dispatch(
    request: &DispatchRequest,
    test_dir: &Path,
    env: &dyn EnvSource,
    runner: &dyn HarnessRunner,
) -> Result<HarnessOutcome> {
    let invocation = plan_dispatch(request, test_dir, env)?;
    let outcome = runner.run(&invocation)?;
    info!(exit_code = outcome.exit_code(), "dispatch finished");
    Ok(outcome)
}
