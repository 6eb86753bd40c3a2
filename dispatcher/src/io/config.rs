//! Loading dispatcher configuration from `dispatch.toml` and the environment.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::core::config::{ConfigOverrides, DispatchConfig};

/// Config file looked up in `test_dir` when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dispatch.toml";

pub const HARNESS_ENV: &str = "DISPATCH_HARNESS";
pub const TIMEOUT_SECS_ENV: &str = "DISPATCH_TIMEOUT_SECS";
pub const INHERIT_ENV_ENV: &str = "DISPATCH_INHERIT_ENV";

/// Read-only view of environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The dispatcher's own process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DispatchConfig::default()`.
pub fn load_config(path: &Path) -> Result<DispatchConfig> {
    if !path.exists() {
        let cfg = DispatchConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DispatchConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Collect `DISPATCH_*` overrides.
///
/// Booleans follow the test suite convention: `yes` or `true` (any case) is
/// true, every other value is false.
pub fn env_overrides(env: &dyn EnvSource) -> Result<ConfigOverrides> {
    let harness = env.var(HARNESS_ENV).filter(|value| !value.is_empty());
    let timeout_secs = match env.var(TIMEOUT_SECS_ENV) {
        Some(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("{TIMEOUT_SECS_ENV}={raw:?} is not a number: {e}"))?,
        ),
        None => None,
    };
    let inherit_env = env.var(INHERIT_ENV_ENV).map(|raw| parse_bool(&raw));
    Ok(ConfigOverrides {
        harness,
        timeout_secs,
        inherit_env,
    })
}

pub fn parse_bool(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("yes") || raw.eq_ignore_ascii_case("true")
}
