//! Dispatcher configuration model and override merging.
//!
//! Loading from disk and the environment lives in [`crate::io::config`].

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::context::CONTEXT_VARS;

pub const DEFAULT_HARNESS: &str = "non_native_setup";

/// Dispatcher configuration (TOML).
///
/// Missing fields fall back to the defaults, which reproduce the plain
/// `non_native_setup` delegation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Harness program, resolved against the test directory.
    pub harness: String,

    /// Kill the harness after this many seconds. Unset means wait forever.
    pub timeout_secs: Option<u64>,

    /// Whether the harness inherits the dispatcher's environment.
    pub inherit_env: bool,

    /// Extra environment variables set on the harness.
    pub env: BTreeMap<String, String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            harness: DEFAULT_HARNESS.to_string(),
            timeout_secs: None,
            inherit_env: true,
            env: BTreeMap::new(),
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.harness.trim().is_empty() {
            return Err(anyhow!("harness must be non-empty"));
        }
        if self.harness.contains('\0') {
            return Err(anyhow!("harness must not contain NUL"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        for (key, value) in &self.env {
            if key.is_empty() || key.contains('=') || key.contains('\0') {
                return Err(anyhow!("env key {key:?} is not a valid variable name"));
            }
            if CONTEXT_VARS.contains(&key.as_str()) {
                return Err(anyhow!("env key {key:?} is reserved for the dispatch context"));
            }
            if value.contains('\0') {
                return Err(anyhow!("env value for {key:?} must not contain NUL"));
            }
        }
        Ok(())
    }
}

/// Optional overrides applied on top of a loaded config.
///
/// Used for both environment variables and CLI flags; `None` keeps the
/// underlying value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub harness: Option<String>,
    pub timeout_secs: Option<u64>,
    pub inherit_env: Option<bool>,
}

/// Apply overrides to the base config and re-validate.
pub fn apply_overrides(
    mut base: DispatchConfig,
    overrides: &ConfigOverrides,
) -> Result<DispatchConfig> {
    if let Some(harness) = &overrides.harness {
        base.harness = harness.clone();
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.timeout_secs = Some(timeout_secs);
    }
    if let Some(inherit_env) = overrides.inherit_env {
        base.inherit_env = inherit_env;
    }
    base.validate()?;
    Ok(base)
}
