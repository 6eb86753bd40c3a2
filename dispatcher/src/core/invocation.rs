//! Planning the harness invocation from a dispatch context.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Value, json};

use crate::core::config::DispatchConfig;
use crate::core::context::DispatchContext;

/// A fully planned harness call. Nothing here depends on the dispatcher's
/// own process environment; the child environment is explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Harness path (`test_dir` joined with the configured harness).
    pub program: PathBuf,
    /// Always `[target, script_name]`.
    pub args: Vec<OsString>,
    /// Variables set on the child, context variables included.
    pub env: BTreeMap<OsString, OsString>,
    /// When false the child starts from an empty environment plus `env`.
    pub inherit_env: bool,
    /// Working directory of the child.
    pub current_dir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Build the harness invocation.
///
/// An omitted target is forwarded as an empty argument so the harness always
/// receives exactly two positional arguments.
pub fn plan_invocation(
    context: &DispatchContext,
    target: Option<&str>,
    config: &DispatchConfig,
) -> Invocation {
    let mut env: BTreeMap<OsString, OsString> = config
        .env
        .iter()
        .map(|(key, value)| (OsString::from(key), OsString::from(value)))
        .collect();
    for (name, value) in context.env_vars() {
        env.insert(OsString::from(name), value);
    }

    Invocation {
        program: context.test_dir.join(&config.harness),
        args: vec![
            OsString::from(target.unwrap_or_default()),
            context.script_name.clone(),
        ],
        env,
        inherit_env: config.inherit_env,
        current_dir: context.test_dir.clone(),
        timeout: config.timeout_secs.map(Duration::from_secs),
    }
}

impl Invocation {
    /// Human-readable JSON view of the plan (lossy for non-UTF-8 paths).
    pub fn to_json(&self) -> Value {
        let env: serde_json::Map<String, Value> = self
            .env
            .iter()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    Value::String(value.to_string_lossy().into_owned()),
                )
            })
            .collect();
        json!({
            "program": self.program.to_string_lossy(),
            "args": self
                .args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
            "env": env,
            "inherit_env": self.inherit_env,
            "current_dir": self.current_dir.to_string_lossy(),
            "timeout_secs": self.timeout.map(|timeout| timeout.as_secs()),
        })
    }
}
