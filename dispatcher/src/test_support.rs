//! Test-only helpers: scratch test directories and a scripted harness runner.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::invocation::Invocation;
use crate::core::types::HarnessOutcome;
use crate::io::process::HarnessRunner;

/// A temporary directory standing in for both `test_dir` and `src_dir`.
pub struct TestDir {
    temp: TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Symlink-free path of the directory (tempdirs may live under a symlink).
    pub fn canonical(&self) -> PathBuf {
        fs::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write an executable shell script to `rel`.
    #[cfg(unix)]
    pub fn write_executable(&self, rel: &str, body: &str) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_file(rel, &format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", path.display()))?;
        Ok(path)
    }

    /// Install a `non_native_setup` harness with the given shell body.
    #[cfg(unix)]
    pub fn write_harness(&self, body: &str) -> Result<PathBuf> {
        self.write_executable(crate::core::config::DEFAULT_HARNESS, body)
    }
}

/// Harness runner that records invocations and returns a fixed outcome.
pub struct ScriptedRunner {
    outcome: HarnessOutcome,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new(outcome: HarnessOutcome) -> Self {
        Self {
            outcome,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl HarnessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<HarnessOutcome> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(self.outcome)
    }
}
