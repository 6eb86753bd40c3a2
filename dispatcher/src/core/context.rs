//! Derivation of the dispatch context handed to the harness.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Child environment variable holding the script's directory.
pub const SRC_DIR_VAR: &str = "src_dir";
/// Child environment variable holding the caller's working directory.
pub const TEST_DIR_VAR: &str = "test_dir";
/// Child environment variable holding the script's base name.
pub const SCRIPT_NAME_VAR: &str = "script_name";

/// Names reserved for the context; configuration may not set them.
pub const CONTEXT_VARS: [&str; 3] = [SRC_DIR_VAR, TEST_DIR_VAR, SCRIPT_NAME_VAR];

/// Where a dispatched script lives and where it was run from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    /// Absolute directory containing the resolved script.
    pub src_dir: PathBuf,
    /// Working directory of the dispatcher process.
    pub test_dir: PathBuf,
    /// Base name of the resolved script.
    pub script_name: OsString,
}

impl DispatchContext {
    /// Derive the context from an already resolved script path.
    ///
    /// Both paths must be absolute. Resolution (symlinks, relative paths) is
    /// the caller's job; see [`crate::io::resolve`].
    pub fn from_resolved(script: &Path, test_dir: &Path) -> Result<Self> {
        if !script.is_absolute() {
            bail!("script path must be absolute: {}", script.display());
        }
        if !test_dir.is_absolute() {
            bail!("test dir must be absolute: {}", test_dir.display());
        }
        let Some(script_name) = script.file_name() else {
            bail!("script path has no file name: {}", script.display());
        };
        let Some(src_dir) = script.parent() else {
            bail!("script path has no parent: {}", script.display());
        };
        Ok(Self {
            src_dir: src_dir.to_path_buf(),
            test_dir: test_dir.to_path_buf(),
            script_name: script_name.to_os_string(),
        })
    }

    /// The `(name, value)` pairs exported to the harness.
    pub fn env_vars(&self) -> [(&'static str, OsString); 3] {
        [
            (SRC_DIR_VAR, self.src_dir.clone().into_os_string()),
            (TEST_DIR_VAR, self.test_dir.clone().into_os_string()),
            (SCRIPT_NAME_VAR, self.script_name.clone()),
        ]
    }
}
