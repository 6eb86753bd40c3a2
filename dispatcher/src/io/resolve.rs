//! Resolution of the dispatched script and the test directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Resolve a script path the way `realpath` does.
///
/// Relative paths are taken against `cwd`; every symlink is followed. The
/// result must be an existing regular file.
pub fn resolve_script(script: &Path, cwd: &Path) -> Result<PathBuf> {
    let joined = if script.is_absolute() {
        script.to_path_buf()
    } else {
        cwd.join(script)
    };
    let resolved = fs::canonicalize(&joined)
        .with_context(|| format!("resolve script {}", joined.display()))?;
    let metadata =
        fs::metadata(&resolved).with_context(|| format!("stat {}", resolved.display()))?;
    if !metadata.is_file() {
        bail!("script {} is not a regular file", resolved.display());
    }
    debug!(script = %script.display(), resolved = %resolved.display(), "resolved script");
    Ok(resolved)
}

/// The dispatcher's working directory, which becomes `test_dir`.
pub fn current_test_dir() -> Result<PathBuf> {
    env::current_dir().context("read current directory")
}
