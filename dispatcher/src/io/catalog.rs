//! Discovery of documented test scripts in a directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::header::{ScriptHeader, parse_header};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub path: PathBuf,
    pub header: ScriptHeader,
}

/// List regular files in `dir` (non-recursive) that carry a `## @file`
/// header, sorted by file name.
pub fn discover_scripts(dir: &Path) -> Result<Vec<ScriptEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), err = %e, "skipping unreadable file");
                continue;
            }
        };
        if let Some(header) = parse_header(&text) {
            entries.push(ScriptEntry { path, header });
        }
    }
    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(entries)
}
