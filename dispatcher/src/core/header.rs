//! Parsing of the `## @file` documentation header carried by test scripts.
//!
//! ```text
//! ###
//! ## @file mxs598.py Regression case for MXS-598 "SSL RW Router / JDBC Exception"
//! ## - use SSL for Maxscale client connection
//! ## - simple transactions in the loop
//! ```

use std::sync::LazyLock;

use regex::Regex;

static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s*@file\s+(\S+)[ \t]*(.*)$").unwrap());
static STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s*-\s*(.+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHeader {
    /// Name declared after `@file`.
    pub name: String,
    /// Rest of the `@file` line, possibly empty.
    pub summary: String,
    /// `## - ...` bullet lines following the `@file` line.
    pub steps: Vec<String>,
}

/// Extract the header from script text. Returns `None` without an `@file` line.
///
/// Steps are collected from the comment block that follows `@file`; the first
/// line that is not a `##` comment ends the header.
pub fn parse_header(text: &str) -> Option<ScriptHeader> {
    let mut lines = text.lines().map(str::trim_end);
    let captures = lines.by_ref().find_map(|line| FILE_RE.captures(line))?;
    let mut header = ScriptHeader {
        name: captures[1].to_string(),
        summary: captures[2].trim().to_string(),
        steps: Vec::new(),
    };

    for line in lines {
        if !line.starts_with("##") {
            break;
        }
        if let Some(step) = STEP_RE.captures(line) {
            header.steps.push(step[1].trim().to_string());
        }
    }
    Some(header)
}
