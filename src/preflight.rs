//! Read-only prerequisite probe, run before anything is written.
//!
//! Collects human-readable issue strings; the orchestrator decides whether
//! to continue. Nothing here mutates state.

use std::path::Path;

use crate::setup::SetupPaths;

/// Files every installed copy of the extension ships with. Their absence
/// usually means the setup is running from the wrong directory.
pub const COMPANION_FILES: &[&str] = &[
    "index.ts",
    "bridge-server.ts",
    "claude-process.ts",
    "package.json",
    "openclaw.plugin.json",
];

/// Probe all prerequisites and return the issues found (empty = all good).
///
/// Checks, in order: the `claude`, `npx`, and `node` executables on the
/// search path, the primary config file, and the companion extension files.
pub fn preflight(paths: &SetupPaths) -> Vec<String> {
    let mut issues = Vec::new();

    issues.extend(tool_issue(
        "claude",
        "Install: https://docs.anthropic.com/en/docs/claude-code",
    ));
    issues.extend(tool_issue("npx", "Install Node.js: https://nodejs.org/"));
    issues.extend(tool_issue("node", "Install Node.js: https://nodejs.org/"));

    if !paths.primary_config.exists() {
        issues.push(format!(
            "{} not found. Run `openclaw` first to onboard.",
            paths.primary_config.display()
        ));
    }

    let missing = missing_companion_files(&paths.extension_dir);
    if !missing.is_empty() {
        issues.push(format!("Missing extension files: {}", missing.join(", ")));
    }

    issues
}

/// Check a single executable on the search path. Returns the issue string
/// if it is not found.
pub fn tool_issue(name: &str, hint: &str) -> Option<String> {
    match which::which(name) {
        Ok(_) => None,
        Err(_) => Some(format!("{name} not found. {hint}")),
    }
}

/// Companion files missing from the extension directory, in declaration
/// order.
pub fn missing_companion_files(extension_dir: &Path) -> Vec<&'static str> {
    COMPANION_FILES
        .iter()
        .copied()
        .filter(|f| !extension_dir.join(f).exists())
        .collect()
}
