//! The full setup sequence: preflight, MCP document, config patch.
//!
//! All filesystem locations and the bridge port travel in [`SetupPaths`],
//! resolved once in `main` (or pointed at a temp directory in tests).
//! Confirmation is behind the [`Confirm`] trait so tests can answer
//! deterministically. Progress is printed as `[ok]` / `[--]` / `[!!]`
//! status lines; library modules below this one never print.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::SetupError;
use crate::mcp;
use crate::patch::{self, PLUGIN_ID, PatchContext};
use crate::preflight;

/// Default port the Claude Code CLI bridge listens on.
pub const DEFAULT_BRIDGE_PORT: u16 = 18810;

/// Every external location the setup touches, plus the bridge port.
#[derive(Debug, Clone)]
pub struct SetupPaths {
    /// OpenClaw's primary config, `~/.openclaw/openclaw.json`. Must exist.
    pub primary_config: PathBuf,
    /// The MCP server document, `~/.claude/bridge-mcp.json`. Overwritten.
    pub mcp_config: PathBuf,
    /// Directory the extension lives in, registered as a plugin load path.
    pub extension_dir: PathBuf,
    /// Port for the provider's base URL.
    pub bridge_port: u16,
}

impl SetupPaths {
    /// Resolve the standard per-user locations.
    ///
    /// The extension directory is where the setup binary itself lives,
    /// falling back to the working directory (the extension README says to
    /// run from there).
    pub fn discover(bridge_port: u16) -> Result<Self, SetupError> {
        let user = directories::UserDirs::new().ok_or(SetupError::NoHomeDir)?;
        let home = user.home_dir();

        Ok(SetupPaths {
            primary_config: home.join(".openclaw").join("openclaw.json"),
            mcp_config: home.join(".claude").join("bridge-mcp.json"),
            extension_dir: own_directory()?,
            bridge_port,
        })
    }

    fn patch_context(&self) -> PatchContext {
        PatchContext {
            extension_dir: self.extension_dir.clone(),
            mcp_config: self.mcp_config.clone(),
            bridge_port: self.bridge_port,
        }
    }
}

fn own_directory() -> Result<PathBuf, SetupError> {
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir().map_err(|e| SetupError::Io {
        path: PathBuf::from("."),
        source: e,
    })
}

/// Yes/no confirmation strategy, injected so tests never touch a terminal.
pub trait Confirm {
    /// Present `prompt` and return whether the user answered affirmatively.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Reads one line from stdin; anything but `y`/`yes` (or an unreadable
/// stream, e.g. an unattended run) declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// How a run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both documents written.
    Completed,
    /// The user declined to continue past preflight issues. Nothing was
    /// written.
    Declined,
}

/// Run the whole sequence: preflight → MCP document → config patch.
///
/// Preflight issues are reported and gated behind `confirm`; declining
/// returns [`Outcome::Declined`] before any write. A missing primary
/// config is only detected at the patch step, after the standalone MCP
/// document has been written — that write is independent and harmless.
pub fn run(paths: &SetupPaths, confirm: &mut dyn Confirm) -> Result<Outcome, SetupError> {
    println!("\n=== OpenClaw Claude Code CLI Extension Setup ===\n");
    println!("Extension: {}", paths.extension_dir.display());
    println!("Config:    {}", paths.primary_config.display());
    println!("MCP:       {}", paths.mcp_config.display());
    println!();

    let issues = preflight::preflight(paths);
    if !issues.is_empty() {
        println!("Prerequisite issues found:");
        for issue in &issues {
            println!("  [!!] {issue}");
        }
        println!();
        if !confirm.confirm("Continue anyway? [y/N] ") {
            return Ok(Outcome::Declined);
        }
    }

    println!("1. Creating MCP config...");
    mcp::write_mcp_config(&paths.mcp_config)?;
    println!("  [ok] MCP config written to {}", paths.mcp_config.display());

    println!("\n2. Patching OpenClaw config...");
    let applied = patch::patch_config(&paths.primary_config, &paths.patch_context())?;
    if applied.load_path_added {
        println!("  [ok] Added extension path to plugins.load.paths");
    } else {
        println!("  [--] Extension path already in plugins.load.paths");
    }
    println!("  [ok] Plugin entry configured with mcpConfigPath");
    if applied.mode_inserted {
        println!("  [ok] models.mode set to merge");
    } else {
        println!("  [--] models.mode already set, left unchanged");
    }
    println!(
        "  [ok] Model provider {PLUGIN_ID} configured (port {})",
        paths.bridge_port
    );
    println!("  [ok] Model registered in agents.defaults.models");
    println!("  [ok] Block streaming enabled (minChars=100, idleMs=500ms)");
    println!("  [ok] Config saved to {}", paths.primary_config.display());

    print_next_steps(paths.bridge_port);
    Ok(Outcome::Completed)
}

fn print_next_steps(bridge_port: u16) {
    println!(
        r#"
=== Setup Complete ===

Next steps:
  1. Start the OpenClaw gateway:
       cd <openclaw-dir> && pnpm openclaw gateway --verbose

  2. Check logs for:
       "{PLUGIN_ID} bridge started on port {bridge_port}"

  3. To use as primary model, set in openclaw.json:
       "agents.defaults.model.primary": "{PLUGIN_ID}/{PLUGIN_ID}"

  4. Or assign to a specific agent only:
       "agents.list.<agentId>.model.primary": "{PLUGIN_ID}/{PLUGIN_ID}"
"#
    );
}
