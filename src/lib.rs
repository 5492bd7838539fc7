//! One-shot setup for the Claude Code CLI bridge as an OpenClaw provider.
//!
//! Running the binary performs the whole installation in one pass:
//!
//! 1. **Preflight** — checks for the `claude`, `npx`, and `node`
//!    executables, the primary OpenClaw config, and the extension's
//!    companion files. Issues are reported and gated behind a yes/no
//!    prompt; nothing has been written at that point.
//! 2. **MCP document** — writes `~/.claude/bridge-mcp.json`, the server
//!    list the bridge hands to Claude Code. Fully regenerated every run.
//! 3. **Config patch** — merges the plugin, provider, and agent-default
//!    registration into `~/.openclaw/openclaw.json`.
//!
//! # Idempotence
//!
//! The patch is a fixed point after one application: re-running the setup
//! against its own output changes nothing. Each edit is one of three
//! idempotent shapes —
//!
//! - **append-if-missing** (`plugins.load.paths`): the extension path is
//!   appended at most once; existing entries keep their order.
//! - **insert-if-absent** (`models.mode`): set to `"merge"` only when the
//!   key is missing; a user's choice is never overwritten.
//! - **upsert** (plugin entry, provider record, agent-default model,
//!   streaming fields): the whole record is replaced every run. This is
//!   deliberate — it keeps the managed records canonical, at the cost of
//!   discarding manual edits placed under exactly those keys.
//!
//! Everything outside the five managed subtrees is preserved verbatim.
//!
//! # Failure model
//!
//! The primary config must already exist (OpenClaw's onboarding creates
//! it); its absence is the one fatal precondition, reported as
//! [`SetupError::MissingPrerequisite`]. An unparsable config is never
//! auto-repaired or truncated. Saving is the last step and the only
//! mutation of the primary document — a run that fails earlier leaves it
//! untouched. Writes are not atomic; re-running is the recovery path.
//!
//! # Testing seams
//!
//! All paths and the bridge port travel in [`SetupPaths`], the prompt is
//! behind the [`Confirm`] trait, and the patch itself is the pure function
//! [`patch::apply`] — so every property above is unit-testable against a
//! temp directory.

pub mod error;
pub mod mcp;
pub mod patch;
pub mod preflight;
pub mod setup;
pub mod store;
pub mod tree;

pub use error::SetupError;
pub use patch::{Applied, PatchContext, apply, patch_config};
pub use setup::{Confirm, DEFAULT_BRIDGE_PORT, Outcome, SetupPaths, StdinConfirm, run};
pub use store::{Document, load, save};
