//! The idempotent patch applied to `openclaw.json`.
//!
//! [`apply`] is a pure function from document to document; [`patch_config`]
//! wraps it with load/save. The patch touches exactly five subtrees —
//! `plugins.load.paths`, `plugins.entries`, `models.mode`,
//! `models.providers`, and `agents.defaults` — and leaves everything else
//! untouched. Applying it to its own output changes nothing, so the setup
//! can be re-run freely.
//!
//! Plugin-entry and provider records are replaced whole on every run, not
//! field-merged. Manual edits placed under those two keys do not survive a
//! re-run; edits anywhere else do.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::error::SetupError;
use crate::store::{self, Document};
use crate::tree::{append_if_missing, ensure_array, ensure_object, insert_if_absent};

/// Identifier used for the plugin entry, the model provider, and (doubled
/// up as `provider/model`) the agent-default model key.
pub const PLUGIN_ID: &str = "claude-code-cli";

/// Inputs the patch depends on. Passed explicitly so tests can point at
/// temporary directories and arbitrary ports.
#[derive(Debug, Clone)]
pub struct PatchContext {
    /// Directory holding the extension, registered in `plugins.load.paths`.
    pub extension_dir: PathBuf,
    /// Path to the MCP server document, referenced (as a string) from the
    /// plugin entry's config.
    pub mcp_config: PathBuf,
    /// Port the bridge listens on; determines the provider's base URL.
    pub bridge_port: u16,
}

/// Outcome of applying the patch to a document.
///
/// The flags record the two conditional steps, so the caller can report
/// "added" versus "already present".
#[derive(Debug)]
pub struct Applied {
    pub document: Document,
    /// Whether the extension path was appended to `plugins.load.paths`
    /// (false: it was already listed).
    pub load_path_added: bool,
    /// Whether `models.mode` was set to `"merge"` (false: a value was
    /// already present and left alone).
    pub mode_inserted: bool,
}

/// Apply every patch step to `document`, in order. Pure and idempotent:
/// `apply(apply(d).document)` equals `apply(d)` for any `d`.
pub fn apply(mut document: Document, ctx: &PatchContext) -> Applied {
    let ext_path = ctx.extension_dir.to_string_lossy().into_owned();
    let mcp_path = ctx.mcp_config.to_string_lossy().into_owned();

    // plugins.load.paths: register the extension, at most once.
    let plugins = ensure_object(&mut document, "plugins");
    let load = ensure_object(plugins, "load");
    let paths = ensure_array(load, "paths");
    let load_path_added = append_if_missing(paths, Value::String(ext_path));

    // plugins.entries: full-record replace of our entry.
    let entries = ensure_object(plugins, "entries");
    entries.insert(
        PLUGIN_ID.to_string(),
        json!({
            "enabled": true,
            "config": {
                "mcpConfigPath": mcp_path,
            },
        }),
    );

    // models.mode: set once, never overwrite a user's choice.
    let models = ensure_object(&mut document, "models");
    let mode_inserted = insert_if_absent(models, "mode", json!("merge"));

    // models.providers: full-record replace of our provider.
    let providers = ensure_object(models, "providers");
    providers.insert(PLUGIN_ID.to_string(), provider_record(ctx.bridge_port));

    // agents.defaults.models: register the model under its composite key.
    let agents = ensure_object(&mut document, "agents");
    let defaults = ensure_object(agents, "defaults");
    let agent_models = ensure_object(defaults, "models");
    agent_models.insert(format!("{PLUGIN_ID}/{PLUGIN_ID}"), json!({}));

    // agents.defaults: block streaming tuning, fixed values.
    defaults.insert("blockStreamingDefault".to_string(), json!("on"));
    defaults.insert(
        "blockStreamingCoalesce".to_string(),
        json!({
            "minChars": 100,
            "idleMs": 500,
        }),
    );
    defaults.insert(
        "blockStreamingChunk".to_string(),
        json!({
            "minChars": 100,
            "maxChars": 4000,
            "breakPreference": "paragraph",
        }),
    );

    Applied {
        document,
        load_path_added,
        mode_inserted,
    }
}

/// The provider record for `models.providers`.
///
/// Base URL points at the local bridge; the single declared model mirrors
/// Claude Code's limits (200k context window, 16k max output tokens) and
/// costs nothing since the bridge rides the CLI subscription.
fn provider_record(bridge_port: u16) -> Value {
    json!({
        "baseUrl": format!("http://127.0.0.1:{bridge_port}/v1"),
        "apiKey": "local",
        "api": "openai-completions",
        "authHeader": false,
        "models": [
            {
                "id": PLUGIN_ID,
                "name": "Claude Code CLI",
                "api": "openai-completions",
                "reasoning": false,
                "input": ["text"],
                "cost": {"input": 0, "output": 0, "cacheRead": 0, "cacheWrite": 0},
                "contextWindow": 200_000,
                "maxTokens": 16_384,
            },
        ],
    })
}

/// Load `primary_path`, apply the patch, and save the result back.
///
/// The primary document must already exist — it is created by OpenClaw's
/// own onboarding, not by this tool. Its absence fails with
/// [`SetupError::MissingPrerequisite`] before anything is read or written.
pub fn patch_config(primary_path: &Path, ctx: &PatchContext) -> Result<Applied, SetupError> {
    if !primary_path.exists() {
        return Err(SetupError::MissingPrerequisite {
            path: primary_path.to_path_buf(),
        });
    }

    let document = store::load(primary_path)?;
    let applied = apply(document, ctx);
    store::save(primary_path, &applied.document)?;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn ctx() -> PatchContext {
        PatchContext {
            extension_dir: PathBuf::from("/opt/openclaw/extensions/claude-code-cli"),
            mcp_config: PathBuf::from("/home/user/.claude/bridge-mcp.json"),
            bridge_port: 18810,
        }
    }

    fn doc(json_str: &str) -> Document {
        serde_json::from_str(json_str).unwrap()
    }

    #[test]
    fn empty_document_gains_all_sections() {
        let applied = apply(Document::new(), &ctx());
        let d = Value::Object(applied.document);

        assert_eq!(
            d["plugins"]["load"]["paths"],
            json!(["/opt/openclaw/extensions/claude-code-cli"])
        );
        assert_eq!(d["plugins"]["entries"][PLUGIN_ID]["enabled"], json!(true));
        assert_eq!(
            d["plugins"]["entries"][PLUGIN_ID]["config"]["mcpConfigPath"],
            json!("/home/user/.claude/bridge-mcp.json")
        );
        assert_eq!(d["models"]["mode"], json!("merge"));
        assert_eq!(
            d["models"]["providers"][PLUGIN_ID]["baseUrl"],
            json!("http://127.0.0.1:18810/v1")
        );
        assert_eq!(
            d["agents"]["defaults"]["models"]["claude-code-cli/claude-code-cli"],
            json!({})
        );
        assert_eq!(
            d["agents"]["defaults"]["blockStreamingDefault"],
            json!("on")
        );
        assert!(applied.load_path_added);
        assert!(applied.mode_inserted);
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let once = apply(Document::new(), &ctx()).document;
        let twice = apply(once.clone(), &ctx());

        assert_eq!(twice.document, once);
        assert!(!twice.load_path_added);
        assert!(!twice.mode_inserted);
    }

    #[test]
    fn idempotent_from_populated_document() {
        let start = doc(
            r#"{
                "gateway": {"port": 3000},
                "plugins": {"load": {"paths": ["/elsewhere"]}},
                "models": {"mode": "replace"}
            }"#,
        );
        let once = apply(start, &ctx()).document;
        let twice = apply(once.clone(), &ctx()).document;
        assert_eq!(twice, once);
    }

    #[test]
    fn untouched_keys_survive() {
        let start = doc(
            r#"{
                "gateway": {"port": 3000, "host": "0.0.0.0"},
                "telemetry": false,
                "plugins": {"entries": {"other-plugin": {"enabled": false}}}
            }"#,
        );
        let d = Value::Object(apply(start, &ctx()).document);

        assert_eq!(d["gateway"], json!({"port": 3000, "host": "0.0.0.0"}));
        assert_eq!(d["telemetry"], json!(false));
        assert_eq!(
            d["plugins"]["entries"]["other-plugin"],
            json!({"enabled": false})
        );
    }

    #[test]
    fn extension_path_appended_once_at_end() {
        let start = doc(r#"{"plugins": {"load": {"paths": ["/first", "/second"]}}}"#);
        let once = apply(start, &ctx()).document;
        let paths = once["plugins"]["load"]["paths"].as_array().unwrap().clone();
        assert_eq!(paths[0], json!("/first"));
        assert_eq!(paths[1], json!("/second"));
        assert_eq!(
            paths[2],
            json!("/opt/openclaw/extensions/claude-code-cli")
        );

        let again = apply(once, &ctx()).document;
        let paths = again["plugins"]["load"]["paths"].as_array().unwrap();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn existing_mode_is_not_overwritten() {
        let start = doc(r#"{"models": {"mode": "replace"}}"#);
        let applied = apply(start, &ctx());
        assert_eq!(applied.document["models"]["mode"], json!("replace"));
        assert!(!applied.mode_inserted);
    }

    #[test]
    fn plugin_entry_is_replaced_whole() {
        let start = doc(
            r#"{
                "plugins": {
                    "entries": {
                        "claude-code-cli": {"enabled": false, "customField": "user edit"},
                        "sibling": {"enabled": true}
                    }
                }
            }"#,
        );
        let d = Value::Object(apply(start, &ctx()).document);

        let entry = &d["plugins"]["entries"][PLUGIN_ID];
        assert_eq!(entry["enabled"], json!(true));
        assert!(entry.get("customField").is_none());
        assert_eq!(d["plugins"]["entries"]["sibling"], json!({"enabled": true}));
    }

    #[test]
    fn provider_record_is_replaced_whole() {
        let start = doc(
            r#"{
                "models": {
                    "providers": {
                        "claude-code-cli": {"baseUrl": "http://stale:1/v1"},
                        "anthropic": {"apiKey": "sk-..."}
                    }
                }
            }"#,
        );
        let d = Value::Object(apply(start, &ctx()).document);

        assert_eq!(
            d["models"]["providers"][PLUGIN_ID]["baseUrl"],
            json!("http://127.0.0.1:18810/v1")
        );
        assert_eq!(
            d["models"]["providers"]["anthropic"],
            json!({"apiKey": "sk-..."})
        );
    }

    #[test]
    fn provider_declares_model_limits() {
        let d = Value::Object(apply(Document::new(), &ctx()).document);
        let model = &d["models"]["providers"][PLUGIN_ID]["models"][0];

        assert_eq!(model["id"], json!(PLUGIN_ID));
        assert_eq!(model["contextWindow"], json!(200_000));
        assert_eq!(model["maxTokens"], json!(16_384));
        assert_eq!(
            model["cost"],
            json!({"input": 0, "output": 0, "cacheRead": 0, "cacheWrite": 0})
        );
    }

    #[test]
    fn streaming_fields_are_overwritten() {
        let start = doc(r#"{"agents": {"defaults": {"blockStreamingDefault": "off"}}}"#);
        let d = Value::Object(apply(start, &ctx()).document);

        assert_eq!(d["agents"]["defaults"]["blockStreamingDefault"], json!("on"));
        assert_eq!(
            d["agents"]["defaults"]["blockStreamingCoalesce"],
            json!({"minChars": 100, "idleMs": 500})
        );
        assert_eq!(
            d["agents"]["defaults"]["blockStreamingChunk"],
            json!({"minChars": 100, "maxChars": 4000, "breakPreference": "paragraph"})
        );
    }

    #[test]
    fn port_flows_into_base_url() {
        let mut c = ctx();
        c.bridge_port = 9999;
        let d = Value::Object(apply(Document::new(), &c).document);
        assert_eq!(
            d["models"]["providers"][PLUGIN_ID]["baseUrl"],
            json!("http://127.0.0.1:9999/v1")
        );
    }

    #[test]
    fn patch_config_requires_existing_primary() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("openclaw.json");

        let result = patch_config(&missing, &ctx());
        assert!(matches!(
            result,
            Err(SetupError::MissingPrerequisite { .. })
        ));
        assert!(!missing.exists());
    }

    #[test]
    fn patch_config_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("openclaw.json");
        fs::write(&primary, "{}").unwrap();

        patch_config(&primary, &ctx()).unwrap();
        let first = fs::read_to_string(&primary).unwrap();

        patch_config(&primary, &ctx()).unwrap();
        let second = fs::read_to_string(&primary).unwrap();

        assert_eq!(first, second);
        assert!(first.contains("claude-code-cli"));
    }

    #[test]
    fn patch_config_rejects_malformed_primary() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("openclaw.json");
        fs::write(&primary, "{oops").unwrap();

        let result = patch_config(&primary, &ctx());
        assert!(matches!(
            result,
            Err(SetupError::MalformedDocument { .. })
        ));
        // Failed parse must leave the file untouched.
        assert_eq!(fs::read_to_string(&primary).unwrap(), "{oops");
    }
}
