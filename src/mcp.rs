//! The MCP server document written to `~/.claude/bridge-mcp.json`.
//!
//! The bridge reads this file to launch MCP servers that extend Claude
//! Code's capabilities. Its content is fixed — a pure function of nothing —
//! so every run overwrites the file with byte-identical output.

use std::path::Path;

use serde_json::json;

use crate::error::SetupError;
use crate::store::{self, Document};

/// Build the MCP server document: one well-known server (Playwright,
/// launched through `npx`).
pub fn mcp_document() -> Document {
    let doc = json!({
        "mcpServers": {
            "playwright": {
                "command": "npx",
                "args": ["@playwright/mcp@latest"],
            },
        },
    });
    match doc {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("literal is an object"),
    }
}

/// Write the MCP server document to `path`, replacing any prior content.
pub fn write_mcp_config(path: &Path) -> Result<(), SetupError> {
    store::save(path, &mcp_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn document_declares_playwright_server() {
        let doc = mcp_document();
        let playwright = &doc["mcpServers"]["playwright"];
        assert_eq!(playwright["command"], json!("npx"));
        assert_eq!(playwright["args"], json!(["@playwright/mcp@latest"]));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude").join("bridge-mcp.json");

        write_mcp_config(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn two_writes_are_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge-mcp.json");

        write_mcp_config(&path).unwrap();
        let first = fs::read(&path).unwrap();
        write_mcp_config(&path).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }
}
