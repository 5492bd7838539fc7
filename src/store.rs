//! Load and save JSON documents.
//!
//! A document is an insertion-ordered JSON object (`serde_json`'s
//! `preserve_order` feature backs the map). Loading a path that does not
//! exist yields an empty document, so callers can patch a file into
//! existence. Saving fully replaces the file: parent directories are
//! created, output is pretty-printed with two-space indentation and a
//! single trailing newline.
//!
//! Writes are not atomic. A crash mid-write can leave a truncated file;
//! re-running the setup is the supported recovery path.

use std::path::Path;

use serde_json::Value;

use crate::error::SetupError;

/// A structured configuration document: a JSON object with
/// insertion-ordered keys.
pub type Document = serde_json::Map<String, Value>;

/// Read and parse a JSON document from `path`.
///
/// A missing file is not an error — it loads as an empty document.
/// A file that exists but is not well-formed JSON (or whose root is not
/// an object) fails with [`SetupError::MalformedDocument`].
pub fn load(path: &Path) -> Result<Document, SetupError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
        Err(e) => {
            return Err(SetupError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let value: Value =
        serde_json::from_str(&content).map_err(|e| SetupError::MalformedDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => {
            // A scalar or array root is just as unusable as a parse error.
            use serde::de::Error;
            Err(SetupError::MalformedDocument {
                path: path.to_path_buf(),
                source: serde_json::Error::custom("document root is not an object"),
            })
        }
    }
}

/// Serialize `document` and write it to `path`, replacing prior content.
///
/// Creates missing parent directories. Keys serialize in insertion order;
/// output ends with exactly one newline.
pub fn save(path: &Path, document: &Document) -> Result<(), SetupError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SetupError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut content = serde_json::to_string_pretty(document).map_err(|e| {
        SetupError::MalformedDocument {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    content.push('\n');

    std::fs::write(path, content).map_err(|e| SetupError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
