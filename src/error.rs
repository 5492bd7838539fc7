use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{path} not found. Run `openclaw` first to create it.")]
    MissingPrerequisite { path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    MalformedDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine the user home directory")]
    NoHomeDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prerequisite_names_path_and_remedy() {
        let err = SetupError::MissingPrerequisite {
            path: "/home/user/.openclaw/openclaw.json".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("openclaw.json"));
        assert!(msg.contains("Run `openclaw` first"));
    }

    #[test]
    fn malformed_document_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = SetupError::MalformedDocument {
            path: "/tmp/openclaw.json".into(),
            source,
        };
        assert!(err.to_string().contains("/tmp/openclaw.json"));
    }

    #[test]
    fn io_error_formats() {
        let err = SetupError::Io {
            path: "/etc/shadow".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/etc/shadow"));
    }
}
