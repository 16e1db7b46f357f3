use std::path::{Path, PathBuf};

use {dazzle_common::FromMessage, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("node '{node}' has no entry file at {path}")]
    MissingEntry { node: String, path: PathBuf },

    #[error("node '{node}' does not export `{export}`")]
    MissingExport { node: String, export: &'static str },

    #[error("invalid entry file {path}: {reason}")]
    InvalidEntry { path: PathBuf, reason: String },

    #[error("node '{node}' redefines registered class ids: {}", class_ids.join(", "))]
    Collision {
        node: String,
        class_ids: Vec<String>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn missing_entry(node: impl Into<String>, path: &Path) -> Self {
        Self::MissingEntry {
            node: node.into(),
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn missing_export(node: impl Into<String>, export: &'static str) -> Self {
        Self::MissingExport {
            node: node.into(),
            export,
        }
    }

    #[must_use]
    pub fn invalid_entry(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

dazzle_common::impl_context!();
