use std::{path::PathBuf, time::Duration};

use {dazzle_common::FromMessage, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walkdir(#[from] walkdir::Error),

    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    #[error(transparent)]
    Common(#[from] dazzle_common::Error),

    #[error("not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("`{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("source not found for '{node}': {}", path.display())]
    SourceNotFound { node: String, path: PathBuf },

    #[error("unknown node '{node}' (available: {})", available.join(", "))]
    UnknownNode {
        node: String,
        available: Vec<String>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
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
