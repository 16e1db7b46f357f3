use std::path::{Path, PathBuf};

use {
    dazzle_common::fs::{is_dangling, is_redirect, redirect_target},
    serde::Serialize,
};

/// How a node directory is currently realised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum NodeState {
    /// Nothing at the node path.
    Missing,
    /// A redirect to an external checkout. `broken` when the target is gone.
    Dev { target: PathBuf, broken: bool },
    /// A real directory, normally a submodule checkout.
    Publish,
}

impl NodeState {
    /// Inspect `path` without following redirects.
    pub fn detect(path: &Path) -> Self {
        if is_redirect(path) {
            return Self::Dev {
                target: redirect_target(path).unwrap_or_default(),
                broken: is_dangling(path),
            };
        }
        if path.exists() {
            Self::Publish
        } else {
            Self::Missing
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Missing => "MISSING",
            Self::Dev { broken: false, .. } => "DEV MODE (symlink)",
            Self::Dev { broken: true, .. } => "DEV MODE (broken link)",
            Self::Publish => "PUBLISH MODE (submodule)",
        }
    }
}
