//! The shape the host application reads at import time.

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use crate::{manifest::NodeHandle, registry::NodeRegistry};

/// Top-level exports consumed by the host.
#[derive(Debug, Clone, Serialize)]
pub struct HostExports {
    #[serde(rename = "NODE_CLASS_MAPPINGS")]
    pub node_class_mappings: BTreeMap<String, NodeHandle>,
    #[serde(rename = "NODE_DISPLAY_NAME_MAPPINGS")]
    pub node_display_name_mappings: BTreeMap<String, String>,
    #[serde(rename = "WEB_DIRECTORY")]
    pub web_directory: String,
}

impl HostExports {
    /// `web_directory` is relative to the project root, e.g. `web`.
    pub fn from_registry(registry: &NodeRegistry, web_directory: &Path) -> Self {
        let dir = web_directory.to_string_lossy().replace('\\', "/");
        let web_directory = if dir.starts_with("./") || web_directory.is_absolute() {
            dir
        } else {
            format!("./{dir}")
        };

        Self {
            node_class_mappings: registry.class_mappings().clone(),
            node_display_name_mappings: registry.display_name_mappings().clone(),
            web_directory,
        }
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
