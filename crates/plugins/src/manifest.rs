//! Node entry file parsing.
//!
//! A node declares its contract as TOML:
//! ```text
//! name = "Smart Resolution Calculator"
//!
//! [class_mappings]
//! SmartResolutionCalc = "smart_resolution_calc.nodes:SmartResolutionCalc"
//!
//! [display_name_mappings]
//! SmartResolutionCalc = "Smart Resolution Calculator"
//! ```
//!
//! Both tables are required, even when empty.

use std::{collections::BTreeMap, fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference to a node class implementation, as the host resolves it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(String);

impl NodeHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw entry file, before the contract is checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class_mappings: Option<BTreeMap<String, NodeHandle>>,
    #[serde(default)]
    pub display_name_mappings: Option<BTreeMap<String, String>>,
}

/// The two collections every node must export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeExports {
    /// Human label from the entry file, if any.
    pub label: Option<String>,
    pub class_mappings: BTreeMap<String, NodeHandle>,
    pub display_name_mappings: BTreeMap<String, String>,
}

impl NodeExports {
    pub fn class_count(&self) -> usize {
        self.class_mappings.len()
    }
}

/// Parse and validate an entry file for `node`.
pub fn parse_node_manifest(content: &str, path: &Path, node: &str) -> Result<NodeExports> {
    let manifest: NodeManifest =
        toml::from_str(content).map_err(|e| Error::invalid_entry(path, e.to_string()))?;
    manifest.into_exports(path, node)
}

impl NodeManifest {
    /// Check the contract: both exports present, no empty keys or handles.
    pub fn into_exports(self, path: &Path, node: &str) -> Result<NodeExports> {
        let class_mappings = self
            .class_mappings
            .ok_or_else(|| Error::missing_export(node, "class_mappings"))?;
        let display_name_mappings = self
            .display_name_mappings
            .ok_or_else(|| Error::missing_export(node, "display_name_mappings"))?;

        if let Some((key, _)) = class_mappings
            .iter()
            .find(|(k, v)| k.trim().is_empty() || v.as_str().trim().is_empty())
        {
            return Err(Error::invalid_entry(
                path,
                format!("empty class id or handle in class_mappings (key '{key}')"),
            ));
        }
        if display_name_mappings.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::invalid_entry(
                path,
                "empty class id in display_name_mappings",
            ));
        }

        Ok(NodeExports {
            label: self.name.filter(|n| !n.trim().is_empty()),
            class_mappings,
            display_name_mappings,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_entry() {
        let content = r#"
name = "Fit Mask to Image"

[class_mappings]
FitMaskToImage = "fit_mask_to_image.nodes:FitMaskToImage"
FitMaskBatch = "fit_mask_to_image.nodes:FitMaskBatch"

[display_name_mappings]
FitMaskToImage = "Fit Mask to Image"
"#;
        let exports = parse_node_manifest(content, Path::new("/n/node.toml"), "fmi").unwrap();
        assert_eq!(exports.label.as_deref(), Some("Fit Mask to Image"));
        assert_eq!(exports.class_count(), 2);
        assert_eq!(
            exports.class_mappings["FitMaskToImage"].as_str(),
            "fit_mask_to_image.nodes:FitMaskToImage"
        );
        assert_eq!(exports.display_name_mappings.len(), 1);
    }

    #[test]
    fn empty_tables_are_valid() {
        let content = "[class_mappings]\n[display_name_mappings]\n";
        let exports = parse_node_manifest(content, Path::new("/n/node.toml"), "empty").unwrap();
        assert_eq!(exports.class_count(), 0);
        assert!(exports.label.is_none());
    }

    #[test]
    fn missing_class_mappings_is_typed_error() {
        let content = "[display_name_mappings]\nA = \"A\"\n";
        let err = parse_node_manifest(content, Path::new("/n/node.toml"), "broken").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingExport {
                export: "class_mappings",
                ..
            }
        ));
    }

    #[test]
    fn missing_display_names_is_typed_error() {
        let content = "[class_mappings]\nA = \"mod:A\"\n";
        let err = parse_node_manifest(content, Path::new("/n/node.toml"), "broken").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingExport {
                export: "display_name_mappings",
                ..
            }
        ));
    }

    #[test]
    fn empty_handle_is_rejected() {
        let content = "[class_mappings]\nA = \"\"\n[display_name_mappings]\n";
        let err = parse_node_manifest(content, Path::new("/n/node.toml"), "bad").unwrap_err();
        assert!(matches!(err, Error::InvalidEntry { .. }));
    }

    #[test]
    fn malformed_toml_is_invalid_entry() {
        let err =
            parse_node_manifest("[class_mappings", Path::new("/n/node.toml"), "bad").unwrap_err();
        assert!(err.to_string().contains("/n/node.toml"));
    }
}
