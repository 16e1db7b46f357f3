//! The node contract.

use std::path::PathBuf;

use crate::{
    discovery::DiscoveredNode,
    error::{Error, Result},
    manifest::{NodeExports, parse_node_manifest},
};

/// A unit that contributes classes to the registry.
///
/// `exports` is called once per load pass; an error means the node
/// contributes nothing.
pub trait NodePack {
    fn name(&self) -> &str;
    fn exports(&self) -> Result<NodeExports>;
}

/// A node whose contract is declared in an entry file on disk.
#[derive(Debug, Clone)]
pub struct ManifestNodePack {
    name: String,
    entry_path: PathBuf,
}

impl ManifestNodePack {
    pub fn new(name: impl Into<String>, entry_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            entry_path: entry_path.into(),
        }
    }

    /// Pack for a discovered directory, reading `entry_file` inside it.
    pub fn from_discovered(node: &DiscoveredNode, entry_file: &str) -> Self {
        Self::new(node.name.clone(), node.path.join(entry_file))
    }

    pub fn entry_path(&self) -> &std::path::Path {
        &self.entry_path
    }
}

impl NodePack for ManifestNodePack {
    fn name(&self) -> &str {
        &self.name
    }

    fn exports(&self) -> Result<NodeExports> {
        if !self.entry_path.is_file() {
            return Err(Error::missing_entry(&self.name, &self.entry_path));
        }
        let content = std::fs::read_to_string(&self.entry_path)?;
        parse_node_manifest(&content, &self.entry_path, &self.name)
    }
}
