//! Node discovery from filesystem directories.
//!
//! Scans the configured node containers in priority order and yields one
//! [`DiscoveredNode`] per child directory. Directories without an entry file
//! are still yielded: an uninitialised submodule is an empty directory and
//! must show up as a load failure, not vanish.

use std::path::{Path, PathBuf};

use {dazzle_config::DazzleConfig, tracing::warn};

/// Where a discovered node lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    /// Built into this repository.
    Core,
    /// A submodule checkout or a dev-mode redirect.
    External,
}

/// A candidate node directory.
#[derive(Debug, Clone)]
pub struct DiscoveredNode {
    /// Directory name.
    pub name: String,
    pub path: PathBuf,
    pub origin: NodeOrigin,
    /// Dev mode: the directory is a redirect to an external checkout.
    pub is_redirect: bool,
}

/// Discovers node directories.
pub trait NodeDiscoverer {
    /// Scan configured paths and return all candidate nodes.
    fn discover(&self) -> Vec<DiscoveredNode>;
}

/// Filesystem-based node discoverer. Scans directories in priority order.
pub struct FsNodeDiscoverer {
    search_paths: Vec<(PathBuf, NodeOrigin)>,
}

impl FsNodeDiscoverer {
    pub fn new(search_paths: Vec<(PathBuf, NodeOrigin)>) -> Self {
        Self { search_paths }
    }

    /// Build the search paths for a project root from config.
    pub fn default_paths(root: &Path, config: &DazzleConfig) -> Vec<(PathBuf, NodeOrigin)> {
        vec![
            (root.join(&config.loader.core_nodes_dir), NodeOrigin::Core),
            (root.join(&config.loader.nodes_dir), NodeOrigin::External),
        ]
    }
}

impl NodeDiscoverer for FsNodeDiscoverer {
    fn discover(&self) -> Vec<DiscoveredNode> {
        let mut nodes = Vec::new();

        for (base_path, origin) in &self.search_paths {
            if !base_path.is_dir() {
                continue;
            }

            let entries = match std::fs::read_dir(base_path) {
                Ok(e) => e,
                Err(e) => {
                    warn!(path = %base_path.display(), %e, "failed to read node directory");
                    continue;
                },
            };

            let mut found: Vec<DiscoveredNode> = entries
                .flatten()
                .filter_map(|entry| {
                    let path = entry.path();
                    let name = entry.file_name().to_str()?.to_string();
                    if name.starts_with('.') || !path.is_dir() {
                        return None;
                    }
                    Some(DiscoveredNode {
                        is_redirect: dazzle_common::fs::is_redirect(&path),
                        name,
                        path,
                        origin: *origin,
                    })
                })
                .collect();
            found.sort_by(|a, b| a.name.cmp(&b.name));
            nodes.extend(found);
        }

        nodes
    }
}
