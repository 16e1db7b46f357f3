//! Node loading: discovery, the node contract, and the aggregate registry.
//!
//! Every node directory declares its contract in an entry file (`node.toml`
//! by default) exporting two tables: `class_mappings` and
//! `display_name_mappings`. A load pass discovers node directories, validates
//! each contract, and folds the exports into one [`NodeRegistry`]. A node that
//! fails contributes nothing and does not stop its siblings.

pub mod discovery;
pub mod error;
pub mod exports;
pub mod loader;
pub mod manifest;
pub mod pack;
pub mod registry;

pub use {
    discovery::{DiscoveredNode, FsNodeDiscoverer, NodeDiscoverer, NodeOrigin},
    error::{Error, Result},
    exports::HostExports,
    loader::{LoadPass, init_aggregate, load_nodes},
    manifest::{NodeExports, NodeHandle, NodeManifest},
    pack::{ManifestNodePack, NodePack},
    registry::{Collision, NodeRegistry},
};
