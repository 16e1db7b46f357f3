//! One load pass over the discovered nodes.

use std::path::Path;

use {
    dazzle_config::{CollisionPolicy, DazzleConfig},
    tracing::{debug, error, info, warn},
};

use crate::{
    discovery::{FsNodeDiscoverer, NodeDiscoverer},
    error::Error,
    exports::HostExports,
    pack::{ManifestNodePack, NodePack},
    registry::{Collision, NodeRegistry},
};

/// A node that contributed to the registry.
#[derive(Debug, Clone)]
pub struct LoadedNode {
    pub name: String,
    pub label: Option<String>,
    pub class_count: usize,
}

/// Result of one load pass: the registry plus what happened to each node.
#[derive(Debug, Default)]
pub struct LoadPass {
    pub registry: NodeRegistry,
    pub loaded: Vec<LoadedNode>,
    pub failed: Vec<(String, Error)>,
    pub collisions: Vec<Collision>,
}

impl LoadPass {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Host contract for this pass.
    pub fn host_exports(&self, web_directory: &Path) -> HostExports {
        HostExports::from_registry(&self.registry, web_directory)
    }

    /// Emit the summary log lines for this pass.
    pub fn log_summary(&self) {
        if !self.loaded.is_empty() {
            let names: Vec<&str> = self
                .loaded
                .iter()
                .map(|n| n.label.as_deref().unwrap_or(&n.name))
                .collect();
            info!(
                count = self.loaded.len(),
                nodes = %names.join(", "),
                "loaded nodes"
            );
            info!(classes = self.registry.len(), "node classes available");
        }

        if !self.failed.is_empty() {
            warn!(count = self.failed.len(), "failed to load nodes");
            for (name, e) in &self.failed {
                warn!(node = %name, error = %e, "node failed to load");
            }
        }

        if self.loaded.is_empty() {
            error!("No nodes loaded! Check submodule initialization.");
            error!("Run: git submodule update --init --recursive");
        }
    }
}

/// Run a load pass over `packs` in order.
///
/// Each pack is isolated: a failure is recorded and the pass moves on. No
/// rollback is needed because a failing pack never touches the registry.
pub fn load_nodes<'a>(
    packs: impl IntoIterator<Item = &'a dyn NodePack>,
    policy: CollisionPolicy,
) -> LoadPass {
    let mut pass = LoadPass::default();

    for pack in packs {
        let name = pack.name().to_string();
        let exports = match pack.exports() {
            Ok(exports) => exports,
            Err(e) => {
                debug!(node = %name, error = %e, "node exports unavailable");
                pass.failed.push((name, e));
                continue;
            },
        };

        let label = exports.label.clone();
        let class_count = exports.class_count();
        match pass.registry.merge(&name, exports, policy) {
            Ok(collisions) => {
                debug!(node = %name, classes = class_count, "node loaded");
                pass.collisions.extend(collisions);
                pass.loaded.push(LoadedNode {
                    name,
                    label,
                    class_count,
                });
            },
            Err(e) => pass.failed.push((name, e)),
        }
    }

    pass
}

/// Discover every node under `root` and run one load pass.
pub fn init_aggregate(root: &Path, config: &DazzleConfig) -> LoadPass {
    let discoverer = FsNodeDiscoverer::new(FsNodeDiscoverer::default_paths(root, config));
    let packs: Vec<ManifestNodePack> = discoverer
        .discover()
        .iter()
        .map(|node| ManifestNodePack::from_discovered(node, &config.loader.entry_file))
        .collect();

    debug!(candidates = packs.len(), "discovered node directories");
    load_nodes(
        packs.iter().map(|p| p as &dyn NodePack),
        config.loader.collision_policy,
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::Result,
            manifest::{NodeExports, NodeHandle},
        },
    };

    struct StaticPack {
        name: &'static str,
        classes: Vec<&'static str>,
    }

    impl NodePack for StaticPack {
        fn name(&self) -> &str {
            self.name
        }

        fn exports(&self) -> Result<NodeExports> {
            Ok(NodeExports {
                label: None,
                class_mappings: self
                    .classes
                    .iter()
                    .map(|c| ((*c).to_string(), NodeHandle::new(*c)))
                    .collect(),
                display_name_mappings: Default::default(),
            })
        }
    }

    struct FailingPack;

    impl NodePack for FailingPack {
        fn name(&self) -> &str {
            "failing"
        }

        fn exports(&self) -> Result<NodeExports> {
            Err(Error::message("entry raised"))
        }
    }

    #[test]
    fn failing_pack_does_not_block_siblings() {
        let a = StaticPack {
            name: "a",
            classes: vec!["A1", "A2"],
        };
        let b = StaticPack {
            name: "b",
            classes: vec!["B1"],
        };
        let packs: Vec<&dyn NodePack> = vec![&a, &FailingPack, &b];
        let pass = load_nodes(packs, CollisionPolicy::Overwrite);

        assert_eq!(pass.loaded.len(), 2);
        assert_eq!(pass.failed.len(), 1);
        assert_eq!(pass.failed[0].0, "failing");
        assert_eq!(pass.registry.len(), 3);
    }

    #[test]
    fn reject_policy_records_collision_as_failure() {
        let a = StaticPack {
            name: "a",
            classes: vec!["X"],
        };
        let b = StaticPack {
            name: "b",
            classes: vec!["X", "Y"],
        };
        let packs: Vec<&dyn NodePack> = vec![&a, &b];
        let pass = load_nodes(packs, CollisionPolicy::Reject);
        assert_eq!(pass.loaded.len(), 1);
        assert!(matches!(pass.failed[0].1, Error::Collision { .. }));
        assert_eq!(pass.registry.len(), 1);
    }

    #[test]
    fn overwrite_policy_records_collisions() {
        let a = StaticPack {
            name: "a",
            classes: vec!["X"],
        };
        let b = StaticPack {
            name: "b",
            classes: vec!["X"],
        };
        let packs: Vec<&dyn NodePack> = vec![&a, &b];
        let pass = load_nodes(packs, CollisionPolicy::Overwrite);
        assert_eq!(pass.loaded.len(), 2);
        assert_eq!(pass.collisions.len(), 1);
        assert_eq!(pass.registry.owner("X"), Some("b"));
    }

    #[test]
    fn zero_nodes_is_not_an_error() {
        let pass = load_nodes(Vec::<&dyn NodePack>::new(), CollisionPolicy::Overwrite);
        assert!(pass.is_empty());
        pass.log_summary();
    }
}
