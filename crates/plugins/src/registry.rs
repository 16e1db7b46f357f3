use std::collections::BTreeMap;

use {dazzle_config::CollisionPolicy, serde::Serialize, tracing::warn};

use crate::{
    error::{Error, Result},
    manifest::{NodeExports, NodeHandle},
};

/// A class id registered by more than one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub class_id: String,
    /// Node that registered it first.
    pub previous: String,
    /// Node that tried to register it again.
    pub incoming: String,
}

/// Aggregate of every loaded node's exports.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    classes: BTreeMap<String, NodeHandle>,
    display_names: BTreeMap<String, String>,
    owners: BTreeMap<String, String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one node's exports in.
    ///
    /// With [`CollisionPolicy::Overwrite`] the incoming node wins and the
    /// collisions are returned. With [`CollisionPolicy::Reject`] a colliding
    /// node is refused as a whole and the registry is left unchanged.
    pub fn merge(
        &mut self,
        node: &str,
        exports: NodeExports,
        policy: CollisionPolicy,
    ) -> Result<Vec<Collision>> {
        let collisions: Vec<Collision> = exports
            .class_mappings
            .keys()
            .filter_map(|class_id| {
                self.owners.get(class_id).map(|previous| Collision {
                    class_id: class_id.clone(),
                    previous: previous.clone(),
                    incoming: node.to_string(),
                })
            })
            .collect();

        if !collisions.is_empty() && policy == CollisionPolicy::Reject {
            return Err(Error::Collision {
                node: node.to_string(),
                class_ids: collisions.into_iter().map(|c| c.class_id).collect(),
            });
        }

        for c in &collisions {
            warn!(
                class_id = %c.class_id,
                previous = %c.previous,
                incoming = %c.incoming,
                "class id registered twice, later node wins"
            );
        }

        for (class_id, handle) in exports.class_mappings {
            self.owners.insert(class_id.clone(), node.to_string());
            self.classes.insert(class_id, handle);
        }
        self.display_names.extend(exports.display_name_mappings);

        Ok(collisions)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_mappings(&self) -> &BTreeMap<String, NodeHandle> {
        &self.classes
    }

    pub fn display_name_mappings(&self) -> &BTreeMap<String, String> {
        &self.display_names
    }

    /// Display name for a class, falling back to the class id.
    pub fn display_name<'a>(&'a self, class_id: &'a str) -> &'a str {
        self.display_names
            .get(class_id)
            .map(String::as_str)
            .unwrap_or(class_id)
    }

    /// Node that owns a class id.
    pub fn owner(&self, class_id: &str) -> Option<&str> {
        self.owners.get(class_id).map(String::as_str)
    }
}
