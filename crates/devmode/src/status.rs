use std::path::{Path, PathBuf};

use {dazzle_config::StatusMode, serde::Serialize, tracing::debug};

use crate::{state::NodeState, toggler::Toggler, vcs::RepoStatus};

/// VCS view of one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "vcs")]
pub enum VcsInfo {
    Status(RepoStatus),
    Unavailable { reason: String },
}

/// Status of one configured node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub node: String,
    /// Where the node lives under the nodes directory.
    pub path: PathBuf,
    pub state: NodeState,
    /// Configured dev checkout.
    pub source: PathBuf,
    pub source_exists: bool,
    /// The active checkout: the source in dev mode, the node directory otherwise.
    pub repo: Option<VcsInfo>,
    /// The dev checkout, when it is not the active one.
    pub source_repo: Option<VcsInfo>,
}

impl Toggler {
    /// Report every configured node. Quick mode never calls the VCS.
    pub async fn status(&self, mode: StatusMode) -> Vec<NodeStatus> {
        let mut statuses = Vec::with_capacity(self.sources().len());

        for (node, source) in self.sources() {
            let path = self.node_path(node);
            let state = NodeState::detect(&path);
            let source_exists = source.exists();

            let (repo, source_repo) = match mode {
                StatusMode::Quick => (None, None),
                StatusMode::Complete => match &state {
                    NodeState::Dev { .. } => (Some(self.vcs_info(source).await), None),
                    NodeState::Publish => {
                        let repo = self.vcs_info(&path).await;
                        let source_repo = match source_exists {
                            true => Some(self.vcs_info(source).await),
                            false => None,
                        };
                        (Some(repo), source_repo)
                    },
                    NodeState::Missing => {
                        let source_repo = match source_exists {
                            true => Some(self.vcs_info(source).await),
                            false => None,
                        };
                        (None, source_repo)
                    },
                },
            };

            statuses.push(NodeStatus {
                node: node.clone(),
                path,
                state,
                source: source.clone(),
                source_exists,
                repo,
                source_repo,
            });
        }

        statuses
    }

    async fn vcs_info(&self, repo: &Path) -> VcsInfo {
        match self.vcs().status(repo).await {
            Ok(status) => VcsInfo::Status(status),
            Err(e) => {
                debug!(repo = %repo.display(), error = %e, "vcs status unavailable");
                VcsInfo::Unavailable {
                    reason: e.to_string(),
                }
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::Result, vcs::Vcs},
        async_trait::async_trait,
        std::{
            collections::BTreeMap,
            sync::{Arc, Mutex},
        },
    };

    #[derive(Default)]
    struct RecordingVcs {
        status_calls: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl Vcs for RecordingVcs {
        async fn status(&self, repo: &Path) -> Result<RepoStatus> {
            self.status_calls.lock().unwrap().push(repo.to_path_buf());
            Ok(RepoStatus {
                branch: "main".into(),
                commit: "abc1234 Initial".into(),
                short_status: " M web/calc.js".into(),
                has_changes: true,
            })
        }

        async fn submodule_update(&self, _root: &Path, _rel_path: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn setup(root: &Path) -> (Toggler, Arc<RecordingVcs>) {
        let published_source = root.join("src/published");
        std::fs::create_dir_all(&published_source).unwrap();
        std::fs::create_dir_all(root.join("nodes/published")).unwrap();

        let vcs = Arc::new(RecordingVcs::default());
        let toggler = Toggler::new(
            root,
            root.join("nodes"),
            BTreeMap::from([
                ("missing".to_string(), root.join("src/absent")),
                ("published".to_string(), published_source),
            ]),
            vcs.clone(),
        );
        (toggler, vcs)
    }

    #[tokio::test]
    async fn quick_status_never_calls_vcs() {
        let tmp = tempfile::tempdir().unwrap();
        let (toggler, vcs) = setup(tmp.path());

        let statuses = toggler.status(StatusMode::Quick).await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].state, NodeState::Missing);
        assert!(!statuses[0].source_exists);
        assert_eq!(statuses[1].state, NodeState::Publish);
        assert!(statuses.iter().all(|s| s.repo.is_none()));
        assert!(vcs.status_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_status_queries_existing_nodes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let (toggler, vcs) = setup(root);

        let statuses = toggler.status(StatusMode::Complete).await;
        let published = &statuses[1];
        assert!(matches!(
            &published.repo,
            Some(VcsInfo::Status(RepoStatus { has_changes: true, .. }))
        ));
        assert!(published.source_repo.is_some());
        assert!(statuses[0].repo.is_none());

        let calls = vcs.status_calls.lock().unwrap();
        assert_eq!(*calls, [root.join("nodes/published"), root.join("src/published")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dev_node_status_queries_its_source() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let source = root.join("checkout");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(root.join("nodes")).unwrap();
        std::os::unix::fs::symlink(&source, root.join("nodes/calc")).unwrap();

        let vcs = Arc::new(RecordingVcs::default());
        let toggler = Toggler::new(
            root,
            root.join("nodes"),
            BTreeMap::from([("calc".to_string(), source.clone())]),
            vcs.clone(),
        );
        let statuses = toggler.status(StatusMode::Complete).await;
        assert!(statuses[0].state.is_dev());
        assert!(statuses[0].source_repo.is_none());
        assert_eq!(*vcs.status_calls.lock().unwrap(), [source]);
    }
}
