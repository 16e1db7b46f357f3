//! Dev/publish transitions.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    dazzle_config::{DazzleConfig, DevModeConfig},
    serde::Serialize,
    tracing::{debug, info, warn},
};

use crate::{
    backup::{backup_node, timestamp},
    error::{Context, Error, Result},
    link::{LinkKind, create_link, remove_node_path},
    state::NodeState,
    vcs::Vcs,
};

/// Selector that expands to every configured node.
pub const ALL_NODES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Dev,
    Publish,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev mode"),
            Self::Publish => write!(f, "publish mode"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleOptions {
    /// Report every step without touching the filesystem or running git.
    pub dry_run: bool,
    pub backup: bool,
    /// Relative to the project root.
    pub backup_dir: PathBuf,
    /// Bounds the junction fallback on Windows.
    pub link_timeout: Duration,
}

impl ToggleOptions {
    pub fn from_config(config: &DevModeConfig) -> Self {
        Self {
            dry_run: false,
            backup: config.backup_enabled,
            backup_dir: config.backup_dir.clone(),
            link_timeout: Duration::from_secs(config.status_timeout_secs),
        }
    }
}

impl Default for ToggleOptions {
    fn default() -> Self {
        Self::from_config(&DevModeConfig::default())
    }
}

/// A step taken (or, in a dry run, planned) for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum Step {
    Backup {
        path: PathBuf,
    },
    Remove {
        path: PathBuf,
    },
    Link {
        link: PathBuf,
        target: PathBuf,
        kind: Option<LinkKind>,
    },
    SubmoduleUpdate {
        path: String,
        output: Option<String>,
    },
}

#[derive(Debug)]
pub enum Outcome {
    /// The node was already in the requested mode.
    AlreadyInMode,
    Switched,
    Failed(Error),
}

#[derive(Debug)]
pub struct NodeOutcome {
    pub node: String,
    pub outcome: Outcome,
    pub steps: Vec<Step>,
}

impl NodeOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Result of switching a selection of nodes.
#[derive(Debug)]
pub struct TransitionReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub outcomes: Vec<NodeOutcome>,
}

impl TransitionReport {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Every requested node ended in the requested mode.
    pub fn is_success(&self) -> bool {
        self.succeeded() == self.processed()
    }
}

/// Switches nodes between dev and publish mode.
pub struct Toggler {
    root: PathBuf,
    nodes_dir: PathBuf,
    sources: BTreeMap<String, PathBuf>,
    options: ToggleOptions,
    vcs: Arc<dyn Vcs>,
}

impl Toggler {
    pub fn new(
        root: impl Into<PathBuf>,
        nodes_dir: impl Into<PathBuf>,
        sources: BTreeMap<String, PathBuf>,
        vcs: Arc<dyn Vcs>,
    ) -> Self {
        Self {
            root: root.into(),
            nodes_dir: nodes_dir.into(),
            sources,
            options: ToggleOptions::default(),
            vcs,
        }
    }

    /// Node table, nodes directory, and options from `config`.
    pub fn from_config(root: &Path, config: &DazzleConfig, vcs: Arc<dyn Vcs>) -> Self {
        Self::new(
            root,
            root.join(&config.loader.nodes_dir),
            config.nodes.clone(),
            vcs,
        )
        .with_options(ToggleOptions::from_config(&config.dev_mode))
    }

    #[must_use]
    pub fn with_options(mut self, options: ToggleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ToggleOptions {
        &self.options
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &BTreeMap<String, PathBuf> {
        &self.sources
    }

    pub fn node_path(&self, name: &str) -> PathBuf {
        self.nodes_dir.join(name)
    }

    pub(crate) fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    pub fn available(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Expand `all` or validate a single node name.
    pub fn select(&self, selector: &str) -> Result<Vec<String>> {
        if selector == ALL_NODES {
            return Ok(self.available());
        }
        if self.sources.contains_key(selector) {
            return Ok(vec![selector.to_string()]);
        }
        Err(Error::UnknownNode {
            node: selector.to_string(),
            available: self.available(),
        })
    }

    pub async fn to_dev(&self, selector: &str) -> Result<TransitionReport> {
        self.transition(Mode::Dev, selector).await
    }

    pub async fn to_publish(&self, selector: &str) -> Result<TransitionReport> {
        self.transition(Mode::Publish, selector).await
    }

    async fn transition(&self, mode: Mode, selector: &str) -> Result<TransitionReport> {
        let nodes = self.select(selector)?;
        let mut outcomes = Vec::with_capacity(nodes.len());

        for node in nodes {
            let mut steps = Vec::new();
            let result = match mode {
                Mode::Dev => self.node_to_dev(&node, &mut steps).await,
                Mode::Publish => self.node_to_publish(&node, &mut steps).await,
            };
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%node, %mode, error = %e, "transition failed");
                    Outcome::Failed(e)
                },
            };
            outcomes.push(NodeOutcome {
                node,
                outcome,
                steps,
            });
        }

        Ok(TransitionReport {
            mode,
            dry_run: self.options.dry_run,
            outcomes,
        })
    }

    async fn node_to_dev(&self, node: &str, steps: &mut Vec<Step>) -> Result<Outcome> {
        let path = self.node_path(node);
        let source = self
            .sources
            .get(node)
            .with_context(|| format!("no source configured for '{node}'"))?;

        match NodeState::detect(&path) {
            NodeState::Dev { broken, target } => {
                if broken {
                    warn!(%node, target = %target.display(), "dev link target is missing");
                }
                debug!(%node, "already in dev mode");
                return Ok(Outcome::AlreadyInMode);
            },
            NodeState::Publish | NodeState::Missing => {},
        }

        if !source.exists() {
            return Err(Error::SourceNotFound {
                node: node.to_string(),
                path: source.clone(),
            });
        }

        if path.exists() {
            self.backup(node, &path, steps)?;
            self.remove(&path, steps)?;
        }

        if self.options.dry_run {
            steps.push(Step::Link {
                link: path,
                target: source.clone(),
                kind: None,
            });
            return Ok(Outcome::Switched);
        }

        std::fs::create_dir_all(&self.nodes_dir)?;
        let kind = create_link(source, &path, self.options.link_timeout).await?;
        info!(%node, target = %source.display(), ?kind, "switched to dev mode");
        steps.push(Step::Link {
            link: path,
            target: source.clone(),
            kind: Some(kind),
        });
        Ok(Outcome::Switched)
    }

    async fn node_to_publish(&self, node: &str, steps: &mut Vec<Step>) -> Result<Outcome> {
        let path = self.node_path(node);

        match NodeState::detect(&path) {
            NodeState::Publish => {
                debug!(%node, "already in publish mode");
                return Ok(Outcome::AlreadyInMode);
            },
            NodeState::Dev { .. } => {
                self.backup(node, &path, steps)?;
                self.remove(&path, steps)?;
            },
            NodeState::Missing => {},
        }

        let submodule = self.submodule_path(&path);
        if self.options.dry_run {
            steps.push(Step::SubmoduleUpdate {
                path: submodule,
                output: None,
            });
            return Ok(Outcome::Switched);
        }

        let output = self.vcs.submodule_update(&self.root, &submodule).await?;
        info!(%node, "restored submodule");
        steps.push(Step::SubmoduleUpdate {
            path: submodule,
            output: Some(output),
        });
        Ok(Outcome::Switched)
    }

    fn backup(&self, node: &str, path: &Path, steps: &mut Vec<Step>) -> Result<()> {
        if !self.options.backup {
            return Ok(());
        }
        let backup_root = self.root.join(&self.options.backup_dir);
        let stamp = timestamp();

        let backup = if self.options.dry_run {
            backup_root.join(format!("{node}_{stamp}"))
        } else {
            backup_node(path, &backup_root, &stamp)
                .with_context(|| format!("backup of '{node}' failed, aborting"))?
        };
        steps.push(Step::Backup { path: backup });
        Ok(())
    }

    fn remove(&self, path: &Path, steps: &mut Vec<Step>) -> Result<()> {
        if !self.options.dry_run {
            remove_node_path(path)?;
        }
        steps.push(Step::Remove {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Node path relative to the root, `/`-separated, as git expects.
    fn submodule_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
