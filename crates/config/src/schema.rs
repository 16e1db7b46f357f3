/// Config schema types (dev mode toggler, node source table, web sync, loader).
use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DazzleConfig {
    pub dev_mode: DevModeConfig,
    /// Node directory name -> development checkout used in dev mode.
    pub nodes: BTreeMap<String, PathBuf>,
    pub sync: SyncConfig,
    pub loader: LoaderConfig,
}

impl Default for DazzleConfig {
    fn default() -> Self {
        Self {
            dev_mode: DevModeConfig::default(),
            nodes: default_node_sources(),
            sync: SyncConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

/// Built-in node source table.
pub fn default_node_sources() -> BTreeMap<String, PathBuf> {
    BTreeMap::from([
        (
            "smart-resolution-calc".to_string(),
            PathBuf::from(r"C:\code\smart-resolution-calc-repo\local"),
        ),
        (
            "fit-mask-to-image".to_string(),
            PathBuf::from(r"C:\code\ComfyUI-ImageMask-Fix\local"),
        ),
    ])
}

/// How much the `status` command inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    /// Filesystem only.
    #[default]
    Quick,
    /// Filesystem plus version-control details.
    Complete,
}

impl fmt::Display for StatusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

impl FromStr for StatusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown status mode '{other}'")),
        }
    }
}

/// Dev/publish toggler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevModeConfig {
    pub status_default_mode: StatusMode,
    pub backup_enabled: bool,
    pub verbose: bool,
    /// Backup root, relative to the project root.
    pub backup_dir: PathBuf,
    /// Ceiling for `git submodule update --init`.
    pub submodule_timeout_secs: u64,
    /// Ceiling for each status query.
    pub status_timeout_secs: u64,
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            status_default_mode: StatusMode::Quick,
            backup_enabled: true,
            verbose: false,
            backup_dir: PathBuf::from("nodes_bak"),
            submodule_timeout_secs: 120,
            status_timeout_secs: 10,
        }
    }
}

/// Layout of a web resource source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Script files directly inside the source directory form one unit.
    Flat,
    /// Each child directory is a node whose `web/` subtree forms one unit.
    Nodes,
}

/// One configured web resource source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSource {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub kind: SourceKind,
    /// Used in log lines, and as the target directory for flat sources.
    pub label: String,
}

impl SyncSource {
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            label: label.into(),
        }
    }
}

/// Web resource synchronizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Generated output directory, relative to the project root.
    pub output_dir: PathBuf,
    /// Tracked file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Sources in priority order.
    pub sources: Vec<SyncSource>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("web"),
            extensions: vec!["js".into()],
            sources: vec![
                SyncSource::new("web_src/core", SourceKind::Flat, "core"),
                SyncSource::new("core_nodes", SourceKind::Nodes, "core_nodes"),
                SyncSource::new("nodes", SourceKind::Nodes, "nodes"),
            ],
        }
    }
}

/// What happens when two nodes register the same class id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later node wins; the collision is logged and recorded.
    #[default]
    Overwrite,
    /// A node that collides contributes nothing and counts as failed.
    Reject,
}

/// Node loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Built-in nodes, relative to the project root.
    pub core_nodes_dir: PathBuf,
    /// Submodule or dev-mode nodes, relative to the project root.
    pub nodes_dir: PathBuf,
    /// Entry file every node directory must contain.
    pub entry_file: String,
    pub collision_policy: CollisionPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            core_nodes_dir: PathBuf::from("core_nodes"),
            nodes_dir: PathBuf::from("nodes"),
            entry_file: "node.toml".into(),
            collision_policy: CollisionPolicy::Overwrite,
        }
    }
}
