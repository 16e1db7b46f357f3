use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env::apply_env_overrides,
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::DazzleConfig,
    validate::{Severity, validate},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "dazzlenodes.toml",
    "dazzlenodes.yaml",
    "dazzlenodes.yml",
    "dazzlenodes.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<DazzleConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config for the project at `root`.
///
/// Search order:
/// 1. `<root>/dazzlenodes.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/dazzlenodes/dazzlenodes.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `DazzleConfig::default()` when no file is found or the file
/// is broken. Environment overrides are applied last.
pub fn discover_and_load(root: &Path) -> DazzleConfig {
    let mut config = match find_config_file(root) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            match load_config(&path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                    DazzleConfig::default()
                },
            }
        },
        None => {
            debug!("no config file found, using defaults");
            DazzleConfig::default()
        },
    };

    apply_env_overrides(&mut config);

    for diag in validate(&config) {
        match diag.severity {
            Severity::Error => warn!(path = %diag.path, "config error: {}", diag.message),
            Severity::Warning => warn!(path = %diag.path, "{}", diag.message),
            Severity::Info => debug!(path = %diag.path, "{}", diag.message),
        }
    }

    config
}

/// Find the first config file for `root`, then in the user config dir.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = root.join(name);
        if p.is_file() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.is_file())
}

/// Returns the user-global config directory (`~/.config/dazzlenodes/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dazzlenodes").map(|d| d.config_dir().to_path_buf())
}

/// Resolve the project root: an explicit path wins, otherwise the working
/// directory.
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit {
        Some(path) => path,
        None => std::env::current_dir().context("failed to read working directory")?,
    };
    if !root.is_dir() {
        return Err(Error::message(format!(
            "project root {} is not a directory",
            root.display()
        )));
    }
    Ok(root)
}

fn parse_config(raw: &str, path: &Path) -> Result<DazzleConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => {
            // An empty YAML document deserializes to null.
            if raw.trim().is_empty() {
                return Ok(DazzleConfig::default());
            }
            Ok(serde_yaml::from_str(raw)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
