//! Shared plumbing for the `dazzlenodes`, `dev-mode`, and `sync-web` binaries.

pub mod devmode_commands;
pub mod load_commands;
pub mod sync_commands;
pub mod telemetry;

use std::path::{Path, PathBuf};

use dazzle_config::DazzleConfig;

/// Resolve the project root and load its configuration.
pub fn load_project(root: Option<PathBuf>) -> anyhow::Result<(PathBuf, DazzleConfig)> {
    let root = dazzle_config::resolve_root(root)?;
    let config = dazzle_config::discover_and_load(&root);
    Ok((root, config))
}

/// Format a path for display relative to `root` when it lives inside it.
pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Horizontal rule used by the report banners.
pub(crate) const RULE_WIDTH: usize = 70;

pub(crate) fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}
