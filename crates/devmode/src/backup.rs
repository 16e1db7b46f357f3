//! Timestamped node backups under `<root>/<backup_dir>/<name>_<YYYYmmdd_HHMMSS>`.

use std::path::{Path, PathBuf};

use {
    dazzle_common::fs::{is_redirect, redirect_target},
    tracing::info,
    walkdir::WalkDir,
};

use crate::error::{Context, Result};

/// Written instead of a copy when the backed-up node is a redirect.
pub const SYMLINK_INFO_FILE: &str = "SYMLINK_INFO.txt";

/// Current local time in backup-name format.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Back up `node_path` into `backup_root`.
///
/// Real directories are copied recursively with symlinks preserved as
/// symlinks. Any other file is copied into the backup directory under its own
/// name. A redirect is not followed: the backup records where it pointed.
pub fn backup_node(node_path: &Path, backup_root: &Path, stamp: &str) -> Result<PathBuf> {
    let name = node_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("node path has no name")?;
    std::fs::create_dir_all(backup_root)?;
    let backup = unique_path(backup_root, &format!("{name}_{stamp}"));

    if is_redirect(node_path) {
        let target = redirect_target(node_path)?;
        std::fs::create_dir(&backup)?;
        std::fs::write(
            backup.join(SYMLINK_INFO_FILE),
            format!("This was a symlink to: {}\n", target.display()),
        )?;
    } else if node_path.is_dir() {
        copy_tree(node_path, &backup)
            .with_context(|| format!("failed to back up {}", node_path.display()))?;
    } else {
        std::fs::create_dir(&backup)?;
        std::fs::copy(node_path, backup.join(name))
            .with_context(|| format!("failed to back up {}", node_path.display()))?;
    }

    info!(node = name, backup = %backup.display(), "backup created");
    Ok(backup)
}

/// Two backups in the same second get `_1`, `_2`, ... suffixes.
fn unique_path(dir: &Path, base: &str) -> PathBuf {
    let mut candidate = dir.join(base);
    let mut n = 1;
    while candidate.exists() || is_redirect(&candidate) {
        candidate = dir.join(format!("{base}_{n}"));
        n += 1;
    }
    candidate
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);

        if entry.file_type().is_symlink() {
            platform::copy_link(entry.path(), &target)?;
        } else if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
mod platform {
    use std::path::Path;

    pub(super) fn copy_link(src: &Path, dest: &Path) -> std::io::Result<()> {
        std::os::unix::fs::symlink(std::fs::read_link(src)?, dest)
    }
}

#[cfg(windows)]
mod platform {
    use std::path::Path;

    pub(super) fn copy_link(src: &Path, dest: &Path) -> std::io::Result<()> {
        let target = std::fs::read_link(src)?;
        if src.is_dir() {
            std::os::windows::fs::symlink_dir(target, dest)
        } else {
            std::os::windows::fs::symlink_file(target, dest)
        }
    }
}
