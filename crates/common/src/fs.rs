//! Filesystem redirect capability.
//!
//! A "redirect" is a directory entry that points at another location: a
//! symbolic link on Unix, a directory symlink or junction on Windows. Callers
//! only ask whether a path is a redirect and where it points; the platform
//! specifics stay in this module.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Returns `true` when `path` itself is a redirect, without following it.
///
/// Dangling redirects still count; a path that does not exist does not.
pub fn is_redirect(path: &Path) -> bool {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => platform::is_redirect_type(&meta.file_type()),
        Err(_) => false,
    }
}

/// Read where a redirect points.
pub fn redirect_target(path: &Path) -> Result<PathBuf> {
    if !is_redirect(path) {
        return Err(Error::NotARedirect {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_link(path)?)
}

/// Whether a redirect points at something that no longer exists.
pub fn is_dangling(path: &Path) -> bool {
    is_redirect(path) && std::fs::metadata(path).is_err()
}

/// Create a directory redirect at `link` pointing at `target`.
///
/// On Windows this creates a directory symlink, which may be refused without
/// the required privilege; callers fall back to a junction in that case.
pub fn create_dir_redirect(target: &Path, link: &Path) -> std::io::Result<()> {
    platform::symlink_dir(target, link)
}

/// Remove a redirect without touching what it points at.
pub fn remove_redirect(path: &Path) -> std::io::Result<()> {
    platform::remove_redirect(path)
}

#[cfg(unix)]
mod platform {
    use std::{fs::FileType, path::Path};

    pub(super) fn is_redirect_type(file_type: &FileType) -> bool {
        file_type.is_symlink()
    }

    pub(super) fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    pub(super) fn remove_redirect(path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }
}

#[cfg(windows)]
mod platform {
    use std::{fs::FileType, os::windows::fs::FileTypeExt, path::Path};

    // Junctions are name-surrogate reparse points and report as symlinks.
    pub(super) fn is_redirect_type(file_type: &FileType) -> bool {
        file_type.is_symlink() || file_type.is_symlink_dir()
    }

    pub(super) fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
        std::os::windows::fs::symlink_dir(target, link)
    }

    pub(super) fn remove_redirect(path: &Path) -> std::io::Result<()> {
        std::fs::remove_dir(path)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn plain_directory_is_not_a_redirect() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_redirect(tmp.path()));
        assert!(redirect_target(tmp.path()).is_err());
    }

    #[test]
    fn missing_path_is_not_a_redirect() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_redirect(&tmp.path().join("nope")));
    }

    #[test]
    fn symlink_is_a_redirect_with_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("checkout");
        std::fs::create_dir_all(&target).unwrap();
        let link = tmp.path().join("node");
        create_dir_redirect(&target, &link).unwrap();

        assert!(is_redirect(&link));
        assert!(!is_dangling(&link));
        assert_eq!(redirect_target(&link).unwrap(), target);
    }

    #[test]
    fn dangling_symlink_is_still_a_redirect() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("gone");
        std::fs::create_dir_all(&target).unwrap();
        let link = tmp.path().join("node");
        create_dir_redirect(&target, &link).unwrap();
        std::fs::remove_dir(&target).unwrap();

        assert!(is_redirect(&link));
        assert!(is_dangling(&link));
    }

    #[test]
    fn remove_redirect_keeps_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("checkout");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();
        let link = tmp.path().join("node");
        create_dir_redirect(&target, &link).unwrap();

        remove_redirect(&link).unwrap();
        assert!(!link.exists());
        assert!(target.join("keep.txt").is_file());
    }
}
