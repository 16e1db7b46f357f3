//! Unit digests.
//!
//! A unit digest covers every tracked file's relative path and bytes, in
//! sorted path order. Relative paths use `/` so digests match across
//! platforms and checkout locations.

use std::path::{Path, PathBuf};

use {
    sha2::{Digest, Sha256},
    tracing::debug,
    walkdir::WalkDir,
};

/// A file that belongs to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Path relative to the unit root, `/`-separated.
    pub relative: String,
    pub path: PathBuf,
}

/// Collect tracked files under `dir`, sorted by relative path.
///
/// `recursive = false` only looks at direct children (flat sources).
/// Unreadable directory entries are skipped.
pub fn tracked_files(dir: &Path, extensions: &[String], recursive: bool) -> Vec<TrackedFile> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<TrackedFile> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            },
        })
        .filter(|entry| entry.path().is_file() && has_tracked_extension(entry.path(), extensions))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(dir).ok()?;
            Some(TrackedFile {
                relative: relative_key(relative),
                path: entry.path().to_path_buf(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    files
}

/// Hex SHA-256 over the given files.
///
/// A file that cannot be read contributes only its path.
pub fn digest_files(files: &[TrackedFile]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.relative.as_bytes());
        match std::fs::read(&file.path) {
            Ok(bytes) => hasher.update(&bytes),
            Err(e) => debug!(path = %file.path.display(), error = %e, "unreadable file in digest"),
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Digest of a unit rooted at `dir`.
pub fn digest_dir(dir: &Path, extensions: &[String], recursive: bool) -> String {
    digest_files(&tracked_files(dir, extensions, recursive))
}

fn has_tracked_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|tracked| tracked.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn js() -> Vec<String> {
        vec!["js".to_string()]
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("managers")).unwrap();
        std::fs::write(root.join("widget.js"), "export const w = 1;").unwrap();
        std::fs::write(root.join("managers/state.js"), "export const s = 2;").unwrap();
        std::fs::write(root.join("README.md"), "not tracked").unwrap();
        tmp
    }

    #[test]
    fn recursive_listing_is_sorted_and_filtered() {
        let tmp = fixture();
        let files = tracked_files(tmp.path(), &js(), true);
        let rels: Vec<_> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(rels, ["managers/state.js", "widget.js"]);
    }

    #[test]
    fn flat_listing_ignores_subdirectories() {
        let tmp = fixture();
        let files = tracked_files(tmp.path(), &js(), false);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, "widget.js");
    }

    #[test]
    fn digest_is_stable() {
        let tmp = fixture();
        assert_eq!(
            digest_dir(tmp.path(), &js(), true),
            digest_dir(tmp.path(), &js(), true)
        );
        assert_eq!(digest_dir(tmp.path(), &js(), true).len(), 64);
    }

    #[test]
    fn untracked_changes_do_not_affect_digest() {
        let tmp = fixture();
        let before = digest_dir(tmp.path(), &js(), true);
        std::fs::write(tmp.path().join("README.md"), "changed").unwrap();
        assert_eq!(before, digest_dir(tmp.path(), &js(), true));
    }

    #[test]
    fn one_byte_and_renames_change_digest() {
        let tmp = fixture();
        let before = digest_dir(tmp.path(), &js(), true);
        std::fs::write(tmp.path().join("widget.js"), "export const w = 2;").unwrap();
        let after_edit = digest_dir(tmp.path(), &js(), true);
        assert_ne!(before, after_edit);

        std::fs::rename(
            tmp.path().join("widget.js"),
            tmp.path().join("widget2.js"),
        )
        .unwrap();
        assert_ne!(after_edit, digest_dir(tmp.path(), &js(), true));
    }

    #[test]
    fn extension_match_ignores_dot_and_case() {
        assert!(has_tracked_extension(Path::new("a.JS"), &[".js".to_string()]));
        assert!(!has_tracked_extension(Path::new("a.json"), &js()));
        assert!(!has_tracked_extension(Path::new("Makefile"), &js()));
    }

    #[test]
    fn empty_dir_has_digest_of_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            digest_dir(tmp.path(), &js(), true),
            format!("{:x}", Sha256::new().finalize())
        );
    }
}
