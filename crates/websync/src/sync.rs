use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    time::Instant,
};

use {
    dazzle_common::fs::{is_redirect, remove_redirect},
    dazzle_config::{SourceKind, SyncConfig},
    tracing::{debug, info, warn},
};

use crate::{
    cache::{HashCache, cleanup_legacy},
    error::Result,
    hash::{TrackedFile, digest_files, tracked_files},
    report::{SyncReason, SyncReport, UnitReport, UnitStatus},
};

/// One hashed-and-copied source.
#[derive(Debug)]
struct Unit {
    key: String,
    source: String,
    dir: PathBuf,
    target: PathBuf,
    recursive: bool,
    redirect: bool,
}

/// Synchronizer for one project root.
pub struct WebSync {
    root: PathBuf,
    config: SyncConfig,
}

impl WebSync {
    pub fn new(root: impl Into<PathBuf>, config: SyncConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    /// Run one sync pass.
    ///
    /// Only failures to create the output directory or persist the cache are
    /// errors; everything per-unit or per-file is logged and reported.
    pub fn run(&self, force: bool) -> Result<SyncReport> {
        let started = Instant::now();
        let output = self.output_dir();
        std::fs::create_dir_all(&output)?;
        cleanup_legacy(&output);

        let cache = HashCache::in_dir(&output);
        let cached = cache.load();
        let mut hashes = BTreeMap::new();
        let mut report = SyncReport::default();

        for unit in self.units(&output) {
            let files = tracked_files(&unit.dir, &self.config.extensions, unit.recursive);
            let digest = digest_files(&files);

            let reason = if force {
                Some(SyncReason::Forced)
            } else if unit.redirect {
                Some(SyncReason::DevMode)
            } else {
                match cached.get(&unit.key) {
                    None => Some(SyncReason::Uncached),
                    Some(previous) if *previous != digest => Some(SyncReason::Changed),
                    Some(_) => None,
                }
            };

            let status = sync_unit(&unit, &files, digest, reason, &mut hashes);

            report.units.push(UnitReport {
                key: unit.key,
                source: unit.source,
                status,
            });
        }

        cache.save(&hashes)?;
        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Units in source priority order.
    ///
    /// A key or target already claimed by an earlier unit is skipped, so a
    /// node present in two containers syncs from the first one only.
    fn units(&self, output: &Path) -> Vec<Unit> {
        let mut units: Vec<Unit> = Vec::new();
        let mut keys = BTreeSet::new();
        let mut targets = BTreeSet::new();
        let mut claim = |unit: Unit, units: &mut Vec<Unit>| {
            if keys.contains(&unit.key) || targets.contains(&unit.target) {
                warn!(
                    unit = %unit.key,
                    source = %unit.source,
                    target = %unit.target.display(),
                    "skipping duplicate unit, already claimed by an earlier source"
                );
                return;
            }
            keys.insert(unit.key.clone());
            targets.insert(unit.target.clone());
            units.push(unit);
        };

        for source in &self.config.sources {
            let dir = self.root.join(&source.path);
            if !dir.is_dir() {
                debug!(source = %source.label, path = %dir.display(), "source does not exist");
                continue;
            }

            match source.kind {
                SourceKind::Flat => claim(
                    Unit {
                        key: format!("_{}", source.label),
                        source: source.label.clone(),
                        target: output.join(&source.label),
                        redirect: is_redirect(&dir),
                        dir,
                        recursive: false,
                    },
                    &mut units,
                ),
                SourceKind::Nodes => {
                    for (name, node_dir) in node_dirs(&dir) {
                        let web = node_dir.join("web");
                        if !web.is_dir() {
                            debug!(node = %name, "no web directory");
                            continue;
                        }
                        claim(
                            Unit {
                                target: output.join(&name),
                                key: name,
                                source: source.label.clone(),
                                redirect: is_redirect(&node_dir),
                                dir: web,
                                recursive: true,
                            },
                            &mut units,
                        );
                    }
                },
            }
        }

        units
    }
}

/// Copy one unit if `reason` says so and record its digest in `hashes`.
///
/// The digest is recorded for a cached unit or a clean copy. A unit with any
/// failed file keeps no digest, so the next run copies it again.
fn sync_unit(
    unit: &Unit,
    files: &[TrackedFile],
    digest: String,
    reason: Option<SyncReason>,
    hashes: &mut BTreeMap<String, String>,
) -> UnitStatus {
    let Some(reason) = reason else {
        debug!(unit = %unit.key, "up to date");
        hashes.insert(unit.key.clone(), digest);
        return UnitStatus::Cached;
    };

    match copy_unit(unit, files) {
        Ok((copied, failed)) => {
            info!(
                unit = %unit.key,
                source = %unit.source,
                %reason,
                files = copied,
                failed,
                "synced web resources"
            );
            if failed == 0 {
                hashes.insert(unit.key.clone(), digest);
            }
            UnitStatus::Synced {
                reason,
                files: copied,
                failed_files: failed,
            }
        },
        Err(e) => {
            warn!(unit = %unit.key, error = %e, "failed to prepare sync target");
            UnitStatus::Failed {
                error: e.to_string(),
            }
        },
    }
}

/// Child directories of a node container, sorted by name.
fn node_dirs(container: &Path) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(container) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %container.display(), error = %e, "failed to read node container");
            return Vec::new();
        },
    };

    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let path = entry.path();
            (!name.starts_with('.') && path.is_dir()).then_some((name, path))
        })
        .collect();
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    dirs
}

/// Replace the unit's target with fresh copies of `files`.
///
/// Returns `(copied, failed)`. Only failing to reset the target is an error.
fn copy_unit(unit: &Unit, files: &[TrackedFile]) -> Result<(usize, usize)> {
    reset_target(&unit.target)?;

    let mut copied = 0;
    let mut failed = 0;
    for file in files {
        let target = unit.target.join(&file.relative);
        let result = match target.parent() {
            Some(parent) => std::fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| std::fs::copy(&file.path, &target));

        match result {
            Ok(_) => {
                debug!(unit = %unit.key, file = %file.relative, "copied");
                copied += 1;
            },
            Err(e) => {
                warn!(unit = %unit.key, file = %file.relative, error = %e, "failed to copy");
                failed += 1;
            },
        }
    }

    Ok((copied, failed))
}

fn reset_target(target: &Path) -> Result<()> {
    if is_redirect(target) {
        remove_redirect(target)?;
    } else if target.is_dir() {
        std::fs::remove_dir_all(target)?;
    } else if target.exists() {
        std::fs::remove_file(target)?;
    }
    std::fs::create_dir_all(target)?;
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::cache::HASH_FILE};

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn flat_source_uses_underscored_key_and_label_target() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("web_src/core/api.js"), "export {}");
        write(&root.join("web_src/core/nested/skip.js"), "export {}");

        let report = WebSync::new(root, SyncConfig::default()).run(false).unwrap();
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].key, "_core");
        assert!(root.join("web/core/api.js").is_file());
        assert!(!root.join("web/core/nested").exists());
    }

    #[test]
    fn nodes_without_web_dir_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("nodes/empty-submodule")).unwrap();
        write(&root.join("nodes/plain/README.md"), "no web");
        write(&root.join("nodes/stray.js"), "not a node");

        let report = WebSync::new(root, SyncConfig::default()).run(false).unwrap();
        assert!(report.units.is_empty());
        assert!(root.join("web").join(HASH_FILE).is_file());
    }

    #[test]
    fn stale_files_in_target_are_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("nodes/calc/web/calc.js"), "v1");
        write(&root.join("web/calc/old.js"), "stale");

        WebSync::new(root, SyncConfig::default()).run(false).unwrap();
        assert!(root.join("web/calc/calc.js").is_file());
        assert!(!root.join("web/calc/old.js").exists());
    }

    #[test]
    fn cache_drops_units_that_no_longer_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("nodes/a/web/a.js"), "a");
        write(&root.join("nodes/b/web/b.js"), "b");
        let sync = WebSync::new(root, SyncConfig::default());
        sync.run(false).unwrap();

        std::fs::remove_dir_all(root.join("nodes/b")).unwrap();
        sync.run(false).unwrap();

        let hashes = HashCache::in_dir(&root.join("web")).load();
        assert!(hashes.contains_key("a"));
        assert!(!hashes.contains_key("b"));
    }

    #[test]
    fn forced_run_copies_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("web_src/core/api.js"), "core");
        write(&root.join("core_nodes/builtin/web/b.js"), "builtin");
        let sync = WebSync::new(root, SyncConfig::default());
        sync.run(false).unwrap();

        let report = sync.run(true).unwrap();
        assert_eq!(report.synced(), 2);
        assert!(report.units.iter().all(|u| matches!(
            u.status,
            UnitStatus::Synced {
                reason: SyncReason::Forced,
                ..
            }
        )));
    }

    #[test]
    fn node_in_both_containers_syncs_from_core_nodes_only() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("core_nodes/shared/web/x.js"), "A");
        write(&root.join("nodes/shared/web/x.js"), "B");
        let sync = WebSync::new(root, SyncConfig::default());

        let first = sync.run(false).unwrap();
        assert_eq!(first.units.len(), 1);
        assert_eq!(first.units[0].source, "core_nodes");
        assert_eq!(std::fs::read_to_string(root.join("web/shared/x.js")).unwrap(), "A");

        let second = sync.run(false).unwrap();
        assert!(second.all_cached());
        assert_eq!(std::fs::read_to_string(root.join("web/shared/x.js")).unwrap(), "A");
    }

    #[test]
    fn node_cannot_take_over_a_flat_target() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("web_src/core/api.js"), "core api");
        write(&root.join("nodes/core/web/other.js"), "node");

        let report = WebSync::new(root, SyncConfig::default()).run(false).unwrap();
        let keys: Vec<_> = report.units.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, ["_core"]);
        assert!(root.join("web/core/api.js").is_file());
        assert!(!root.join("web/core/other.js").exists());
    }

    fn unit(root: &Path) -> Unit {
        Unit {
            key: "calc".into(),
            source: "nodes".into(),
            dir: root.join("nodes/calc/web"),
            target: root.join("web/calc"),
            recursive: true,
            redirect: false,
        }
    }

    #[test]
    fn failed_file_is_skipped_and_digest_not_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("nodes/calc/web/calc.js"), "calc");
        let unit = unit(root);
        let files = vec![
            TrackedFile {
                relative: "calc.js".into(),
                path: root.join("nodes/calc/web/calc.js"),
            },
            TrackedFile {
                relative: "gone.js".into(),
                path: root.join("nodes/calc/web/gone.js"),
            },
        ];

        let mut hashes = BTreeMap::new();
        let status = sync_unit(
            &unit,
            &files,
            "digest".into(),
            Some(SyncReason::Uncached),
            &mut hashes,
        );

        assert_eq!(status, UnitStatus::Synced {
            reason: SyncReason::Uncached,
            files: 1,
            failed_files: 1,
        });
        assert!(root.join("web/calc/calc.js").is_file());
        assert!(hashes.is_empty());
    }

    #[test]
    fn clean_copy_records_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(&root.join("nodes/calc/web/calc.js"), "calc");
        let unit = unit(root);
        let files = tracked_files(&unit.dir, &["js".to_string()], true);

        let mut hashes = BTreeMap::new();
        sync_unit(&unit, &files, "digest".into(), Some(SyncReason::Changed), &mut hashes);
        assert_eq!(hashes.get("calc").map(String::as_str), Some("digest"));
    }
}
