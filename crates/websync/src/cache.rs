use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::Result;

/// Per-unit digest cache, inside the output directory.
pub const HASH_FILE: &str = ".sync_hashes.json";
/// Single-digest cache from older releases, removed on sight.
pub const LEGACY_HASH_FILE: &str = ".sync_hash";

/// Persistent digest map with atomic writes.
pub struct HashCache {
    path: PathBuf,
}

impl HashCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Cache for an output directory.
    pub fn in_dir(output_dir: &Path) -> Self {
        Self::new(output_dir.join(HASH_FILE))
    }

    /// Load the digest map.
    ///
    /// Missing, unreadable, or corrupt caches all come back empty: the worst
    /// outcome of a bad cache is a full resync.
    pub fn load(&self) -> BTreeMap<String, String> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read sync cache, resyncing");
                return BTreeMap::new();
            },
        };
        match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt sync cache, resyncing");
                BTreeMap::new()
            },
        }
    }

    /// Save atomically via temp file + rename.
    pub fn save(&self, hashes: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut data = serde_json::to_string_pretty(hashes)?;
        data.push('\n');
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Remove the legacy single-digest file. Returns whether one was removed.
pub fn cleanup_legacy(output_dir: &Path) -> bool {
    let legacy = output_dir.join(LEGACY_HASH_FILE);
    if !legacy.exists() {
        return false;
    }
    match std::fs::remove_file(&legacy) {
        Ok(()) => {
            debug!(path = %legacy.display(), "removed legacy sync hash");
            true
        },
        Err(e) => {
            warn!(path = %legacy.display(), error = %e, "failed to remove legacy sync hash");
            false
        },
    }
}
