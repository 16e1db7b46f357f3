//! Mirror each node's browser scripts into the generated web directory.
//!
//! Sources are hashed per unit (the shared core library, or one node); a unit
//! is copied only when its digest changed, when forced, or when the node is
//! a dev-mode redirect. Digests persist in `<output>/.sync_hashes.json`.

pub mod cache;
pub mod error;
pub mod hash;
pub mod report;
pub mod sync;

pub use {
    cache::{HASH_FILE, HashCache, LEGACY_HASH_FILE},
    error::{Error, Result},
    report::{SyncReason, SyncReport, UnitReport, UnitStatus},
    sync::WebSync,
};
