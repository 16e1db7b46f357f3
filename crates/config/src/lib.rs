//! Configuration loading, validation, env substitution, and env overrides.
//!
//! Config files: `dazzlenodes.toml`, `dazzlenodes.yaml`, or `dazzlenodes.json`
//! Searched in the project root then `~/.config/dazzlenodes/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env;
pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    env::apply_env_overrides,
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, resolve_root},
    schema::{
        CollisionPolicy, DazzleConfig, DevModeConfig, LoaderConfig, SourceKind, StatusMode,
        SyncConfig, SyncSource,
    },
    validate::{Diagnostic, Severity, validate},
};
