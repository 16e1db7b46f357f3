//! Environment-variable overrides layered on top of the config file.

use tracing::warn;

use crate::schema::{DazzleConfig, StatusMode};

/// Overrides `dev_mode.status_default_mode` (`quick` or `complete`).
pub const STATUS_DEFAULT_ENV: &str = "DEV_MODE_STATUS_DEFAULT";
/// Overrides `dev_mode.verbose`.
pub const VERBOSE_ENV: &str = "DEV_MODE_VERBOSE";
/// Overrides `dev_mode.backup_enabled`.
pub const BACKUP_ENV: &str = "DEV_MODE_BACKUP";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut DazzleConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut DazzleConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = lookup(STATUS_DEFAULT_ENV).filter(|v| !v.is_empty()) {
        match raw.parse::<StatusMode>() {
            Ok(mode) => config.dev_mode.status_default_mode = mode,
            Err(e) => warn!(var = STATUS_DEFAULT_ENV, error = %e, "ignoring env override"),
        }
    }
    if let Some(raw) = lookup(VERBOSE_ENV).filter(|v| !v.is_empty()) {
        config.dev_mode.verbose = parse_flag(&raw);
    }
    if let Some(raw) = lookup(BACKUP_ENV).filter(|v| !v.is_empty()) {
        config.dev_mode.backup_enabled = parse_flag(&raw);
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
