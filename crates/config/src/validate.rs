//! Semantic checks on a loaded configuration.
//!
//! Parsing already rejects malformed files; this catches values that parse
//! but cannot work (zero timeouts, empty extension lists, and so on).

use std::collections::HashSet;

use crate::schema::{DazzleConfig, SourceKind};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "dev_mode.status_timeout_secs"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Check a configuration and return every problem found.
pub fn validate(config: &DazzleConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    if config.dev_mode.submodule_timeout_secs == 0 {
        out.push(Diagnostic::new(
            Severity::Error,
            "dev_mode.submodule_timeout_secs",
            "timeout of 0 seconds fails every submodule restore",
        ));
    }
    if config.dev_mode.status_timeout_secs == 0 {
        out.push(Diagnostic::new(
            Severity::Error,
            "dev_mode.status_timeout_secs",
            "timeout of 0 seconds fails every status query",
        ));
    }

    for (name, source) in &config.nodes {
        if name.is_empty() || name.contains(['/', '\\']) {
            out.push(Diagnostic::new(
                Severity::Error,
                format!("nodes.{name}"),
                "node name must be a single directory name",
            ));
        }
        if !source.is_absolute() {
            out.push(Diagnostic::new(
                Severity::Warning,
                format!("nodes.{name}"),
                format!("source path {} is relative", source.display()),
            ));
        }
    }

    if config.sync.extensions.is_empty() {
        out.push(Diagnostic::new(
            Severity::Warning,
            "sync.extensions",
            "no tracked extensions, nothing will be synced",
        ));
    }
    for ext in &config.sync.extensions {
        if ext.starts_with('.') {
            out.push(Diagnostic::new(
                Severity::Warning,
                "sync.extensions",
                format!("extension '{ext}' should not include the leading dot"),
            ));
        }
    }

    let mut labels = HashSet::new();
    for source in &config.sync.sources {
        if !labels.insert(source.label.as_str()) {
            out.push(Diagnostic::new(
                Severity::Warning,
                "sync.sources",
                format!("duplicate source label '{}'", source.label),
            ));
        }
        if source.kind == SourceKind::Flat && source.label.is_empty() {
            out.push(Diagnostic::new(
                Severity::Error,
                "sync.sources",
                format!("flat source {} needs a label", source.path.display()),
            ));
        }
    }

    if config.loader.entry_file.trim().is_empty() {
        out.push(Diagnostic::new(
            Severity::Error,
            "loader.entry_file",
            "entry file name is empty",
        ));
    }

    out
}
