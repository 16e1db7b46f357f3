//! `sync-web`: copy changed node web resources into the output directory.

use std::{fmt::Write, path::PathBuf};

use {
    clap::Args,
    dazzle_websync::{SyncReport, UnitStatus, WebSync},
};

use crate::load_project;

#[derive(Args)]
pub struct SyncArgs {
    /// Skip all cache checks and sync everything.
    #[arg(long)]
    pub force: bool,
    /// Suppress output.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Extra detail, including cached units and a stats block.
    #[arg(long)]
    pub verbose: bool,
    /// Project root (defaults to the working directory).
    #[arg(long, env = "DAZZLENODES_ROOT")]
    pub root: Option<PathBuf>,
}

pub fn handle_sync(args: SyncArgs) -> anyhow::Result<()> {
    let (root, config) = load_project(args.root.clone())?;

    if !args.quiet {
        println!("[DazzleNodes] Syncing web resources...");
    }
    let report = WebSync::new(root, config.sync).run(args.force)?;

    for unit in &report.units {
        if let UnitStatus::Failed { error } = &unit.status {
            eprintln!("  [X] {}: {error}", unit.key);
        }
    }
    if !args.quiet {
        print!("{}", render_report(&report, args.verbose));
    }
    Ok(())
}

/// Per-unit lines, the closing summary, and (verbose) the stats block.
pub fn render_report(report: &SyncReport, verbose: bool) -> String {
    let mut out = String::new();

    for unit in &report.units {
        match &unit.status {
            UnitStatus::Synced {
                reason,
                files,
                failed_files,
            } => {
                let _ = write!(out, "  [{}] {} ({files} files", unit.source, unit.key);
                if *failed_files > 0 {
                    let _ = write!(out, ", {failed_files} failed");
                }
                if verbose {
                    let _ = write!(out, ", {reason}");
                }
                let _ = writeln!(out, ")");
            },
            UnitStatus::Cached if verbose => {
                let _ = writeln!(out, "  [{}] {} up-to-date (cached)", unit.source, unit.key);
            },
            UnitStatus::Cached | UnitStatus::Failed { .. } => {},
        }
    }

    if report.all_cached() {
        let _ = writeln!(
            out,
            "[DazzleNodes] All {} node(s) up-to-date (cached)",
            report.skipped()
        );
    } else {
        let _ = writeln!(
            out,
            "[DazzleNodes] Synced {} node(s), {} files in {:.2}s",
            report.synced(),
            report.files(),
            report.elapsed.as_secs_f64()
        );
        if verbose && report.skipped() > 0 {
            let _ = writeln!(
                out,
                "[DazzleNodes] Skipped {} unchanged node(s): {}",
                report.skipped(),
                report.skipped_keys().join(", ")
            );
        }
    }

    if verbose {
        let _ = writeln!(out, "\nSync Stats:");
        let _ = writeln!(out, "  All cached: {}", report.all_cached());
        let _ = writeln!(out, "  Synced: {}", report.synced());
        let _ = writeln!(out, "  Skipped: {}", report.skipped());
        let _ = writeln!(out, "  Files: {}", report.files());
        let _ = writeln!(out, "  Time: {:.3}s", report.elapsed.as_secs_f64());
    }

    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        dazzle_websync::{SyncReason, UnitReport},
        std::time::Duration,
    };

    fn report() -> SyncReport {
        SyncReport {
            units: vec![
                UnitReport {
                    key: "_core".into(),
                    source: "core".into(),
                    status: UnitStatus::Cached,
                },
                UnitReport {
                    key: "smart-resolution-calc".into(),
                    source: "nodes".into(),
                    status: UnitStatus::Synced {
                        reason: SyncReason::DevMode,
                        files: 4,
                        failed_files: 0,
                    },
                },
            ],
            elapsed: Duration::from_millis(120),
        }
    }

    #[test]
    fn plain_report() {
        let text = render_report(&report(), false);
        assert_eq!(
            text,
            "  [nodes] smart-resolution-calc (4 files)\n\
             [DazzleNodes] Synced 1 node(s), 4 files in 0.12s\n"
        );
    }

    #[test]
    fn verbose_report_has_stats_block() {
        let text = render_report(&report(), true);
        assert!(text.contains("  [core] _core up-to-date (cached)\n"));
        assert!(text.contains("(4 files, dev mode)"));
        assert!(text.contains("Skipped 1 unchanged node(s): _core"));
        assert!(text.contains("\nSync Stats:\n  All cached: false\n  Synced: 1\n"));
        assert!(text.ends_with("  Time: 0.120s\n"));
    }

    #[test]
    fn all_cached_report() {
        let report = SyncReport {
            units: vec![UnitReport {
                key: "_core".into(),
                source: "core".into(),
                status: UnitStatus::Cached,
            }],
            elapsed: Duration::ZERO,
        };
        assert_eq!(
            render_report(&report, false),
            "[DazzleNodes] All 1 node(s) up-to-date (cached)\n"
        );
    }
}
