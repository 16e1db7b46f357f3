//! `dev-mode`: switch nodes between dev checkouts and submodules.

use std::{fmt::Write, path::PathBuf, process::ExitCode, sync::Arc};

use {
    clap::{CommandFactory, Parser, Subcommand},
    dazzle_config::StatusMode,
    dazzle_devmode::{
        Error as DevModeError, GitCli, Mode, NodeState, NodeStatus, Outcome, RepoStatus, Step,
        ToggleOptions, Toggler, TransitionReport, VcsInfo,
    },
};

use crate::{display_relative, load_project, rule};

#[derive(Parser)]
#[command(
    name = "dev-mode",
    about = "Switch DazzleNodes nodes between dev checkouts (links) and submodules"
)]
pub struct DevModeCli {
    #[command(subcommand)]
    pub command: Option<DevModeCommand>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show what would be done without making changes.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip backup creation.
    #[arg(long, global = true)]
    pub no_backup: bool,

    /// Project root (defaults to the working directory).
    #[arg(long, global = true, env = "DAZZLENODES_ROOT")]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum DevModeCommand {
    /// Show the current mode of every node.
    Status {
        /// State and paths only.
        #[arg(long, conflicts_with = "complete")]
        quick: bool,
        /// Include branch, last commit, and uncommitted changes.
        #[arg(long)]
        complete: bool,
    },
    /// Switch node(s) to dev mode.
    Dev {
        /// Node name or `all`.
        node: Option<String>,
    },
    /// Switch node(s) back to their submodule checkout.
    Publish {
        /// Node name or `all`.
        node: Option<String>,
    },
}

pub async fn handle_dev_mode(cli: DevModeCli) -> anyhow::Result<ExitCode> {
    let Some(command) = cli.command else {
        DevModeCli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let (root, config) = load_project(cli.root)?;
    let verbose = cli.verbose || config.dev_mode.verbose;
    let options = ToggleOptions {
        dry_run: cli.dry_run,
        backup: config.dev_mode.backup_enabled && !cli.no_backup,
        ..ToggleOptions::from_config(&config.dev_mode)
    };
    let vcs = Arc::new(GitCli::from_config(&config.dev_mode));
    let toggler = Toggler::from_config(&root, &config, vcs).with_options(options);

    let (mode, node) = match command {
        DevModeCommand::Status { quick, complete } => {
            let mode = match (quick, complete) {
                (_, true) => StatusMode::Complete,
                (true, false) => StatusMode::Quick,
                (false, false) => config.dev_mode.status_default_mode,
            };
            let statuses = toggler.status(mode).await;
            print!("{}", render_status(&toggler, &statuses, mode, verbose));
            return Ok(ExitCode::SUCCESS);
        },
        DevModeCommand::Dev { node } => (Mode::Dev, node),
        DevModeCommand::Publish { node } => (Mode::Publish, node),
    };

    let Some(node) = node else {
        let command = match mode {
            Mode::Dev => "dev",
            Mode::Publish => "publish",
        };
        println!("Error: Node name required");
        println!("Usage: dev-mode {command} <node|all>");
        println!("Available nodes: {}", toggler.available().join(", "));
        return Ok(ExitCode::FAILURE);
    };

    let result = match mode {
        Mode::Dev => toggler.to_dev(&node).await,
        Mode::Publish => toggler.to_publish(&node).await,
    };
    let report = match result {
        Ok(report) => report,
        Err(DevModeError::UnknownNode { node, available }) => {
            println!("Error: Unknown node '{node}'");
            println!("Available nodes: {}", available.join(", "));
            return Ok(ExitCode::FAILURE);
        },
        Err(e) => return Err(e.into()),
    };

    print!("{}", render_transition(&toggler, &report, verbose));
    Ok(match report.is_success() {
        true => ExitCode::SUCCESS,
        false => ExitCode::FAILURE,
    })
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", rule('='));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}\n", rule('='));
}

pub fn render_transition(toggler: &Toggler, report: &TransitionReport, verbose: bool) -> String {
    let root = toggler.root();
    let rel = |p: &std::path::Path| display_relative(root, p);
    let mut out = String::new();

    banner(
        &mut out,
        &format!("Switching to {}", report.mode.to_string().to_uppercase()),
    );
    if report.dry_run {
        let _ = writeln!(out, "[DRY-RUN] - No changes will be made\n");
    }

    for node in &report.outcomes {
        let _ = writeln!(out, "Processing: {}", node.node);

        for step in &node.steps {
            let line = match (step, report.dry_run) {
                (Step::Backup { path }, true) => format!("Would backup to: {}", rel(path)),
                (Step::Backup { path }, false) => format!("Backup created: {}", rel(path)),
                (Step::Remove { path }, true) => format!("Would remove: {}", rel(path)),
                (Step::Remove { path }, false) => format!("Removed: {}", rel(path)),
                (Step::Link { link, target, .. }, true) => {
                    format!("Would create symlink: {} -> {}", rel(link), target.display())
                },
                (Step::Link { link, target, kind }, false) => format!(
                    "Created {}: {} -> {}",
                    kind.map(|k| format!("{k:?}").to_lowercase())
                        .unwrap_or_else(|| "link".into()),
                    rel(link),
                    target.display()
                ),
                (Step::SubmoduleUpdate { path, .. }, true) => {
                    format!("Would run: git submodule update --init {path}")
                },
                (Step::SubmoduleUpdate { path, output }, false) => {
                    let mut line = format!("Ran: git submodule update --init {path}");
                    if let Some(output) = output.as_deref().filter(|o| !o.is_empty()) {
                        for l in output.lines() {
                            let _ = write!(line, "\n     {l}");
                        }
                    }
                    line
                },
            };
            if report.dry_run || verbose {
                let _ = writeln!(out, "  {line}");
            }
        }

        let _ = match &node.outcome {
            Outcome::AlreadyInMode => writeln!(out, "  [i] Already in {}", report.mode),
            Outcome::Switched if report.dry_run => Ok(()),
            Outcome::Switched => writeln!(out, "  [OK] Switched to {}", report.mode),
            Outcome::Failed(e) => writeln!(out, "  [X] {e}"),
        };
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(
        out,
        "Result: {}/{} nodes switched to {}",
        report.succeeded(),
        report.processed(),
        report.mode
    );
    let _ = writeln!(out, "{}\n", rule('='));
    out
}

pub fn render_status(
    toggler: &Toggler,
    statuses: &[NodeStatus],
    mode: StatusMode,
    verbose: bool,
) -> String {
    let mut out = String::new();
    banner(&mut out, &format!("DazzleNodes Status ({mode} mode)"));
    let _ = writeln!(out, "Root: {}\n", toggler.root().display());

    for status in statuses {
        let _ = writeln!(out, "[*] {}", status.node);
        let _ = writeln!(out, "   {}", "-".repeat(65));

        match &status.state {
            NodeState::Missing => {
                let _ = writeln!(out, "   Status: [X] {}", status.state.label());
                let _ = writeln!(out, "   Expected: {}", status.path.display());
            },
            NodeState::Dev { target, .. } => {
                let _ = writeln!(out, "   Status: [L] {}", status.state.label());
                let _ = writeln!(out, "   Target: {}", target.display());
            },
            NodeState::Publish => {
                let _ = writeln!(out, "   Status: [D] {}", status.state.label());
                let _ = writeln!(out, "   Path: {}", status.path.display());
            },
        }

        if let Some(VcsInfo::Status(repo)) = &status.repo {
            render_repo(&mut out, repo, verbose);
        }

        if status.source_exists {
            let _ = writeln!(out, "   Source: [OK] {}", status.source.display());
            if let Some(VcsInfo::Status(source)) = &status.source_repo
                && source.has_changes
            {
                let _ = writeln!(out, "   Source has uncommitted changes!");
            }
        } else {
            let _ = writeln!(out, "   Source: [X] NOT FOUND");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}\n", rule('='));
    out
}

fn render_repo(out: &mut String, repo: &RepoStatus, verbose: bool) {
    let _ = writeln!(out, "   Branch: {}", repo.branch);
    let _ = writeln!(out, "   Commit: {}", repo.commit);
    if repo.has_changes {
        let _ = writeln!(out, "   Changes: [!] UNCOMMITTED CHANGES");
        if verbose {
            let _ = writeln!(out, "\n   Git Status:");
            for line in repo.short_status.lines() {
                let _ = writeln!(out, "      {line}");
            }
        }
    } else {
        let _ = writeln!(out, "   Changes: [OK] Clean");
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        dazzle_devmode::{NodeOutcome, Result, Vcs},
        std::{collections::BTreeMap, path::Path},
    };

    struct NoVcs;

    #[async_trait::async_trait]
    impl Vcs for NoVcs {
        async fn status(&self, repo: &Path) -> Result<RepoStatus> {
            Err(DevModeError::NotARepository {
                path: repo.to_path_buf(),
            })
        }

        async fn submodule_update(&self, _root: &Path, _rel_path: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn toggler(root: &Path) -> Toggler {
        Toggler::new(
            root,
            root.join("nodes"),
            BTreeMap::from([("calc".to_string(), root.join("src"))]),
            Arc::new(NoVcs),
        )
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = DevModeCli::try_parse_from(["dev-mode", "dev", "all", "--dry-run", "-v"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(DevModeCommand::Dev { node: Some(ref n) }) if n == "all"));
    }

    #[test]
    fn quick_and_complete_conflict() {
        assert!(DevModeCli::try_parse_from(["dev-mode", "status", "--quick", "--complete"]).is_err());
    }

    #[test]
    fn dry_run_transition_lists_planned_steps() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let report = TransitionReport {
            mode: Mode::Publish,
            dry_run: true,
            outcomes: vec![NodeOutcome {
                node: "calc".into(),
                outcome: Outcome::Switched,
                steps: vec![
                    Step::Remove {
                        path: root.join("nodes/calc"),
                    },
                    Step::SubmoduleUpdate {
                        path: "nodes/calc".into(),
                        output: None,
                    },
                ],
            }],
        };

        let text = render_transition(&toggler(root), &report, false);
        assert!(text.contains("Switching to PUBLISH MODE"));
        assert!(text.contains("[DRY-RUN] - No changes will be made"));
        assert!(text.contains("  Would remove: nodes/calc\n"));
        assert!(text.contains("  Would run: git submodule update --init nodes/calc\n"));
        assert!(text.contains("Result: 1/1 nodes switched to publish mode"));
    }

    #[test]
    fn failed_transition_shows_error() {
        let tmp = tempfile::tempdir().unwrap();
        let report = TransitionReport {
            mode: Mode::Dev,
            dry_run: false,
            outcomes: vec![NodeOutcome {
                node: "calc".into(),
                outcome: Outcome::Failed(DevModeError::message("source gone")),
                steps: vec![],
            }],
        };
        let text = render_transition(&toggler(tmp.path()), &report, false);
        assert!(text.contains("  [X] source gone\n"));
        assert!(text.contains("Result: 0/1 nodes switched to dev mode"));
    }

    #[tokio::test]
    async fn quick_status_render() {
        let tmp = tempfile::tempdir().unwrap();
        let t = toggler(tmp.path());
        let statuses = t.status(StatusMode::Quick).await;
        let text = render_status(&t, &statuses, StatusMode::Quick, false);
        assert!(text.contains("DazzleNodes Status (quick mode)"));
        assert!(text.contains("[*] calc"));
        assert!(text.contains("Status: [X] MISSING"));
        assert!(text.contains("Source: [X] NOT FOUND"));
    }
}
