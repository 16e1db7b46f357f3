//! Version-control seam.
//!
//! Everything the toggler needs from git goes through [`Vcs`], so status and
//! transitions can be tested with a recording fake. [`GitCli`] is the real
//! implementation: it shells out to `git` under explicit timeouts.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::Duration,
};

use {
    async_trait::async_trait,
    dazzle_config::DevModeConfig,
    serde::Serialize,
    tokio::process::Command,
    tracing::debug,
};

use crate::error::{Error, Result};

/// Snapshot of a working checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub branch: String,
    /// `git log -1 --oneline`.
    pub commit: String,
    /// `git status --short`, trimmed.
    pub short_status: String,
    pub has_changes: bool,
}

#[async_trait]
pub trait Vcs: Send + Sync {
    /// Branch, last commit, and working-tree state of `repo`.
    async fn status(&self, repo: &Path) -> Result<RepoStatus>;

    /// Initialise and check out the submodule at `rel_path` under `root`.
    /// Returns the command's trimmed stdout.
    async fn submodule_update(&self, root: &Path, rel_path: &str) -> Result<String>;
}

/// `git` invoked as a subprocess.
pub struct GitCli {
    program: PathBuf,
    status_timeout: Duration,
    submodule_timeout: Duration,
}

impl GitCli {
    pub fn new(status_timeout: Duration, submodule_timeout: Duration) -> Self {
        let program = which::which("git").unwrap_or_else(|_| PathBuf::from("git"));
        Self {
            program,
            status_timeout,
            submodule_timeout,
        }
    }

    pub fn from_config(config: &DevModeConfig) -> Self {
        Self::new(
            Duration::from_secs(config.status_timeout_secs),
            Duration::from_secs(config.submodule_timeout_secs),
        )
    }

    async fn git(&self, repo: &Path, args: &[&str], timeout: Duration) -> Result<String> {
        let command = format!("git -C {} {}", repo.display(), args.join(" "));
        debug!(%command, "running git");

        let child = Command::new(&self.program)
            .arg("-C")
            .arg(repo.as_os_str())
            .args(args.iter().map(OsStr::new))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout {
                command: command.clone(),
                timeout,
            })??;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn status(&self, repo: &Path) -> Result<RepoStatus> {
        // `.git` is a directory in clones and a file in submodule checkouts.
        if !repo.join(".git").exists() {
            return Err(Error::NotARepository {
                path: repo.to_path_buf(),
            });
        }

        let branch = self
            .git(repo, &["branch", "--show-current"], self.status_timeout)
            .await?;
        let short_status = self
            .git(repo, &["status", "--short"], self.status_timeout)
            .await?;
        let commit = self
            .git(repo, &["log", "-1", "--oneline"], self.status_timeout)
            .await?;

        Ok(RepoStatus {
            branch,
            commit,
            has_changes: !short_status.is_empty(),
            short_status,
        })
    }

    async fn submodule_update(&self, root: &Path, rel_path: &str) -> Result<String> {
        self.git(
            root,
            &["submodule", "update", "--init", rel_path],
            self.submodule_timeout,
        )
        .await
    }
}
