//! Creating and removing node redirects.

use std::{path::Path, time::Duration};

use {
    dazzle_common::fs::{create_dir_redirect, is_redirect, remove_redirect},
    serde::Serialize,
    tracing::debug,
};

use crate::error::Result;

/// What kind of redirect was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Symlink,
    /// Windows directory junction, used when symlinks are not permitted.
    Junction,
}

/// Create a redirect at `link` pointing at `target`.
///
/// `target` is made absolute first so the redirect does not depend on the
/// working directory. On Windows a refused symlink falls back to a junction,
/// which needs no privilege; `timeout` bounds that subprocess.
pub async fn create_link(target: &Path, link: &Path, timeout: Duration) -> Result<LinkKind> {
    let target = std::path::absolute(target)?;
    debug!(link = %link.display(), target = %target.display(), "creating redirect");

    match create_dir_redirect(&target, link) {
        Ok(()) => Ok(LinkKind::Symlink),
        Err(e) => junction_fallback(&target, link, e, timeout).await,
    }
}

#[cfg(windows)]
async fn junction_fallback(
    target: &Path,
    link: &Path,
    cause: std::io::Error,
    timeout: Duration,
) -> Result<LinkKind> {
    use {crate::error::Error, tokio::process::Command};

    debug!(error = %cause, "symlink refused, trying junction");
    let command = format!("mklink /J {} {}", link.display(), target.display());
    let child = Command::new("cmd")
        .arg("/c")
        .arg("mklink")
        .arg("/J")
        .arg(link.as_os_str())
        .arg(target.as_os_str())
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
    Ok(LinkKind::Junction)
}

#[cfg(not(windows))]
async fn junction_fallback(
    _target: &Path,
    _link: &Path,
    cause: std::io::Error,
    _timeout: Duration,
) -> Result<LinkKind> {
    Err(cause.into())
}

/// Remove whatever is at `path`: only the link for a redirect, the whole
/// tree for a real directory. A missing path is fine.
pub fn remove_node_path(path: &Path) -> Result<()> {
    if is_redirect(path) {
        remove_redirect(path)?;
    } else if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
