use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::workspace::Workspace;

/// Embed the credential in the clone URL, right after the scheme.
///
/// `https://github.com/acme/app.git` becomes
/// `https://<token>@github.com/acme/app.git`. URLs without an
/// http(s) scheme are returned untouched.
#[must_use]
pub fn authenticated_url(repo_url: &str, token: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = repo_url.strip_prefix(scheme) {
            return format!("{scheme}{token}@{rest}");
        }
    }
    repo_url.to_string()
}

/// Bring the workspace checkout to the tip of the configured
/// branch: update in place when a checkout already exists, clone
/// otherwise. A failed pull propagates as fatal.
pub fn fetch(config: &DeployConfig, workspace: &Workspace) -> DeployResult<()> {
    let repo_dir = workspace.repo_dir();
    let dir = repo_dir.to_string_lossy().to_string();

    if repo_dir.join(".git").exists() {
        info!("updating existing checkout on '{}'", config.branch);
        cmd::run("git", &["-C", &dir, "fetch", "origin", &config.branch])?;
        cmd::run("git", &["-C", &dir, "checkout", &config.branch])?;
        cmd::run("git", &["-C", &dir, "pull", "origin", &config.branch])?;
    } else {
        info!("cloning {} (branch '{}')", config.repo_url, config.branch);
        let token = config.token()?;
        let url = authenticated_url(&config.repo_url, &token);
        cmd::run("git", &["clone", "--branch", &config.branch, &url, &dir])
            .map_err(|e| redact(e, &token))?;
    }

    info!("checkout at tip of '{}'", config.branch);
    Ok(())
}

/// Strip the credential out of a failed clone before the error
/// surfaces in logs or messages.
fn redact(err: DeployError, token: &str) -> DeployError {
    match err {
        DeployError::CommandFailed { command, status } => DeployError::CommandFailed {
            command: command.replace(token, "***"),
            status,
        },
        other => other,
    }
}
