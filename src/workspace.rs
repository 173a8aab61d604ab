use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, warn};

use crate::error::DeployResult;

/// Scratch directory for one pipeline run.
///
/// The path embeds the process id, so concurrent runs on the same
/// machine cannot collide. The checkout lives in `repo/` inside
/// it.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the scratch directory for this run.
    pub fn create(app_name: &str) -> DeployResult<Self> {
        let root = std::env::temp_dir().join(format!("ballista-{app_name}-{}", process::id()));
        fs::create_dir_all(&root)?;
        debug!("workspace at {}", root.display());
        Ok(Self { root })
    }

    /// Wrap an existing directory as a workspace.
    #[must_use]
    pub const fn at(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the repository is checked out into.
    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// Remove the scratch directory and everything in it.
    pub fn remove(&self) -> DeployResult<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

/// Removes the workspace when dropped, on success and error paths
/// alike.
pub struct CleanupGuard<'a> {
    workspace: &'a Workspace,
}

impl<'a> CleanupGuard<'a> {
    #[must_use]
    pub const fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.workspace.remove() {
            warn!("failed to remove workspace: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_remove() {
        let ws = Workspace::create("wstest").unwrap();
        assert!(ws.root().exists());
        assert!(ws.repo_dir().starts_with(ws.root()));

        ws.remove().unwrap();
        assert!(!ws.root().exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let ws = Workspace::create("wstest-idem").unwrap();
        ws.remove().unwrap();
        ws.remove().unwrap();
    }

    #[test]
    fn guard_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scratch");
        fs::create_dir_all(&root).unwrap();
        let ws = Workspace::at(root.clone());

        {
            let _guard = CleanupGuard::new(&ws);
        }

        assert!(!root.exists());
    }
}
