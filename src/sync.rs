use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;
use crate::workspace::Workspace;

/// Paths never mirrored to the target host.
pub const EXCLUDES: [&str; 4] = [".git", "node_modules", "target", "*.log"];

/// Argument vector for the mirror invocation: archive mode with
/// deletion, excludes, and the session's ssh transport.
#[must_use]
pub fn rsync_args(transport: &str, src: &str, dest: &str) -> Vec<String> {
    let mut args = vec![
        "-az".to_string(),
        "--delete".to_string(),
        "-e".to_string(),
        transport.to_string(),
    ];
    for pattern in EXCLUDES {
        args.push(format!("--exclude={pattern}"));
    }
    args.push(src.to_string());
    args.push(dest.to_string());
    args
}

/// Mirror the checkout to the remote application directory.
///
/// Delta transfer with deletion: the remote copy ends up matching
/// the local tree minus the excludes. An overwrite-mirror, not a
/// merge.
pub fn mirror(ssh: &SshSession, config: &DeployConfig, workspace: &Workspace) -> DeployResult<()> {
    ssh.exec(&format!("mkdir -p {}", cmd::sh_quote(&config.remote_dir)))?;

    let src = format!("{}/", workspace.repo_dir().display());
    let dest = format!("{}:{}/", ssh.destination(), config.remote_dir);
    let args = rsync_args(&ssh.transport(), &src, &dest);

    info!("syncing files to {}", config.remote_dir);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    cmd::run_interactive("rsync", &refs).map_err(|e| DeployError::Deploy(format!("rsync: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_mirror_with_deletion() {
        let args = rsync_args("ssh -i /tmp/key", "/tmp/ws/repo/", "root@h:/opt/app/");

        assert_eq!(args[0], "-az");
        assert_eq!(args[1], "--delete");
        assert_eq!(args[2], "-e");
        assert_eq!(args[3], "ssh -i /tmp/key");
        assert_eq!(args.last().unwrap(), "root@h:/opt/app/");
    }

    #[test]
    fn args_exclude_vcs_and_caches() {
        let args = rsync_args("ssh", "src/", "dest/");

        assert!(args.contains(&"--exclude=.git".to_string()));
        assert!(args.contains(&"--exclude=node_modules".to_string()));
        assert!(args.contains(&"--exclude=target".to_string()));
        assert!(args.contains(&"--exclude=*.log".to_string()));
    }
}
