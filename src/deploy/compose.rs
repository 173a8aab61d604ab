use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::deploy::{Deployer, LOG_TAIL};
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Multi-service strategy driven by the checkout's compose file.
/// Port publishing is whatever the compose file declares.
pub struct ComposeDeploy {
    file: String,
}

impl ComposeDeploy {
    #[must_use]
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
        }
    }

    fn compose(&self, remote_dir: &str, subcommand: &str) -> String {
        format!(
            "cd {} && docker compose -f {} {subcommand}",
            cmd::sh_quote(remote_dir),
            cmd::sh_quote(&self.file)
        )
    }
}

/// Bring a previous stack down, tolerating its absence.
#[must_use]
pub fn down_command(remote_dir: &str, file: &str) -> String {
    format!(
        "cd {} && docker compose -f {} down --remove-orphans 2>/dev/null || true",
        cmd::sh_quote(remote_dir),
        cmd::sh_quote(file)
    )
}

impl Deployer for ComposeDeploy {
    fn stop_previous(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        ssh.exec_interactive(&down_command(&config.remote_dir, &self.file))
    }

    fn build(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        info!("building compose stack from {}", self.file);
        ssh.exec_interactive(&self.compose(&config.remote_dir, "build"))
            .map_err(|e| DeployError::Deploy(format!("compose build: {e}")))
    }

    fn start(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        info!("starting compose stack");
        ssh.exec_interactive(&self.compose(&config.remote_dir, "up -d"))
            .map_err(|e| DeployError::Deploy(format!("compose up: {e}")))
    }

    fn verify(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        let ids = ssh
            .exec(&self.compose(&config.remote_dir, "ps -q"))
            .map_err(|_| DeployError::Validation("compose stack is not listed".into()))?;

        let running = ids.lines().filter(|l| !l.trim().is_empty()).count();
        if running == 0 {
            return Err(DeployError::Validation(
                "compose stack has no running services".into(),
            ));
        }
        info!("{running} compose service(s) running");

        let logs = ssh.exec(&format!(
            "{} 2>&1",
            self.compose(&config.remote_dir, &format!("logs --tail {LOG_TAIL}"))
        ))?;
        info!("recent stack logs:\n{logs}");

        Ok(())
    }
}
