use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::deploy::{Deployer, LOG_TAIL, parse_inspect};
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Single-container strategy: one image from the checkout's
/// Dockerfile, one `docker run`.
pub struct DockerfileDeploy;

/// Remove any same-name container, tolerating "no such
/// container".
#[must_use]
pub fn stop_command(app_name: &str) -> String {
    format!("docker rm -f {} 2>/dev/null || true", cmd::sh_quote(app_name))
}

#[must_use]
pub fn build_command(remote_dir: &str, app_name: &str) -> String {
    format!(
        "cd {} && docker build -t {} .",
        cmd::sh_quote(remote_dir),
        cmd::sh_quote(&format!("{app_name}:latest"))
    )
}

/// Detached, auto-restarting, with the app port bound to the
/// host's loopback only. The reverse proxy is the single public
/// entry point.
#[must_use]
pub fn run_command(config: &DeployConfig) -> String {
    format!(
        "docker run -d --name {name} --restart unless-stopped -p 127.0.0.1:{port}:{port} {tag}",
        name = cmd::sh_quote(&config.app_name),
        port = config.app_port,
        tag = cmd::sh_quote(&format!("{}:latest", config.app_name)),
    )
}

impl Deployer for DockerfileDeploy {
    fn stop_previous(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        ssh.exec_interactive(&stop_command(&config.app_name))
    }

    fn build(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        info!("building image {}:latest on host", config.app_name);
        ssh.exec_interactive(&build_command(&config.remote_dir, &config.app_name))
            .map_err(|e| DeployError::Deploy(format!("image build: {e}")))
    }

    fn start(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        info!("starting container {}", config.app_name);
        ssh.exec_interactive(&run_command(config))
            .map_err(|e| DeployError::Deploy(format!("container start: {e}")))
    }

    fn verify(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
        let raw = ssh
            .exec(&format!("docker inspect {}", cmd::sh_quote(&config.app_name)))
            .map_err(|_| {
                DeployError::Validation(format!("container '{}' is not listed", config.app_name))
            })?;

        let container = parse_inspect(&raw)?;
        if container.id.is_empty() {
            return Err(DeployError::Validation(format!(
                "container '{}' has no id",
                config.app_name
            )));
        }
        if !container.state.running {
            return Err(DeployError::Validation(format!(
                "container '{}' state: {}",
                config.app_name, container.state.status
            )));
        }

        let short_id = &container.id[..container.id.len().min(12)];
        info!("container {} running (id {short_id})", config.app_name);

        let logs = ssh.exec(&format!(
            "docker logs --tail {LOG_TAIL} {} 2>&1",
            cmd::sh_quote(&config.app_name)
        ))?;
        info!("recent container logs:\n{logs}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig::new("web", "https://example.com/web.git", "203.0.113.4").app_port(3000)
    }

    #[test]
    fn stop_ignores_missing_container() {
        let command = stop_command("web");

        assert!(command.contains("docker rm -f 'web'"));
        assert!(command.ends_with("|| true"));
    }

    #[test]
    fn build_runs_in_remote_dir() {
        let command = build_command("/opt/web", "web");

        assert!(command.starts_with("cd '/opt/web'"));
        assert!(command.contains("docker build -t 'web:latest' ."));
    }

    #[test]
    fn start_binds_loopback_only() {
        let command = run_command(&config());

        assert!(command.contains("-p 127.0.0.1:3000:3000"));
        assert!(command.contains("--restart unless-stopped"));
        assert!(command.contains("-d"));
        assert!(command.contains("--name 'web'"));
    }
}
