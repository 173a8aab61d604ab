use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

const BASE_PACKAGES: &str = "\
export DEBIAN_FRONTEND=noninteractive
apt-get update -y
apt-get install -y ca-certificates curl gnupg rsync";

const CONTAINER_RUNTIME: &str = "\
if ! command -v docker >/dev/null 2>&1; then
    curl -fsSL https://get.docker.com | sh
fi
if ! docker compose version >/dev/null 2>&1; then
    apt-get install -y docker-compose-plugin
fi
systemctl enable --now docker";

const REVERSE_PROXY: &str = "\
if ! command -v nginx >/dev/null 2>&1; then
    apt-get install -y nginx
fi
systemctl enable --now nginx";

/// Install and enable everything the application needs on the
/// target host.
///
/// Each phase runs as one strict remote session; components that
/// are already present are detected and skipped, so re-running is
/// cheap. Package manager failures propagate as fatal.
pub fn ensure_host(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("provisioning {}", ssh.destination());

    run_phase(ssh, "base packages", BASE_PACKAGES)?;
    run_phase(ssh, "container runtime", CONTAINER_RUNTIME)?;
    run_phase(ssh, "reverse proxy", REVERSE_PROXY)?;

    if config.ssh_user != "root" {
        run_phase(ssh, "docker group", &group_script(&config.ssh_user))?;
    }

    info!("host ready");
    Ok(())
}

/// Add the deploying user to the docker group, once.
#[must_use]
pub fn group_script(user: &str) -> String {
    let user = cmd::sh_quote(user);
    format!("id -nG {user} | grep -qw docker || usermod -aG docker {user}")
}

fn run_phase(ssh: &SshSession, label: &str, script: &str) -> DeployResult<()> {
    info!("provision: {label}");
    ssh.exec_script_sudo(script)
        .map_err(|e| DeployError::Provision(format!("{label}: {e}")))
}
