pub mod compose;
pub mod dockerfile;

use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::artifact::BuildStrategy;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Time the stack gets to settle before assertions run.
const SETTLE: Duration = Duration::from_secs(10);

/// Log lines surfaced after a deploy for diagnosis.
pub(crate) const LOG_TAIL: u32 = 20;

/// Builds, starts, and verifies containers on the target host.
///
/// One implementation per build strategy. Every deploy is a
/// stop-then-start: there is a brief unavailability window and no
/// rollback to the previous container.
pub trait Deployer {
    /// Stop and remove whatever a previous run left behind.
    /// Idempotent: "not found" is not an error.
    fn stop_previous(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()>;

    /// Build the image(s) on the host from the synced tree.
    fn build(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()>;

    /// Start detached with restart-on-failure.
    fn start(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()>;

    /// Assert the deployment is actually running and surface
    /// recent logs. Failures here are fatal.
    fn verify(&self, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()>;
}

/// Pick the deployer for the detected strategy.
#[must_use]
pub fn for_strategy(strategy: &BuildStrategy) -> Box<dyn Deployer> {
    match strategy {
        BuildStrategy::Compose { file } => Box::new(compose::ComposeDeploy::new(file)),
        BuildStrategy::Dockerfile => Box::new(dockerfile::DockerfileDeploy),
    }
}

/// Full stop-build-start-verify sequence for one strategy.
pub fn run(deployer: &dyn Deployer, ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    deployer.stop_previous(ssh, config)?;
    deployer.build(ssh, config)?;
    deployer.start(ssh, config)?;

    info!("waiting {}s for the stack to settle", SETTLE.as_secs());
    thread::sleep(SETTLE);

    runtime_active(ssh)?;
    deployer.verify(ssh, config)
}

/// The container runtime service must be active after a deploy.
fn runtime_active(ssh: &SshSession) -> DeployResult<()> {
    let state = ssh
        .exec("systemctl is-active docker")
        .map_err(|_| DeployError::Validation("docker service is not active".into()))?;

    if state.trim() == "active" {
        Ok(())
    } else {
        Err(DeployError::Validation(format!(
            "docker service state: {state}"
        )))
    }
}

/// Subset of `docker inspect` output the validator reads.
#[derive(Debug, Deserialize)]
pub struct ContainerInfo {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "State")]
    pub state: ContainerState,
}

#[derive(Debug, Deserialize)]
pub struct ContainerState {
    #[serde(rename = "Running")]
    pub running: bool,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Parse `docker inspect <name>` output, a one-element array.
pub fn parse_inspect(raw: &str) -> DeployResult<ContainerInfo> {
    let mut infos: Vec<ContainerInfo> = serde_json::from_str(raw)?;
    infos
        .pop()
        .ok_or_else(|| DeployError::Validation("container not listed by inspect".into()))
}
