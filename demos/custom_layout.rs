//! Deployment with a non-root user, a custom remote directory,
//! and a custom credential variable.

use ballista::{DeployConfig, Pipeline};

fn main() -> anyhow::Result<()> {
    let config = DeployConfig::new(
        "metrics-api",
        "https://git.internal.example/platform/metrics-api.git",
        "metrics.example.com",
    )
    .branch("release")
    .token_var("GITLAB_DEPLOY_TOKEN")
    .ssh_user("deploy")
    .ssh_key("/home/deploy/.ssh/deploy_ed25519")
    .app_port(8080)
    .remote_dir("/srv/metrics-api");

    Pipeline::new(config).run()?;
    Ok(())
}
