//! Minimal deployment: one app, defaults everywhere.
//!
//! ```sh
//! DEPLOY_TOKEN=... cargo run --example basic_deploy
//! ```

use ballista::{DeployConfig, Pipeline};

fn main() -> anyhow::Result<()> {
    let config = DeployConfig::new(
        "hello-web",
        "https://github.com/acme/hello-web.git",
        "203.0.113.10",
    )
    .app_port(3000)
    .domain("hello.example.com");

    Pipeline::new(config).run()?;
    Ok(())
}
