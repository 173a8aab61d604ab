//! Typed git-to-VPS deployment pipeline.
//!
//! Ballista fetches an application from a git repository,
//! provisions a remote host with Docker and nginx over SSH,
//! mirrors the tree with rsync, starts the containers, and wires
//! a reverse-proxy site in front of them - all from a typed Rust
//! config. No YAML, no shell scripts to maintain.
//!
//! The name comes from the Roman siege engine: aim once, launch.
//!
//! # Overview
//!
//! A deployment is a [`Pipeline`] around a [`DeployConfig`]. One
//! run walks a fixed sequence:
//!
//! 1. **Validate** - credential present, SSH key usable
//! 2. **Fetch** - clone or update the pinned branch into a
//!    process-scoped scratch workspace
//! 3. **Inspect** - pick the build strategy (compose file wins
//!    over a bare Dockerfile)
//! 4. **Provision** - install Docker, compose, and nginx on the
//!    host, skipping whatever is already there
//! 5. **Sync** - rsync the checkout to the remote app directory
//! 6. **Deploy** - stop the previous container or stack, build,
//!    start detached with restart-on-failure
//! 7. **Verify** - assert the runtime and containers are up,
//!    surface recent logs
//! 8. **Proxy** - enable an nginx site forwarding the public
//!    names to the loopback-bound app port
//! 9. **Probe** - HTTP checks from inside and outside (warnings
//!    only)
//!
//! The `--cleanup` flag switches to a teardown path that removes
//! the container, the proxy site, and the remote app directory.
//!
//! # Example
//!
//! Create a small binary (an `xtask` works well):
//!
//! ```rust,no_run
//! use ballista::{DeployConfig, Pipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DeployConfig::new(
//!         "my-service",
//!         "https://github.com/acme/my-service.git",
//!         "203.0.113.10",
//!     )
//!     .branch("main")
//!     .ssh_user("deploy")
//!     .ssh_key("/home/me/.ssh/id_ed25519")
//!     .app_port(3000)
//!     .domain("my-service.example.com");
//!
//!     Pipeline::new(config).run()?;
//!     Ok(())
//! }
//! ```
//!
//! Then:
//!
//! ```sh
//! # Deploy (credential comes from the environment)
//! DEPLOY_TOKEN=... cargo xtask
//!
//! # Preview generated files without deploying
//! cargo xtask --dry-run
//!
//! # Tear everything down
//! DEPLOY_TOKEN=... cargo xtask --cleanup
//! ```

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod artifact;
pub mod cmd;
pub mod config;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod nginx;
pub mod pipeline;
pub mod probe;
pub mod provision;
pub mod source;
pub mod ssh;
pub mod sync;
pub mod teardown;
pub mod workspace;

pub use artifact::BuildStrategy;
pub use config::DeployConfig;
pub use error::{DeployError, DeployResult};
pub use pipeline::Pipeline;
pub use ssh::SshSession;
pub use workspace::Workspace;
