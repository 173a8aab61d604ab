use clap::Parser;
use tracing::info;

use crate::artifact;
use crate::cmd;
use crate::config::DeployConfig;
use crate::deploy;
use crate::error::{DeployError, DeployResult};
use crate::logging;
use crate::nginx;
use crate::probe;
use crate::provision;
use crate::source;
use crate::ssh::SshSession;
use crate::sync;
use crate::teardown;
use crate::workspace::{CleanupGuard, Workspace};

/// End-to-end deployment pipeline for one application.
///
/// Steps run strictly in order; the first failure aborts the run
/// with that step's error. The only recovery action is removing
/// the local scratch workspace, which happens on every exit path.
pub struct Pipeline {
    config: DeployConfig,
}

/// Local collaborators the pipeline shells out to.
const REQUIRED_TOOLS: [&str; 4] = ["git", "ssh", "rsync", "curl"];

#[derive(Parser)]
#[command(name = "ballista")]
#[command(about = "Deployment automation")]
struct Cli {
    /// Remove the deployed container, proxy site, and remote
    /// application directory instead of deploying.
    #[arg(long)]
    cleanup: bool,

    /// Print the rendered proxy site and action plan without
    /// executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl Pipeline {
    #[must_use]
    pub const fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Parse CLI flags and run the deploy or teardown path.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; the caller propagates it
    /// as a non-zero exit code.
    pub fn run(&self) -> DeployResult<()> {
        let cli = Cli::parse();

        if cli.dry_run {
            self.dry_run();
            return Ok(());
        }

        let log_path = logging::init(&self.config.app_name)?;
        info!("run log: {}", log_path.display());

        if cli.cleanup {
            self.teardown()
        } else {
            self.deploy()
        }
    }

    /// The deploy path. Credential and artifact checks run before
    /// any remote connection is attempted.
    pub fn deploy(&self) -> DeployResult<()> {
        self.config.validate()?;
        check_prerequisites()?;

        let workspace = Workspace::create(&self.config.app_name)?;
        let _cleanup = CleanupGuard::new(&workspace);

        source::fetch(&self.config, &workspace)?;

        let strategy = artifact::detect(&workspace.repo_dir())?;
        info!("build strategy: {strategy}");

        let ssh = self.ssh();
        ssh.check_connectivity()?;
        provision::ensure_host(&ssh, &self.config)?;
        sync::mirror(&ssh, &self.config, &workspace)?;

        let deployer = deploy::for_strategy(&strategy);
        deploy::run(deployer.as_ref(), &ssh, &self.config)?;

        nginx::configure(&ssh, &self.config)?;
        probe::run_probes(&ssh, &self.config);

        info!(
            "deployment complete: http://{}/",
            self.config
                .domain
                .as_deref()
                .unwrap_or(&self.config.ssh_host)
        );
        Ok(())
    }

    /// The `--cleanup` path: no workspace, no build strategy.
    pub fn teardown(&self) -> DeployResult<()> {
        self.config.validate()?;
        check_prerequisites()?;

        let ssh = self.ssh();
        ssh.check_connectivity()?;
        teardown::run(&ssh, &self.config)
    }

    fn dry_run(&self) {
        eprintln!("=== Dry run: no changes will be made ===");
        eprintln!();

        eprintln!("--- nginx site ---");
        println!("{}", nginx::render_site(&self.config));

        eprintln!("--- Actions that would be performed ---");
        eprintln!(
            "1. Fetch {} (branch '{}')",
            self.config.repo_url, self.config.branch
        );
        eprintln!(
            "2. Provision {}@{}",
            self.config.ssh_user, self.config.ssh_host
        );
        eprintln!("3. Sync the checkout to {}", self.config.remote_dir);
        eprintln!("4. Build and start containers");
        eprintln!("5. Enable the proxy site and reload nginx");
    }

    fn ssh(&self) -> SshSession {
        SshSession::new(
            &self.config.ssh_host,
            &self.config.ssh_user,
            &self.config.ssh_key,
        )
    }
}

/// Every tool the pipeline invokes must be on PATH before any
/// step runs.
fn check_prerequisites() -> DeployResult<()> {
    for tool in REQUIRED_TOOLS {
        if !cmd::command_exists(tool) {
            return Err(DeployError::CommandNotFound(tool.to_string()));
        }
    }
    Ok(())
}
