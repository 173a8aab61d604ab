use std::env;
use std::path::Path;

use tracing::info;

use crate::error::{DeployError, DeployResult};

/// Deployment target and application settings.
///
/// Built once at startup and immutable afterwards. The credential
/// token is deliberately not a field: it is read from the
/// configured environment variable when needed and never logged.
///
/// # Example
///
/// ```
/// use ballista::DeployConfig;
///
/// let config = DeployConfig::new(
///     "my-service",
///     "https://github.com/acme/my-service.git",
///     "203.0.113.10",
/// )
/// .branch("release")
/// .ssh_user("deploy")
/// .app_port(8080)
/// .domain("my-service.example.com");
///
/// assert_eq!(config.app_name, "my-service");
/// assert_eq!(config.remote_dir, "/opt/my-service");
/// ```
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub app_name: String,
    pub repo_url: String,
    pub branch: String,
    pub token_var: String,
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_key: String,
    pub app_port: u16,
    pub domain: Option<String>,
    pub remote_dir: String,
}

impl DeployConfig {
    #[must_use]
    pub fn new(app_name: &str, repo_url: &str, ssh_host: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            repo_url: repo_url.to_string(),
            branch: "main".to_string(),
            token_var: "DEPLOY_TOKEN".to_string(),
            ssh_host: ssh_host.to_string(),
            ssh_user: "root".to_string(),
            ssh_key: default_key_path(),
            app_port: 3000,
            domain: None,
            remote_dir: format!("/opt/{app_name}"),
        }
    }

    #[must_use]
    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    /// Name of the environment variable holding the repository
    /// credential (default: `DEPLOY_TOKEN`).
    #[must_use]
    pub fn token_var(mut self, var: &str) -> Self {
        self.token_var = var.to_string();
        self
    }

    #[must_use]
    pub fn ssh_user(mut self, user: &str) -> Self {
        self.ssh_user = user.to_string();
        self
    }

    #[must_use]
    pub fn ssh_key(mut self, key_path: &str) -> Self {
        self.ssh_key = key_path.to_string();
        self
    }

    #[must_use]
    pub const fn app_port(mut self, port: u16) -> Self {
        self.app_port = port;
        self
    }

    /// Public domain served by the reverse proxy, in addition to
    /// the host address.
    #[must_use]
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    #[must_use]
    pub fn remote_dir(mut self, dir: &str) -> Self {
        self.remote_dir = dir.to_string();
        self
    }

    /// Resolve the credential token from the environment. Empty
    /// values count as missing.
    pub fn token(&self) -> DeployResult<String> {
        match env::var(&self.token_var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(DeployError::EnvMissing(self.token_var.clone())),
        }
    }

    /// Names the reverse proxy answers for: the domain when
    /// configured, always the host address.
    #[must_use]
    pub fn server_names(&self) -> Vec<&str> {
        self.domain.as_ref().map_or_else(
            || vec![self.ssh_host.as_str()],
            |d| vec![d.as_str(), self.ssh_host.as_str()],
        )
    }

    /// Verify credential and key material before anything else
    /// runs.
    ///
    /// The token must be present and non-empty, and the SSH key
    /// must exist. Key modes other than 600/400 are rewritten to
    /// 600.
    pub fn validate(&self) -> DeployResult<()> {
        self.token()?;

        let key = Path::new(&self.ssh_key);
        if !key.exists() {
            return Err(DeployError::Config(format!(
                "SSH key not found: {}",
                self.ssh_key
            )));
        }
        enforce_key_mode(key)?;

        info!("configuration ok for '{}'", self.app_name);
        Ok(())
    }
}

/// Rewrite the key file to mode 600 unless it is already 600 or
/// 400. Private keys with group/other bits set are rejected by
/// the ssh client itself, so this runs before any connection.
#[cfg(unix)]
pub fn enforce_key_mode(key: &Path) -> DeployResult<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(key)?.permissions().mode() & 0o777;
    if mode == 0o600 || mode == 0o400 {
        return Ok(());
    }

    tracing::warn!("SSH key mode {mode:o} is too open, rewriting to 600");
    fs::set_permissions(key, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn enforce_key_mode(_key: &Path) -> DeployResult<()> {
    Ok(())
}

fn default_key_path() -> String {
    env::var("HOME").map_or_else(
        |_| "~/.ssh/id_ed25519".to_string(),
        |home| format!("{home}/.ssh/id_ed25519"),
    )
}
