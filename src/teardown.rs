use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::nginx;
use crate::ssh::SshSession;

/// Remote script removing the container or stack, the proxy
/// site, and the application directory.
///
/// The build strategy is unknown here (there may be no checkout
/// left), so both stop sequences run; each tolerates absence.
/// The proxy config is re-validated and reloaded after the site
/// files are gone.
#[must_use]
pub fn teardown_script(config: &DeployConfig) -> String {
    let name = cmd::sh_quote(&config.app_name);
    let dir = cmd::sh_quote(&config.remote_dir);
    format!(
        "\
docker rm -f {name} 2>/dev/null || true
if [ -d {dir} ]; then
    (cd {dir} && docker compose down --remove-orphans) 2>/dev/null || true
fi
rm -f {enabled} {available}
nginx -t
systemctl reload nginx
rm -rf {dir}",
        enabled = nginx::enabled_path(&config.app_name),
        available = nginx::site_path(&config.app_name),
    )
}

/// The `--cleanup` path: remove everything a deploy created on
/// the target host, leaving the proxy daemon running.
pub fn run(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("tearing down {} on {}", config.app_name, ssh.destination());

    ssh.exec_script_sudo(&teardown_script(config))
        .map_err(|e| DeployError::Deploy(format!("teardown: {e}")))?;

    info!("teardown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig::new("web", "https://example.com/web.git", "203.0.113.4")
    }

    #[test]
    fn removes_container_site_and_directory() {
        let script = teardown_script(&config());

        assert!(script.contains("docker rm -f 'web'"));
        assert!(script.contains("docker compose down --remove-orphans"));
        assert!(script.contains("rm -f /etc/nginx/sites-enabled/web /etc/nginx/sites-available/web"));
        assert!(script.contains("rm -rf '/opt/web'"));
    }

    #[test]
    fn container_removal_tolerates_absence() {
        let script = teardown_script(&config());

        for line in script.lines().filter(|l| l.contains("docker")) {
            assert!(line.ends_with("|| true"), "not idempotent: {line}");
        }
    }

    #[test]
    fn proxy_reload_is_validated_after_site_removal() {
        let script = teardown_script(&config());

        let remove = script.find("rm -f /etc/nginx/sites-enabled/web").unwrap();
        let check = script.find("nginx -t").unwrap();
        let reload = script.find("systemctl reload nginx").unwrap();
        assert!(remove < check);
        assert!(check < reload);
    }
}
