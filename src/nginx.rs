use tracing::info;

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Render the reverse-proxy site: the public names on port 80
/// forwarded to the loopback-bound application port, with the
/// upgrade headers websocket backends need.
#[must_use]
pub fn render_site(config: &DeployConfig) -> String {
    let names = config.server_names().join(" ");
    let port = config.app_port;
    format!(
        "server {{
    listen 80;
    server_name {names};

    location / {{
        proxy_pass http://127.0.0.1:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection \"upgrade\";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"
    )
}

#[must_use]
pub fn site_path(app_name: &str) -> String {
    format!("/etc/nginx/sites-available/{app_name}")
}

#[must_use]
pub fn enabled_path(app_name: &str) -> String {
    format!("/etc/nginx/sites-enabled/{app_name}")
}

/// One strict session: bucket-size patch, default-site removal,
/// symlink enable, syntax check, reload. Under `bash -e` a failed
/// `nginx -t` aborts before the reload, leaving the previous
/// configuration active.
#[must_use]
pub fn enable_script(app_name: &str) -> String {
    format!(
        "\
if ! grep -q server_names_hash_bucket_size /etc/nginx/nginx.conf; then
    sed -i 's/^http {{/http {{\\n    server_names_hash_bucket_size 64;/' /etc/nginx/nginx.conf
fi
rm -f /etc/nginx/sites-enabled/default
ln -sf {available} {enabled}
nginx -t
systemctl reload nginx",
        available = site_path(app_name),
        enabled = enabled_path(app_name)
    )
}

/// Write and enable the site, then reload the proxy. Reload, not
/// restart: established connections on other sites survive.
pub fn configure(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("configuring reverse proxy for {}", config.app_name);

    let site = render_site(config);
    ssh.write_remote_file_sudo(&site, &site_path(&config.app_name))?;

    ssh.exec_script_sudo(&enable_script(&config.app_name))
        .map_err(|e| DeployError::Deploy(format!("proxy configuration: {e}")))?;

    info!("proxy site enabled for {}", config.server_names().join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig::new("web", "https://example.com/web.git", "203.0.113.4")
            .app_port(3000)
            .domain("web.example.com")
    }

    #[test]
    fn site_forwards_to_loopback_port() {
        let site = render_site(&config());

        assert!(site.contains("listen 80;"));
        assert!(site.contains("server_name web.example.com 203.0.113.4;"));
        assert!(site.contains("proxy_pass http://127.0.0.1:3000;"));
    }

    #[test]
    fn site_carries_upgrade_and_forwarding_headers() {
        let site = render_site(&config());

        assert!(site.contains("proxy_set_header Upgrade $http_upgrade;"));
        assert!(site.contains("proxy_set_header Connection \"upgrade\";"));
        assert!(site.contains("proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;"));
        assert!(site.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
    }

    #[test]
    fn site_without_domain_serves_host_only() {
        let config = DeployConfig::new("web", "https://example.com/web.git", "203.0.113.4");
        let site = render_site(&config);

        assert!(site.contains("server_name 203.0.113.4;"));
    }

    #[test]
    fn enable_validates_before_reload() {
        let script = enable_script("web");

        let check = script.find("nginx -t").unwrap();
        let reload = script.find("systemctl reload nginx").unwrap();
        assert!(check < reload);
    }

    #[test]
    fn enable_disables_default_site() {
        let script = enable_script("web");

        assert!(script.contains("rm -f /etc/nginx/sites-enabled/default"));
        assert!(script.contains("ln -sf /etc/nginx/sites-available/web /etc/nginx/sites-enabled/web"));
    }

    #[test]
    fn bucket_size_patch_is_guarded() {
        let script = enable_script("web");

        assert!(script.contains("grep -q server_names_hash_bucket_size"));
        assert!(script.contains("server_names_hash_bucket_size 64;"));
    }
}
