use tracing::{info, warn};

use crate::cmd;
use crate::config::DeployConfig;
use crate::ssh::SshSession;

/// HTTP statuses accepted as a live endpoint. Redirects count:
/// the app may immediately bounce to a canonical URL.
const ACCEPTED: [u16; 3] = [200, 301, 302];

/// Classify a curl `%{http_code}` capture.
#[must_use]
pub fn is_reachable(raw: &str) -> bool {
    raw.trim()
        .parse::<u16>()
        .is_ok_and(|code| ACCEPTED.contains(&code))
}

/// curl invocation that prints only the status code.
#[must_use]
pub fn curl_command(url: &str) -> String {
    format!(
        "curl -s -o /dev/null -w '%{{http_code}}' --max-time 10 {}",
        cmd::sh_quote(url)
    )
}

/// Probe the deployment from inside and outside: the loopback
/// port from the host itself, then the proxy by address and by
/// domain from the driving machine.
///
/// By this point the containers have already been verified, so
/// probe failures (DNS lag, firewalls) are warnings, never fatal.
pub fn run_probes(ssh: &SshSession, config: &DeployConfig) {
    let loopback = format!("http://127.0.0.1:{}/", config.app_port);
    match ssh.exec(&curl_command(&loopback)) {
        Ok(code) if is_reachable(&code) => info!("loopback probe ok ({})", code.trim()),
        Ok(code) => warn!("loopback probe returned {}", code.trim()),
        Err(e) => warn!("loopback probe failed: {e}"),
    }

    let mut targets = vec![config.ssh_host.clone()];
    if let Some(domain) = &config.domain {
        targets.push(domain.clone());
    }

    for target in targets {
        let url = format!("http://{target}/");
        let result = cmd::run(
            "curl",
            &[
                "-s",
                "-o",
                "/dev/null",
                "-w",
                "%{http_code}",
                "--max-time",
                "10",
                &url,
            ],
        );
        match result {
            Ok(code) if is_reachable(&code) => info!("{url} ok ({})", code.trim()),
            Ok(code) => warn!("{url} returned {}", code.trim()),
            Err(e) => warn!("{url} unreachable: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ok_and_redirects() {
        assert!(is_reachable("200"));
        assert!(is_reachable("301"));
        assert!(is_reachable("302\n"));
    }

    #[test]
    fn rejects_errors_and_garbage() {
        assert!(!is_reachable("404"));
        assert!(!is_reachable("500"));
        assert!(!is_reachable("000"));
        assert!(!is_reachable(""));
        assert!(!is_reachable("curl: (7) Failed to connect"));
    }

    #[test]
    fn curl_prints_status_only() {
        let command = curl_command("http://127.0.0.1:3000/");

        assert!(command.contains("-w '%{http_code}'"));
        assert!(command.contains("--max-time 10"));
        assert!(command.ends_with("'http://127.0.0.1:3000/'"));
    }
}
