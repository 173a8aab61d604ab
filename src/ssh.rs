use crate::cmd;
use crate::error::{DeployError, DeployResult};

/// SSH session for one remote host.
///
/// Every call shells out to the `ssh` client in batch mode with a
/// bounded connect timeout, so a dead host fails fast instead of
/// prompting for input.
pub struct SshSession {
    host: String,
    user: String,
    key: String,
}

impl SshSession {
    #[must_use]
    pub fn new(host: &str, user: &str, key_path: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            key: key_path.to_string(),
        }
    }

    /// `user@host` destination string.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Transport command for tools that tunnel over ssh (rsync
    /// `-e`), carrying the same key and timeout options.
    #[must_use]
    pub fn transport(&self) -> String {
        format!(
            "ssh -i {} -o BatchMode=yes -o StrictHostKeyChecking=accept-new -o ConnectTimeout=10",
            self.key
        )
    }

    /// Cheap reachability check: a no-op remote command under the
    /// bounded connect timeout. Any failure is a connectivity
    /// error.
    pub fn check_connectivity(&self) -> DeployResult<()> {
        self.exec("echo ok").map(drop).map_err(|_| {
            DeployError::Connectivity(format!("cannot reach {}", self.destination()))
        })
    }

    /// Execute a command on the remote host and capture output.
    pub fn exec(&self, command: &str) -> DeployResult<String> {
        let args = self.build_ssh_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run("ssh", &refs)
    }

    /// Execute a command on the remote host with output streamed
    /// to the console.
    pub fn exec_interactive(&self, command: &str) -> DeployResult<()> {
        let args = self.build_ssh_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_interactive("ssh", &refs)
    }

    /// Run a multi-line script under `bash -e` on the remote
    /// host: the first failing line aborts the remainder.
    pub fn exec_script(&self, script: &str) -> DeployResult<()> {
        self.exec_interactive(&format!("bash -ec {}", cmd::sh_quote(script)))
    }

    /// Same as [`Self::exec_script`], elevated with `sudo -n`
    /// when the session user is not root.
    pub fn exec_script_sudo(&self, script: &str) -> DeployResult<()> {
        if self.user == "root" {
            return self.exec_script(script);
        }
        self.exec_interactive(&format!("sudo -n bash -ec {}", cmd::sh_quote(script)))
    }

    /// Write content to a remote file via stdin pipe.
    pub fn write_remote_file(&self, content: &str, remote_path: &str) -> DeployResult<()> {
        let command = format!("cat > {}", cmd::sh_quote(remote_path));
        let args = self.build_ssh_args(&command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, content.as_bytes())?;
        Ok(())
    }

    /// Write a remote file that needs elevation (site configs
    /// under `/etc`). Routes through `sudo tee` for non-root
    /// users.
    pub fn write_remote_file_sudo(&self, content: &str, remote_path: &str) -> DeployResult<()> {
        if self.user == "root" {
            return self.write_remote_file(content, remote_path);
        }
        let command = format!("sudo -n tee {} >/dev/null", cmd::sh_quote(remote_path));
        let args = self.build_ssh_args(&command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, content.as_bytes())?;
        Ok(())
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.key.clone(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ];
        args.push(self.destination());
        args.push(command.to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_format() {
        let ssh = SshSession::new("203.0.113.5", "deploy", "/tmp/key");
        assert_eq!(ssh.destination(), "deploy@203.0.113.5");
    }

    #[test]
    fn transport_carries_key_and_timeout() {
        let ssh = SshSession::new("h", "root", "/tmp/key");
        let transport = ssh.transport();

        assert!(transport.starts_with("ssh -i /tmp/key"));
        assert!(transport.contains("BatchMode=yes"));
        assert!(transport.contains("ConnectTimeout=10"));
    }
}
