use std::process::ExitStatus;

pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("environment variable missing: {0}")]
    EnvMissing(String),

    #[error("no build artifact: {0}")]
    Artifact(String),

    #[error("host unreachable: {0}")]
    Connectivity(String),

    #[error("provisioning failed: {0}")]
    Provision(String),

    #[error("deploy failed: {0}")]
    Deploy(String),

    #[error("deployment validation failed: {0}")]
    Validation(String),

    #[error("command failed: {command}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
