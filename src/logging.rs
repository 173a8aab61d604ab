use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{DeployError, DeployResult};

/// Initialize console and file logging for one pipeline run.
///
/// Lines go to stderr and are mirrored, without ANSI codes, to a
/// timestamped file under `$HOME/.ballista/logs`. The level
/// defaults to `info` and can be overridden with `RUST_LOG`.
///
/// Returns the path of the run log.
pub fn init(app_name: &str) -> DeployResult<PathBuf> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{app_name}-{stamp}.log"));
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| DeployError::Config(format!("logging already initialized: {e}")))?;

    Ok(path)
}

/// Fixed local directory holding run logs.
fn log_dir() -> DeployResult<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| DeployError::EnvMissing("HOME".into()))?;
    Ok(Path::new(&home).join(".ballista").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_under_home() {
        let dir = log_dir().unwrap();
        assert!(dir.ends_with(".ballista/logs"));
    }
}
