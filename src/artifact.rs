use std::fmt;
use std::fs;
use std::path::Path;

use docker_compose_types::{Compose, Service};
use indexmap::IndexMap;
use tracing::info;

use crate::error::{DeployError, DeployResult};

/// Compose file names recognized in the checkout root, in
/// precedence order.
const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// How the checkout gets built and run on the target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Multi-service stack driven by a compose file.
    Compose { file: String },
    /// Single image built from a bare Dockerfile.
    Dockerfile,
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compose { file } => write!(f, "compose ({file})"),
            Self::Dockerfile => write!(f, "dockerfile"),
        }
    }
}

/// Resolve the build strategy from file presence. A compose file
/// wins over a bare Dockerfile; the absence of both is a fatal
/// configuration error, caught before any remote work happens.
pub fn detect(dir: &Path) -> DeployResult<BuildStrategy> {
    for name in COMPOSE_FILES {
        let path = dir.join(name);
        if path.exists() {
            inspect_compose(&path)?;
            return Ok(BuildStrategy::Compose {
                file: name.to_string(),
            });
        }
    }

    if dir.join("Dockerfile").exists() {
        return Ok(BuildStrategy::Dockerfile);
    }

    Err(DeployError::Artifact(format!(
        "no compose file or Dockerfile in {}",
        dir.display()
    )))
}

/// Parse the compose file and reject one that declares no
/// services. A malformed stack definition should fail here, not
/// on the target host.
fn inspect_compose(path: &Path) -> DeployResult<()> {
    let raw = fs::read_to_string(path)?;
    let compose: Compose = serde_yaml::from_str(&raw)?;

    let services = declared_services(&compose);
    if services.is_empty() {
        return Err(DeployError::Artifact(format!(
            "{} declares no services",
            path.display()
        )));
    }

    let names: Vec<&String> = services.keys().collect();
    info!("compose services: {names:?}");
    Ok(())
}

const fn declared_services(compose: &Compose) -> &IndexMap<String, Option<Service>> {
    &compose.services.0
}
