//! Cross-field checks on the effective configuration

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::config::EffectiveConfig;

/// VRF name that is always available
const DEFAULT_VRF: &str = "default";

/// A configuration the daemon cannot run with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConfigurationError {
    message: String,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Knows which VRFs exist on the system
pub trait VrfCatalog {
    fn exists(&self, name: &str) -> bool;
}

/// VRFs are network devices; look for them under `/sys/class/net`
#[derive(Debug, Clone)]
pub struct SysfsVrfCatalog {
    root: PathBuf,
}

impl SysfsVrfCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl VrfCatalog for SysfsVrfCatalog {
    fn exists(&self, name: &str) -> bool {
        !name.contains('/') && self.root.join(name).exists()
    }
}

/// Fixed set of VRF names
#[derive(Debug, Clone, Default)]
pub struct StaticVrfCatalog {
    names: BTreeSet<String>,
}

impl StaticVrfCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl VrfCatalog for StaticVrfCatalog {
    fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Check the configuration before anything is written.
pub fn verify(
    config: Option<&EffectiveConfig>,
    vrfs: &dyn VrfCatalog,
) -> Result<(), ConfigurationError> {
    let Some(config) = config else {
        return Ok(());
    };

    for vrf in config.vrfs() {
        if vrf == DEFAULT_VRF {
            continue;
        }
        if !vrfs.exists(vrf) {
            return Err(ConfigurationError::new(format!(
                "VRF \"{}\" does not exist",
                vrf
            )));
        }
        debug!(vrf, "VRF binding verified");
    }

    Ok(())
}
