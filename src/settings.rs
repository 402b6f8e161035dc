//! Runtime settings
//!
//! Where artifacts are written and which units are controlled. Loaded from
//! an optional TOML file; every field has a built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Artifact locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Daemon configuration
    pub daemon_config: PathBuf,

    /// Supervisor override fragment for the service unit
    pub supervisor_override: PathBuf,

    /// Log rotation policy
    pub logrotate: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            daemon_config: PathBuf::from("/etc/rsyslog.d/00-syslog-conf.conf"),
            supervisor_override: PathBuf::from(
                "/run/systemd/system/rsyslog.service.d/override.conf",
            ),
            logrotate: PathBuf::from("/etc/logrotate.d/syslog-conf"),
        }
    }
}

/// Service manager unit names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitNames {
    pub service: String,
    pub socket: String,
}

impl Default for UnitNames {
    fn default() -> Self {
        Self {
            service: "syslog.service".to_string(),
            socket: "syslog.socket".to_string(),
        }
    }
}

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub artifacts: ArtifactPaths,

    pub units: UnitNames,

    /// Directory listing network interfaces, VRFs included
    pub interface_root: PathBuf,

    /// Directory for per-file logs (`file <name>`)
    pub user_log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            units: UnitNames::default(),
            interface_root: PathBuf::from("/sys/class/net"),
            user_log_dir: PathBuf::from("/var/log/user"),
        }
    }
}

impl Settings {
    /// Load and parse settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
