//! Schema default values
//!
//! Defaults are looked up by schema path. Tag nodes carry their
//! instance-level defaults directly under the collection name, so
//! `defaults(["system", "syslog", "host"])` describes one host entry.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::mangle_keys;
use super::merge::deep_merge;
use super::{subtree, ConfigTree};
use crate::store::{load_tree, StoreError};

/// Source of default values for a schema path
pub trait DefaultsProvider {
    /// Default subtree for `path`; empty when the schema declares none
    fn defaults(&self, path: &[&str]) -> ConfigTree;
}

/// Built-in syslog defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Remote host port (default: 514)
    pub host_port: u16,

    /// Transport for a forwarded facility (default: "udp")
    pub host_facility_protocol: String,

    /// Severity for facilities without an explicit level (default: "all")
    pub facility_level: String,

    /// Severity for console facilities (default: "err")
    pub console_facility_level: String,

    /// Rotated files kept per log (default: 5)
    pub archive_file: u64,

    /// Rotation threshold in KiB (default: 256)
    pub archive_size: u64,

    /// Seconds between `-- MARK --` lines (default: 1200)
    pub marker_interval: u64,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            host_port: 514,
            host_facility_protocol: "udp".to_string(),
            facility_level: "all".to_string(),
            console_facility_level: "err".to_string(),
            archive_file: 5,
            archive_size: 256,
            marker_interval: 1200,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a schema defaults tree rooted at the configuration root
    pub fn to_value(&self) -> Value {
        let archive = serde_json::json!({
            "file": self.archive_file,
            "size": self.archive_size
        });

        serde_json::json!({
            "system": {
                "syslog": {
                    "console": {
                        "facility": {
                            "level": self.console_facility_level
                        }
                    },
                    "global": {
                        "archive": archive,
                        "marker": {
                            "interval": self.marker_interval
                        },
                        "facility": {
                            "level": self.facility_level
                        }
                    },
                    "host": {
                        "port": self.host_port,
                        "facility": {
                            "level": self.facility_level,
                            "protocol": self.host_facility_protocol
                        }
                    },
                    "user": {
                        "facility": {
                            "level": self.facility_level
                        }
                    },
                    "file": {
                        "archive": archive,
                        "facility": {
                            "level": self.facility_level
                        }
                    }
                }
            }
        })
    }
}

/// Defaults backed by an in-memory schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefaults {
    root: Value,
}

impl SchemaDefaults {
    pub fn new(root: Value) -> Self {
        Self {
            root: mangle_keys(&root, &[]),
        }
    }

    /// Built-in defaults only
    pub fn builtin() -> Self {
        Self::new(BuiltinDefaults::default().to_value())
    }

    /// Built-in defaults overridden by a JSON or TOML file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let overrides = load_tree(path)?;
        Ok(Self::new(deep_merge(
            BuiltinDefaults::default().to_value(),
            overrides,
        )))
    }
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DefaultsProvider for SchemaDefaults {
    fn defaults(&self, path: &[&str]) -> ConfigTree {
        match subtree(&self.root, path) {
            Some(Value::Object(map)) => map.clone(),
            _ => ConfigTree::new(),
        }
    }
}
