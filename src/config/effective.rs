//! Effective configuration
//!
//! The fully resolved `system syslog` tree plus the restart marker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConfigTree;

/// Resolved configuration handed to the lifecycle stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// The merged configuration object
    #[serde(flatten)]
    pub config: ConfigTree,

    /// A watched binding changed; a reload is not enough
    #[serde(default, skip_serializing_if = "is_false")]
    pub restart_required: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl EffectiveConfig {
    pub fn new(config: ConfigTree) -> Self {
        Self {
            config,
            restart_required: false,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.config.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as u64
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Whether a (possibly valueless) node is present
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Named instances of a tag collection, empty if undeclared
    pub fn instances(&self, path: &str) -> Vec<(&str, &Value)> {
        match self.get(path) {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => Vec::new(),
        }
    }

    /// VRF names the daemon is bound to
    pub fn vrfs(&self) -> Vec<&str> {
        match self.get("vrf") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> EffectiveConfig {
        let Value::Object(map) = json!({
            "vrf": "mgmt",
            "host": {"example": {"port": 514}},
            "global": {"preserve_fqdn": {}}
        }) else {
            unreachable!()
        };
        EffectiveConfig::new(map)
    }

    #[test]
    fn test_get_by_path() {
        let config = sample();
        assert_eq!(config.get_u64("host.example.port"), Some(514));
        assert_eq!(config.get_str("vrf"), Some("mgmt"));
        assert!(config.has("global.preserve_fqdn"));
        assert!(!config.has("global.marker"));
        assert!(config.get("").is_none());
    }

    #[test]
    fn test_instances() {
        let config = sample();
        let hosts = config.instances("host");
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].0, "example");
        assert!(config.instances("file").is_empty());
    }

    #[test]
    fn test_vrfs() {
        assert_eq!(sample().vrfs(), vec!["mgmt"]);

        let Value::Object(map) = json!({"vrf": ["red", "blue"]}) else {
            unreachable!()
        };
        assert_eq!(EffectiveConfig::new(map).vrfs(), vec!["red", "blue"]);
        assert!(EffectiveConfig::new(ConfigTree::new()).vrfs().is_empty());
    }

    #[test]
    fn test_restart_marker_serialization() {
        let mut config = sample();
        let json: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert!(json.get("restart_required").is_none());
        assert_eq!(json["vrf"], "mgmt");

        config.restart_required = true;
        let json: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["restart_required"], true);

        let back: EffectiveConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
