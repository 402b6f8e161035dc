//! Resolution of the raw configuration into an `EffectiveConfig`

use serde_json::Value;
use tracing::{debug, info};

use super::keys::mangle_tree;
use super::merge::merge;
use super::schema::{NodeKind, BASE_PATH, SPECIALIZED_ENTITIES, WATCHED_PATHS};
use super::tagnode::{resolve_node, resolve_tag_collection};
use super::{as_tree, subtree, ChangeDetector, DefaultsProvider, EffectiveConfig};

/// Builds the effective configuration from raw input.
///
/// Resolution has two outcomes: `None` when `system syslog` is not
/// configured (feature disabled), otherwise the fully resolved tree.
pub struct ConfigResolver<'a> {
    defaults: &'a dyn DefaultsProvider,
    changes: &'a dyn ChangeDetector,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(defaults: &'a dyn DefaultsProvider, changes: &'a dyn ChangeDetector) -> Self {
        Self { defaults, changes }
    }

    /// Resolve the configuration rooted at `root`
    pub fn resolve(&self, root: &Value) -> Option<EffectiveConfig> {
        let Some(raw) = subtree(root, BASE_PATH).and_then(as_tree) else {
            info!(path = %BASE_PATH.join(" "), "not configured");
            return None;
        };

        let raw = mangle_tree(&raw, SPECIALIZED_ENTITIES);

        let mut top_defaults = self.defaults.defaults(BASE_PATH);
        for entity in SPECIALIZED_ENTITIES {
            top_defaults.remove(entity.key);
        }

        let mut config = merge(&top_defaults, &raw);

        for entity in SPECIALIZED_ENTITIES {
            let Some(node) = raw.get(entity.key).and_then(as_tree) else {
                continue;
            };

            let path: Vec<&str> = BASE_PATH.iter().copied().chain([entity.key]).collect();
            let resolved = match entity.kind {
                NodeKind::Tagged => {
                    resolve_tag_collection(&path, &node, entity.nested, self.defaults)
                }
                NodeKind::Single => resolve_node(&path, &node, entity.nested, self.defaults),
            };
            debug!(entity = entity.key, entries = resolved.len(), "resolved entity");
            config.insert(entity.key.to_string(), Value::Object(resolved));
        }

        let mut effective = EffectiveConfig::new(config);
        effective.restart_required = WATCHED_PATHS
            .iter()
            .any(|path| self.changes.has_changed(path));
        if effective.restart_required {
            info!("binding changed, restart required");
        }

        Some(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemaDefaults, SnapshotDiff};
    use serde_json::json;

    struct Fixed(bool);

    impl ChangeDetector for Fixed {
        fn has_changed(&self, _path: &[&str]) -> bool {
            self.0
        }
    }

    fn schema() -> SchemaDefaults {
        SchemaDefaults::new(json!({
            "system": {"syslog": {
                "global": {
                    "marker": {"interval": 1200},
                    "facility": {"level": "all"}
                },
                "console": {"facility": {"level": "err"}},
                "host": {"port": 514, "facility": {"protocol": "udp"}},
                "file": {"archive": {"file": 5}, "facility": {"level": "all"}},
                "user": {"facility": {"level": "all"}},
                "timestamp": {"format": "rfc3339"}
            }}
        }))
    }

    fn resolve(root: Value, changed: bool) -> Option<EffectiveConfig> {
        let schema = schema();
        let changes = Fixed(changed);
        ConfigResolver::new(&schema, &changes).resolve(&root)
    }

    #[test]
    fn test_absent_root_disables() {
        assert!(resolve(json!({}), false).is_none());
        assert!(resolve(json!({"system": {"ntp": {}}}), true).is_none());
    }

    #[test]
    fn test_empty_root_enables() {
        let config = resolve(json!({"system": {"syslog": {}}}), false).unwrap();

        assert_eq!(config.get_str("timestamp.format"), Some("rfc3339"));
        assert!(!config.has("global"));
        assert!(!config.has("host"));
        assert!(!config.has("console"));
    }

    #[test]
    fn test_host_scenario() {
        let root = json!({"system": {"syslog": {
            "host": {"example": {"facility": {"kern": {}}}}
        }}});

        let config = resolve(root, false).unwrap();

        assert_eq!(config.get_u64("host.example.port"), Some(514));
        assert_eq!(
            config.get_str("host.example.facility.kern.protocol"),
            Some("udp")
        );
        assert!(!config.has("file"));
        assert!(!config.has("user"));
    }

    #[test]
    fn test_single_entities() {
        let root = json!({"system": {"syslog": {
            "console": {"facility": {"all": {}}},
            "global": {"facility": {"local7": {"level": "debug"}}}
        }}});

        let config = resolve(root, false).unwrap();

        assert_eq!(config.get_str("console.facility.all.level"), Some("err"));
        assert_eq!(config.get_str("global.facility.local7.level"), Some("debug"));
        assert_eq!(config.get_u64("global.marker.interval"), Some(1200));
        assert!(!config.has("global.facility.level"));
    }

    #[test]
    fn test_keys_mangled_names_kept() {
        let root = json!({"system": {"syslog": {
            "global": {"preserve-fqdn": {}},
            "file": {"auth-log": {"facility": {"auth": {}}}}
        }}});

        let config = resolve(root, false).unwrap();

        assert!(config.has("global.preserve_fqdn"));
        assert_eq!(config.get_u64("file.auth-log.archive.file"), Some(5));
        assert_eq!(config.get_str("file.auth-log.facility.auth.level"), Some("all"));
    }

    #[test]
    fn test_restart_marker() {
        let root = json!({"system": {"syslog": {"vrf": "mgmt"}}});

        assert!(!resolve(root.clone(), false).unwrap().restart_required);
        assert!(resolve(root, true).unwrap().restart_required);
    }

    #[test]
    fn test_restart_from_snapshots() {
        let schema = schema();
        let committed = json!({"system": {"syslog": {"vrf": "mgmt"}}});
        let staged = json!({"system": {"syslog": {"vrf": "red"}}});

        let diff = SnapshotDiff::new(&committed, &staged);
        let config = ConfigResolver::new(&schema, &diff).resolve(&staged).unwrap();
        assert!(config.restart_required);

        let diff = SnapshotDiff::new(&staged, &staged);
        let config = ConfigResolver::new(&schema, &diff).resolve(&staged).unwrap();
        assert!(!config.restart_required);
    }

    #[test]
    fn test_resolution_is_pure() {
        let root = json!({"system": {"syslog": {
            "host": {"a": {"facility": {"kern": {}}}},
            "console": {}
        }}});
        let before = root.clone();

        let first = resolve(root.clone(), false);
        let second = resolve(root.clone(), false);

        assert_eq!(first, second);
        assert_eq!(root, before);
    }
}
