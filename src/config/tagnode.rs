//! Per-node and per-instance default resolution
//!
//! Defaults for a node never include its nested collections: those are
//! stripped before the merge and resolved entry by entry against their own
//! schema path. Only entries the user declared are resolved; nothing is
//! synthesized from defaults alone.

use serde_json::Value;
use tracing::trace;

use super::merge::merge;
use super::schema::{NodeKind, NodeShape};
use super::{as_tree, ConfigTree, DefaultsProvider, TagCollection};

/// Resolve every declared instance of the tag collection at `path`.
///
/// Instance defaults are fetched once and shared by all members.
pub fn resolve_tag_collection(
    path: &[&str],
    raw_collection: &TagCollection,
    nested: &[NodeShape],
    provider: &dyn DefaultsProvider,
) -> TagCollection {
    let instance_defaults = stripped_defaults(path, nested, provider);

    raw_collection
        .iter()
        .map(|(name, raw_instance)| {
            trace!(path = %path.join(" "), instance = %name, "resolving tag instance");
            let resolved = match as_tree(raw_instance) {
                Some(instance) => Value::Object(resolve_with(
                    path,
                    &instance,
                    &instance_defaults,
                    nested,
                    provider,
                )),
                // Malformed instance; keep the user's value
                None => raw_instance.clone(),
            };
            (name.clone(), resolved)
        })
        .collect()
}

/// Resolve a single (non-tag) node such as `console`.
pub fn resolve_node(
    path: &[&str],
    raw: &ConfigTree,
    nested: &[NodeShape],
    provider: &dyn DefaultsProvider,
) -> ConfigTree {
    let node_defaults = stripped_defaults(path, nested, provider);
    resolve_with(path, raw, &node_defaults, nested, provider)
}

fn stripped_defaults(
    path: &[&str],
    nested: &[NodeShape],
    provider: &dyn DefaultsProvider,
) -> ConfigTree {
    let mut defaults = provider.defaults(path);
    for shape in nested {
        defaults.remove(shape.key);
    }
    defaults
}

fn resolve_with(
    path: &[&str],
    raw: &ConfigTree,
    node_defaults: &ConfigTree,
    nested: &[NodeShape],
    provider: &dyn DefaultsProvider,
) -> ConfigTree {
    let mut merged = merge(node_defaults, raw);

    for shape in nested {
        let Some(child) = raw.get(shape.key).and_then(as_tree) else {
            continue;
        };

        let child_path: Vec<&str> = path.iter().copied().chain([shape.key]).collect();
        let resolved = match shape.kind {
            NodeKind::Tagged => resolve_tag_collection(&child_path, &child, shape.nested, provider),
            NodeKind::Single => resolve_node(&child_path, &child, shape.nested, provider),
        };
        merged.insert(shape.key.to_string(), Value::Object(resolved));
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FACILITY;
    use crate::config::SchemaDefaults;
    use serde_json::json;
    use std::cell::RefCell;

    const HOST: &[&str] = &["system", "syslog", "host"];

    fn tree(value: Value) -> ConfigTree {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn schema() -> SchemaDefaults {
        SchemaDefaults::new(json!({
            "system": {"syslog": {
                "host": {
                    "port": 514,
                    "facility": {"protocol": "udp", "level": "all"}
                },
                "console": {
                    "speed": 9600,
                    "facility": {"level": "err"}
                }
            }}
        }))
    }

    /// Records which paths were asked for
    struct CountingDefaults {
        inner: SchemaDefaults,
        lookups: RefCell<Vec<String>>,
    }

    impl DefaultsProvider for CountingDefaults {
        fn defaults(&self, path: &[&str]) -> ConfigTree {
            self.lookups.borrow_mut().push(path.join(" "));
            self.inner.defaults(path)
        }
    }

    #[test]
    fn test_instance_and_facility_defaults() {
        let raw = tree(json!({"example": {"facility": {"kern": {}}}}));

        let resolved = resolve_tag_collection(HOST, &raw, &[FACILITY], &schema());

        assert_eq!(resolved["example"]["port"], 514);
        assert_eq!(resolved["example"]["facility"]["kern"]["protocol"], "udp");
        assert_eq!(resolved["example"]["facility"]["kern"]["level"], "all");
    }

    #[test]
    fn test_facility_defaults_not_merged_flat() {
        let raw = tree(json!({"example": {"facility": {"kern": {"level": "debug"}}}}));

        let resolved = resolve_tag_collection(HOST, &raw, &[FACILITY], &schema());
        let facility = resolved["example"]["facility"].as_object().unwrap();

        assert_eq!(facility.len(), 1);
        assert!(!facility.contains_key("protocol"));
        assert_eq!(facility["kern"]["level"], "debug");
        assert_eq!(facility["kern"]["protocol"], "udp");
    }

    #[test]
    fn test_no_facility_means_no_facilities() {
        let raw = tree(json!({"example": {"port": 10514}}));

        let resolved = resolve_tag_collection(HOST, &raw, &[FACILITY], &schema());

        assert_eq!(resolved["example"], json!({"port": 10514}));
    }

    #[test]
    fn test_only_declared_instances() {
        let raw = tree(json!({"a": {}, "b": null}));

        let resolved = resolve_tag_collection(HOST, &raw, &[FACILITY], &schema());

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["a"], json!({"port": 514}));
        assert_eq!(resolved["b"], json!({"port": 514}));

        let empty = resolve_tag_collection(HOST, &ConfigTree::new(), &[FACILITY], &schema());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_user_values_win() {
        let raw = tree(json!({"a": {"port": 6514, "facility": {"all": {"protocol": "tcp"}}}}));

        let resolved = resolve_tag_collection(HOST, &raw, &[FACILITY], &schema());

        assert_eq!(resolved["a"]["port"], 6514);
        assert_eq!(resolved["a"]["facility"]["all"]["protocol"], "tcp");
    }

    #[test]
    fn test_single_node() {
        let path = ["system", "syslog", "console"];
        let raw = tree(json!({"facility": {"auth": {}}}));

        let resolved = resolve_node(&path, &raw, &[FACILITY], &schema());

        assert_eq!(resolved["speed"], 9600);
        assert_eq!(resolved["facility"], json!({"auth": {"level": "err"}}));
    }

    #[test]
    fn test_missing_defaults_are_empty() {
        let path = ["system", "syslog", "user"];
        let raw = tree(json!({"admin": {"facility": {"emerg": {}}}}));

        let resolved = resolve_tag_collection(&path, &raw, &[FACILITY], &schema());

        assert_eq!(resolved["admin"], json!({"facility": {"emerg": {}}}));
    }

    #[test]
    fn test_instance_defaults_fetched_once() {
        let provider = CountingDefaults {
            inner: schema(),
            lookups: RefCell::new(Vec::new()),
        };
        let raw = tree(json!({"a": {}, "b": {}, "c": {}}));

        resolve_tag_collection(HOST, &raw, &[FACILITY], &provider);

        assert_eq!(*provider.lookups.borrow(), vec!["system syslog host"]);
    }

    #[test]
    fn test_deeper_nesting_is_data_driven() {
        const RULE: NodeShape = NodeShape::tagged("rule", &[]);
        const WITH_RULE: &[NodeShape] = &[RULE];
        let nested = [NodeShape::tagged("facility", WITH_RULE)];

        let schema = SchemaDefaults::new(json!({
            "x": {
                "facility": {"level": "all", "rule": {"action": "accept"}}
            }
        }));
        let raw = tree(json!({"i": {"facility": {"kern": {"rule": {"10": {}}}}}}));

        let resolved = resolve_tag_collection(&["x"], &raw, &nested, &schema);

        let kern = &resolved["i"]["facility"]["kern"];
        assert_eq!(kern["level"], "all");
        assert_eq!(kern["rule"]["10"]["action"], "accept");
    }
}
