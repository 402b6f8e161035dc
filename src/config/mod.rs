//! Configuration resolution
//!
//! Turns the raw `system syslog` subtree into an effective configuration:
//! 1. Generic merge of top-level defaults
//! 2. Per-node defaults for `console` and `global`
//! 3. Per-instance defaults for the `host`, `user` and `file` collections
//! 4. Restart detection on the VRF binding

mod change;
mod defaults;
mod effective;
mod keys;
mod merge;
mod resolver;
pub mod schema;
mod tagnode;

use serde_json::Value;

pub use change::{ChangeDetector, SnapshotDiff};
pub use defaults::{BuiltinDefaults, DefaultsProvider, SchemaDefaults};
pub use effective::EffectiveConfig;
pub use keys::{mangle_key, mangle_keys, mangle_tree};
pub use merge::{deep_merge, merge};
pub use resolver::ConfigResolver;
pub use tagnode::{resolve_node, resolve_tag_collection};

/// Ordered string-keyed tree used for raw input, defaults and output alike
pub type ConfigTree = serde_json::Map<String, Value>;

/// Named instances of a tag node
pub type TagCollection = ConfigTree;

/// Walk `path` from `root`, returning the node if every step exists
pub fn subtree<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(key))
}

/// Borrow a value as a tree; valueless nodes (`null`) read as empty
pub(crate) fn as_tree(value: &Value) -> Option<ConfigTree> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Null => Some(ConfigTree::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subtree_walk() {
        let root = json!({"system": {"syslog": {"vrf": "mgmt"}}});
        assert_eq!(subtree(&root, &["system", "syslog", "vrf"]), Some(&json!("mgmt")));
        assert_eq!(subtree(&root, &[]), Some(&root));
        assert!(subtree(&root, &["system", "ntp"]).is_none());
        assert!(subtree(&root, &["system", "syslog", "vrf", "x"]).is_none());
    }

    #[test]
    fn test_as_tree() {
        assert_eq!(as_tree(&Value::Null), Some(ConfigTree::new()));
        assert_eq!(as_tree(&json!({"a": 1})).map(|t| t.len()), Some(1));
        assert!(as_tree(&json!("scalar")).is_none());
    }
}
