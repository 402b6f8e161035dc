//! Node name mangling
//!
//! CLI node names use dashes (`preserve-fqdn`); the resolved tree uses
//! underscores so templates can address them. Instance names of tag
//! collections are user data and are never rewritten.

use serde_json::Value;
use tracing::warn;

use super::schema::{find_shape, NodeKind, NodeShape};
use super::ConfigTree;

/// Replace `-` with `_` in a single node name
pub fn mangle_key(key: &str) -> String {
    key.replace('-', "_")
}

/// Mangle every node name in `value`, leaving the instance names of the
/// collections described by `shapes` untouched.
pub fn mangle_keys(value: &Value, shapes: &[NodeShape]) -> Value {
    match value {
        Value::Object(map) => Value::Object(mangle_tree(map, shapes)),
        other => other.clone(),
    }
}

/// Tree form of [`mangle_keys`]
pub fn mangle_tree(map: &ConfigTree, shapes: &[NodeShape]) -> ConfigTree {
    let mut mangled = ConfigTree::new();
    for (raw_key, child) in map {
        let key = mangle_key(raw_key);
        let child = match find_shape(shapes, &key) {
            Some(shape) if shape.kind == NodeKind::Tagged => mangle_collection(child, shape),
            Some(shape) => mangle_keys(child, shape.nested),
            None => mangle_keys(child, &[]),
        };
        // `a-b` and `a_b` land on the same name; the later sibling wins
        if mangled.insert(key.clone(), child).is_some() {
            warn!(key = %raw_key, mangled = %key, "node name collides with a sibling after mangling");
        }
    }
    mangled
}

fn mangle_collection(collection: &Value, shape: &NodeShape) -> Value {
    match collection {
        Value::Object(instances) => Value::Object(
            instances
                .iter()
                .map(|(name, instance)| (name.clone(), mangle_keys(instance, shape.nested)))
                .collect(),
        ),
        other => other.clone(),
    }
}
