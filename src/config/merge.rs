//! Default/user tree merge
//!
//! Implements the merge used everywhere defaults meet user input:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (user wins)
//! - Scalars: override (user wins)
//! - Shape mismatch: user's shape wins

use serde_json::Value;

use super::ConfigTree;

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (overlay wins entirely)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }

        // Arrays: REPLACE (no concatenation)
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

fn merge_maps(mut base_map: ConfigTree, overlay_map: ConfigTree) -> ConfigTree {
    for (key, overlay_value) in overlay_map {
        let merged = if let Some(base_value) = base_map.remove(&key) {
            deep_merge(base_value, overlay_value)
        } else {
            overlay_value
        };
        base_map.insert(key, merged);
    }
    base_map
}

/// Merge a defaults tree with a user tree, returning a new tree.
///
/// Neither input is touched. Keys only present in `defaults` are copied in,
/// and every value the user supplied survives unchanged.
pub fn merge(defaults: &ConfigTree, user: &ConfigTree) -> ConfigTree {
    merge_maps(defaults.clone(), user.clone())
}
