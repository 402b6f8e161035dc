//! Static shape of the syslog configuration tree
//!
//! Everything the resolver needs to know about where tag collections live
//! is declared here as data. Adding a nested collection means adding a
//! `NodeShape`, not a new code path.

/// Root of the syslog subtree
pub const BASE_PATH: &[&str] = &["system", "syslog"];

/// VRF binding of the daemon
pub const VRF_PATH: &[&str] = &["system", "syslog", "vrf"];

/// Paths whose change between commits forces a full service restart
pub const WATCHED_PATHS: &[&[&str]] = &[VRF_PATH];

/// How a specialized node is resolved against its defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A single subtree (e.g. `console`)
    Single,
    /// A collection of user-named instances (e.g. `host`)
    Tagged,
}

/// A node that is excluded from the generic merge and resolved on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeShape {
    /// Node name (already mangled)
    pub key: &'static str,
    pub kind: NodeKind,
    /// Specialized nodes living inside this one
    pub nested: &'static [NodeShape],
}

impl NodeShape {
    pub const fn single(key: &'static str, nested: &'static [NodeShape]) -> Self {
        Self {
            key,
            kind: NodeKind::Single,
            nested,
        }
    }

    pub const fn tagged(key: &'static str, nested: &'static [NodeShape]) -> Self {
        Self {
            key,
            kind: NodeKind::Tagged,
            nested,
        }
    }
}

/// Per-destination facility list
pub const FACILITY: NodeShape = NodeShape::tagged("facility", &[]);

const WITH_FACILITY: &[NodeShape] = &[FACILITY];

/// Children of `system syslog` that need their own default resolution
pub const SPECIALIZED_ENTITIES: &[NodeShape] = &[
    NodeShape::single("console", WITH_FACILITY),
    NodeShape::single("global", WITH_FACILITY),
    NodeShape::tagged("host", WITH_FACILITY),
    NodeShape::tagged("user", WITH_FACILITY),
    NodeShape::tagged("file", WITH_FACILITY),
];

/// Look up a shape by key
pub fn find_shape<'a>(shapes: &'a [NodeShape], key: &str) -> Option<&'a NodeShape> {
    shapes.iter().find(|shape| shape.key == key)
}
