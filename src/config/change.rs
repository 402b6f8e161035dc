//! Change detection between committed and staged configuration

use serde_json::Value;

use super::subtree;

/// Answers whether a subtree differs between the last commit and now
pub trait ChangeDetector {
    fn has_changed(&self, path: &[&str]) -> bool;
}

/// Compares two snapshots of the full configuration tree.
///
/// A node that was added, removed or modified counts as changed.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotDiff<'a> {
    committed: &'a Value,
    staged: &'a Value,
}

impl<'a> SnapshotDiff<'a> {
    pub fn new(committed: &'a Value, staged: &'a Value) -> Self {
        Self { committed, staged }
    }
}

impl ChangeDetector for SnapshotDiff<'_> {
    fn has_changed(&self, path: &[&str]) -> bool {
        subtree(self.committed, path) != subtree(self.staged, path)
    }
}
