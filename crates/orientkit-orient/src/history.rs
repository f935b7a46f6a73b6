//! Undo/Redo history for transform changes
//!
//! Each entry is one committed [`TransformBatch`](crate::batch::TransformBatch):
//! undoing it restores every node it touched, in reverse order, as a single
//! step.

use nalgebra::Matrix4;
use orientkit_core::NodeRef;
use tracing::debug;

/// One node's transform before and after a change
#[derive(Debug, Clone)]
pub struct TransformChange {
    pub node: NodeRef,
    pub before: Matrix4<f64>,
    pub after: Matrix4<f64>,
}

/// A committed group of transform changes
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    label: String,
    changes: Vec<TransformChange>,
}

impl HistoryEntry {
    pub fn new(label: impl Into<String>, changes: Vec<TransformChange>) -> Self {
        Self {
            label: label.into(),
            changes,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn changes(&self) -> &[TransformChange] {
        &self.changes
    }

    fn apply(&self) {
        for change in &self.changes {
            change.node.set_local_transform(change.after);
        }
    }

    fn revert(&self) {
        for change in self.changes.iter().rev() {
            change.node.set_local_transform(change.before);
        }
    }
}

/// Bounded undo/redo stacks
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl UndoHistory {
    /// Create a history with default depth (100)
    pub fn new() -> Self {
        Self::with_depth(100)
    }

    /// Create with custom maximum undo depth
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record an already-applied entry
    pub fn push(&mut self, entry: HistoryEntry) {
        debug!("History push: {} ({} changes)", entry.label, entry.changes.len());
        self.redo_stack.clear();
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Revert the last entry, returning its label
    pub fn undo(&mut self) -> Option<String> {
        let entry = self.undo_stack.pop()?;
        entry.revert();
        let label = entry.label.clone();
        self.redo_stack.push(entry);
        Some(label)
    }

    /// Re-apply the last undone entry, returning its label
    pub fn redo(&mut self) -> Option<String> {
        let entry = self.redo_stack.pop()?;
        entry.apply();
        let label = entry.label.clone();
        self.undo_stack.push(entry);
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, Vector3};
    use orientkit_core::{MeshNode, NodeHandle};

    fn moved(node: &NodeRef, x: f64) -> TransformChange {
        let before = node.local_transform();
        let after = Translation3::new(x, 0.0, 0.0).to_homogeneous();
        node.set_local_transform(after);
        TransformChange {
            node: node.clone(),
            before,
            after,
        }
    }

    #[test]
    fn test_undo_redo_cycle() {
        let node = MeshNode::cuboid("a", Vector3::repeat(1.0)).into_ref();
        let mut history = UndoHistory::new();
        history.push(HistoryEntry::new("move", vec![moved(&node, 5.0)]));

        assert_eq!(history.undo().as_deref(), Some("move"));
        assert_eq!(node.local_transform(), Matrix4::identity());
        assert!(history.can_redo());

        assert_eq!(history.redo().as_deref(), Some("move"));
        assert_eq!(node.local_transform()[(0, 3)], 5.0);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_revert_runs_in_reverse_order() {
        let node = MeshNode::cuboid("a", Vector3::repeat(1.0)).into_ref();
        let first = moved(&node, 1.0);
        let second = moved(&node, 2.0);
        let mut history = UndoHistory::new();
        history.push(HistoryEntry::new("twice", vec![first, second]));

        history.undo();
        assert_eq!(node.local_transform(), Matrix4::identity());
    }

    #[test]
    fn test_push_clears_redo_and_respects_depth() {
        let node = MeshNode::cuboid("a", Vector3::repeat(1.0)).into_ref();
        let mut history = UndoHistory::with_depth(2);
        for x in 1..=3 {
            history.push(HistoryEntry::new(format!("m{}", x), vec![moved(&node, x as f64)]));
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.max_depth(), 2);

        history.undo();
        assert_eq!(history.redo_count(), 1);
        history.push(HistoryEntry::new("m4", vec![moved(&node, 4.0)]));
        assert_eq!(history.redo_count(), 0);

        history.clear();
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }
}
