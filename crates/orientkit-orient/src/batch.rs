//! Atomic transform batches
//!
//! A [`TransformBatch`] collects target transforms without touching the
//! scene. [`TransformBatch::commit`] applies them all and records a single
//! undo entry. A batch that is dropped uncommitted changes nothing.

use crate::history::{HistoryEntry, TransformChange, UndoHistory};
use nalgebra::Matrix4;
use orientkit_core::NodeRef;
use tracing::debug;

/// A node paired with the local transform it should receive
#[derive(Debug, Clone)]
pub struct TransformOp {
    pub node: NodeRef,
    pub transform: Matrix4<f64>,
}

/// Ordered set of pending transform updates
#[derive(Debug, Default)]
#[must_use = "a batch does nothing until committed"]
pub struct TransformBatch {
    label: String,
    ops: Vec<TransformOp>,
}

impl TransformBatch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ops: Vec::new(),
        }
    }

    /// Record a target transform; nothing is applied yet
    pub fn add(&mut self, node: NodeRef, transform: Matrix4<f64>) {
        self.ops.push(TransformOp { node, transform });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Apply every op and record them as one undo step
    ///
    /// Returns the number of nodes updated. An empty batch adds no history
    /// entry.
    pub fn commit(self, history: &mut UndoHistory) -> usize {
        if self.ops.is_empty() {
            return 0;
        }

        let changes: Vec<TransformChange> = self
            .ops
            .into_iter()
            .map(|op| {
                let before = op.node.local_transform();
                op.node.set_local_transform(op.transform);
                TransformChange {
                    node: op.node,
                    before,
                    after: op.transform,
                }
            })
            .collect();

        let count = changes.len();
        debug!("Committed '{}' with {} transforms", self.label, count);
        history.push(HistoryEntry::new(self.label, changes));
        count
    }
}
