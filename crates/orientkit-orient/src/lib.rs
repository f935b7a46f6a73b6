//! # OrientKit Orient
//!
//! Everything that changes a node's orientation:
//! - background [`OrientationJob`]s driven by an external [`Optimizer`]
//! - silhouette alignment and rotation reset through [`OrientationCommands`]
//! - atomic, undoable [`TransformBatch`]es
//! - selection preconditions ([`SelectionValidator`])
//! - auto-orientation of freshly loaded objects ([`AutoOrientWatcher`])

pub mod batch;
pub mod commands;
pub mod history;
pub mod job;
pub mod messages;
pub mod optimizer;
mod progress;
pub mod selection;
pub mod shutdown;
pub mod watcher;

pub use batch::{TransformBatch, TransformOp};
pub use commands::{AlignmentSummary, Capabilities, OrientationCommands};
pub use history::{HistoryEntry, TransformChange, UndoHistory};
pub use job::{JobReport, OrientationJob};
pub use optimizer::{
    frame_correction, OptimizeRequest, Optimizer, OptimizerError, OrientationResult,
};
pub use selection::SelectionValidator;
pub use shutdown::ShutdownSignal;
pub use watcher::{AutoOrientWatcher, AutoOrientWatcherBuilder};
