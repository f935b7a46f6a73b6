//! Error handling for OrientKit
//!
//! Provides error types for every layer of the orientation pipeline:
//! - Selection errors (precondition checks before any work starts)
//! - Geometry errors (hull and vector degeneracies, per node)
//! - Orientation errors (optimizer failures, job lifecycle)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Selection precondition error
///
/// Raised before any job or batch is created. Surfaced to the user as a
/// single status message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing is selected
    #[error("No objects selected to orient. Please select one or more objects and try again.")]
    EmptySelection,

    /// The command needs exactly one object
    #[error("No object selected to orient. Please select one object and try again.")]
    SingleSelectionRequired {
        /// Number of objects that were actually selected.
        count: usize,
    },
}

/// Geometry error type
///
/// Per-node and non-fatal to a batch: the node is skipped and logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Hull has fewer than three points, or every edge has zero length
    #[error("Degenerate hull: {points} points, longest edge {longest}")]
    DegenerateHull {
        /// Number of points in the hull.
        points: usize,
        /// Length of the longest edge found (0 when all edges collapse).
        longest: f64,
    },

    /// Angle computation on a null vector
    #[error("Cannot compute an angle against a zero-length vector")]
    ZeroVector,

    /// Node carries no geometry a hull can be extracted from
    #[error("Object {node} has no convex hull")]
    MissingHull {
        /// Display name of the node.
        node: String,
    },

    /// The oriented-bounds primitive could not produce a rectangle
    #[error("Oriented bounds failed: {reason}")]
    BoundsFailed {
        /// The reason reported by the primitive.
        reason: String,
    },
}

/// Orientation job error type
///
/// Represents failures of the optimizer-driven orientation jobs and of
/// the command surface that launches them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrientationError {
    /// The external optimizer raised or returned unusable data
    #[error("Optimizer failed on {node}: {reason}")]
    OptimizerFailure {
        /// Display name of the node being processed.
        node: String,
        /// The reason reported by the optimizer.
        reason: String,
    },

    /// The host shut down while the job was running
    #[error("Job aborted after {processed} of {total} objects")]
    JobAborted {
        /// Number of nodes that were rotated before the abort.
        processed: usize,
        /// Number of nodes queued in the job.
        total: usize,
    },

    /// Invalid job state transition
    #[error("Invalid state transition from {current} to {requested}")]
    InvalidStateTransition {
        /// The current state name.
        current: String,
        /// The requested state name.
        requested: String,
    },

    /// No tokio runtime to run the job on
    #[error("No async runtime available to run the orientation job")]
    NoRuntime,

    /// The host did not declare the capability this command needs
    #[error("Capability not available: {capability}")]
    CapabilityUnavailable {
        /// The capability that is not available.
        capability: String,
    },
}

/// Main error type for OrientKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Selection error
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Orientation error
    #[error(transparent)]
    Orientation(#[from] OrientationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a selection precondition error
    pub fn is_selection_error(&self) -> bool {
        matches!(self, Error::Selection(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
