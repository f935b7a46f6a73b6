//! # OrientKit Core
//!
//! Core types, traits, and utilities for OrientKit.
//! Provides the node abstraction the host implements, the status-message
//! lifecycle, the job state machine vocabulary, the event bus, and the
//! shared error types.

pub mod error;
pub mod event_bus;
pub mod message;
pub mod node;
pub mod orientation;
pub mod types;

pub use error::{Error, GeometryError, OrientationError, Result, SelectionError};

pub use event_bus::{
    AppEvent, EventBus, EventCategory, EventFilter, JobEvent, SceneEvent,
    SettingsEvent, SubscriptionId,
};

pub use message::{
    MessageGuard, MessageLevel, MessageSlot, MessageSpec, MessageTransition, ProgressMode,
    StatusChannel, StatusMessage, TracingStatusChannel,
};

pub use node::{MeshNode, NodeHandle, NodeId, NodeRef, TransformSpace, VertexSet};

pub use orientation::{JobState, OrientationMode};

pub use types::{thread_safe, CompletionCallback, ProgressCallback, ThreadSafe};
