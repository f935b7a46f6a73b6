//! Event type definitions for the event bus.
//!
//! Events are organized by category. Scene events are produced by the host;
//! job and settings events are produced by the core.

use uuid::Uuid;

use crate::node::{NodeId, NodeRef};
use crate::orientation::{JobState, OrientationMode};

/// Root event enum for all application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// File loading and scene mutation notifications from the host
    Scene(SceneEvent),
    /// Orientation job lifecycle
    Job(JobEvent),
    /// Settings and configuration
    Settings(SettingsEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Scene(_) => EventCategory::Scene,
            AppEvent::Job(_) => EventCategory::Job,
            AppEvent::Settings(_) => EventCategory::Settings,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Scene(e) => e.description(),
            AppEvent::Job(e) => e.description(),
            AppEvent::Settings(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Scene,
    Job,
    Settings,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Scene => write!(f, "Scene"),
            EventCategory::Job => write!(f, "Job"),
            EventCategory::Settings => write!(f, "Settings"),
        }
    }
}

/// Host scene notifications
///
/// Delivery is at-least-once; `NodeChanged` may repeat for the same node
/// during a single load.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// A file started loading.
    FileLoadStarted {
        /// Load identifier (the file name).
        file: String,
    },
    /// A file finished loading.
    FileLoadCompleted { file: String },
    /// A node was added or mutated.
    NodeChanged { node: NodeRef },
}

impl SceneEvent {
    fn description(&self) -> String {
        match self {
            SceneEvent::FileLoadStarted { file } => format!("Loading {}", file),
            SceneEvent::FileLoadCompleted { file } => format!("Loaded {}", file),
            SceneEvent::NodeChanged { node } => format!("Changed {} ({})", node.name(), node.id()),
        }
    }
}

/// Orientation job lifecycle events
#[derive(Debug, Clone)]
pub enum JobEvent {
    Started {
        job_id: Uuid,
        mode: OrientationMode,
        nodes: usize,
    },
    /// A node received its new rotation.
    NodeOriented { job_id: Uuid, node: NodeId },
    /// Terminal state reached.
    Finished {
        job_id: Uuid,
        state: JobState,
        processed: usize,
    },
}

impl JobEvent {
    fn description(&self) -> String {
        match self {
            JobEvent::Started {
                job_id,
                mode,
                nodes,
            } => format!("Job {} started ({} mode, {} objects)", job_id, mode, nodes),
            JobEvent::NodeOriented { job_id, node } => {
                format!("Job {} oriented {}", job_id, node)
            }
            JobEvent::Finished {
                job_id,
                state,
                processed,
            } => format!("Job {} {} after {} objects", job_id, state, processed),
        }
    }
}

/// Settings change events
#[derive(Debug, Clone)]
pub enum SettingsEvent {
    /// A setting value changed.
    Changed { key: String, value: String },
    /// Settings were reloaded from disk.
    Reloaded,
}

impl SettingsEvent {
    fn description(&self) -> String {
        match self {
            SettingsEvent::Changed { key, value } => format!("Setting {} = {}", key, value),
            SettingsEvent::Reloaded => "Settings reloaded".to_string(),
        }
    }
}
