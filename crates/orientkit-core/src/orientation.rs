//! Orientation job vocabulary shared across crates.

use crate::error::OrientationError;
use serde::{Deserialize, Serialize};

/// Accuracy/runtime trade-off requested from the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMode {
    /// Bounded runtime, lower accuracy.
    Fast,
    /// May run substantially longer.
    Extended,
}

impl std::fmt::Display for OrientationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

/// Lifecycle of an orientation job
///
/// ```text
/// Pending -> Running -> Completed
///                    -> Failed
///                    -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Cancelled)
        )
    }

    /// Checked transition
    pub fn transition(&mut self, next: JobState) -> Result<(), OrientationError> {
        if !self.can_transition_to(next) {
            return Err(OrientationError::InvalidStateTransition {
                current: self.to_string(),
                requested: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = JobState::Pending;
        state.transition(JobState::Running).expect("start");
        state.transition(JobState::Completed).expect("finish");
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [JobState::Completed, JobState::Failed, JobState::Cancelled] {
            let mut state = terminal;
            assert!(state.transition(JobState::Running).is_err());
            assert!(state.transition(JobState::Failed).is_err());
            assert_eq!(state, terminal);
        }
    }

    #[test]
    fn test_pending_cannot_finish_without_running() {
        let mut state = JobState::Pending;
        let err = state.transition(JobState::Completed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Pending to Completed"
        );
    }
}
