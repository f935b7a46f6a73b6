//! User-facing message texts.

pub const TITLE: &str = "Orientation";
pub const AUTO_TITLE: &str = "Auto-Orientation";

pub const CALCULATING: &str = "Calculating the optimal orientation...";
pub const AUTO_CALCULATING: &str =
    "Auto-Calculating the optimal orientation because auto orientation is enabled";

pub const ORIENTED_FAST: &str = "All selected objects have been oriented.";
pub const ORIENTED_EXTENDED: &str =
    "All selected objects have been oriented using the extended mode.";
pub const INTERRUPTED: &str = "Orientation was interrupted before every object was processed.";

use orientkit_core::{JobState, MessageLevel, MessageSpec, OrientationMode};

use crate::job::JobReport;

/// Terminal message for a finished job
pub fn job_outcome(report: &JobReport) -> MessageSpec {
    match (report.state, &report.error) {
        (JobState::Completed, _) => {
            let text = match report.mode {
                OrientationMode::Fast => ORIENTED_FAST,
                OrientationMode::Extended => ORIENTED_EXTENDED,
            };
            MessageSpec::info(AUTO_TITLE, text).with_level(MessageLevel::Positive)
        }
        (JobState::Cancelled, _) => {
            MessageSpec::info(AUTO_TITLE, INTERRUPTED).with_level(MessageLevel::Warning)
        }
        (_, Some(error)) => {
            MessageSpec::info(AUTO_TITLE, error.to_string()).with_level(MessageLevel::Error)
        }
        (state, None) => MessageSpec::info(AUTO_TITLE, format!("Orientation ended: {}", state))
            .with_level(MessageLevel::Error),
    }
}
