//! Selection preconditions

use crate::messages;
use orientkit_core::{MessageLevel, MessageSlot, MessageSpec, NodeRef, SelectionError, StatusChannel};
use tracing::warn;

/// Checks selection counts before any work starts
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionValidator;

impl SelectionValidator {
    /// Count check without side effects
    pub fn check(selection: &[NodeRef], require_exactly_one: bool) -> Result<(), SelectionError> {
        if require_exactly_one {
            if selection.len() != 1 {
                return Err(SelectionError::SingleSelectionRequired {
                    count: selection.len(),
                });
            }
        } else if selection.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        Ok(())
    }

    /// Validate and report
    ///
    /// Whatever `slot` is showing is hidden first. On failure a single
    /// error message is shown in its place.
    pub fn validate(
        selection: &[NodeRef],
        require_exactly_one: bool,
        slot: &MessageSlot,
        channel: &dyn StatusChannel,
    ) -> Result<Vec<NodeRef>, SelectionError> {
        slot.hide();
        match Self::check(selection, require_exactly_one) {
            Ok(()) => Ok(selection.to_vec()),
            Err(e) => {
                warn!("Selection rejected: {}", e);
                slot.replace(
                    channel,
                    MessageSpec::info(messages::TITLE, e.to_string()).with_level(MessageLevel::Error),
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use orientkit_core::{MeshNode, TracingStatusChannel};

    fn nodes(n: usize) -> Vec<NodeRef> {
        (0..n)
            .map(|i| MeshNode::cuboid(format!("n{}", i), Vector3::repeat(1.0)).into_ref())
            .collect()
    }

    #[test]
    fn test_counts() {
        assert_eq!(
            SelectionValidator::check(&[], false),
            Err(SelectionError::EmptySelection)
        );
        assert!(SelectionValidator::check(&nodes(3), false).is_ok());
        assert!(SelectionValidator::check(&nodes(1), true).is_ok());
        assert_eq!(
            SelectionValidator::check(&nodes(2), true),
            Err(SelectionError::SingleSelectionRequired { count: 2 })
        );
        assert_eq!(
            SelectionValidator::check(&[], true),
            Err(SelectionError::SingleSelectionRequired { count: 0 })
        );
    }

    #[test]
    fn test_failure_replaces_prior_message() {
        let channel = TracingStatusChannel::new();
        let slot = MessageSlot::new();
        slot.replace(&channel, MessageSpec::info("t", "earlier result"));

        let result = SelectionValidator::validate(&[], false, &slot, &channel);
        assert!(matches!(result, Err(SelectionError::EmptySelection)));

        let visible = channel.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].level, MessageLevel::Error);
        assert!(visible[0].text.contains("one or more"));
    }

    #[test]
    fn test_success_hides_prior_message() {
        let channel = TracingStatusChannel::new();
        let slot = MessageSlot::new();
        slot.replace(&channel, MessageSpec::info("t", "earlier result"));

        let selected = SelectionValidator::validate(&nodes(2), false, &slot, &channel).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(channel.visible().is_empty());
    }
}
