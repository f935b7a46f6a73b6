//! User-visible status messages
//!
//! The host renders messages; the core only drives their lifecycle through
//! the [`StatusChannel`] and [`StatusMessage`] traits.
//!
//! Lifecycle rules:
//! - every message created by a job or validator is hidden exactly once,
//!   on every exit path ([`MessageGuard`] hides on drop)
//! - showing a new message through a [`MessageSlot`] hides the previous
//!   one first, so messages never stack

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Severity / styling of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageLevel {
    Info,
    Positive,
    Warning,
    Error,
}

/// Progress display of a message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressMode {
    /// No progress bar.
    None,
    /// Busy indicator without a value.
    Indeterminate,
    /// Progress bar over the given range.
    Determinate { min: f64, max: f64 },
}

/// Everything a channel needs to create a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub title: String,
    pub text: String,
    pub level: MessageLevel,
    pub progress: ProgressMode,
}

impl MessageSpec {
    /// Plain informational message
    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            level: MessageLevel::Info,
            progress: ProgressMode::None,
        }
    }

    /// Message with a 0..100 progress bar
    pub fn progress(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            progress: ProgressMode::Determinate {
                min: 0.0,
                max: 100.0,
            },
            ..Self::info(title, text)
        }
    }

    pub fn with_level(mut self, level: MessageLevel) -> Self {
        self.level = level;
        self
    }
}

/// A live message owned by the host's UI
pub trait StatusMessage: Send {
    fn show(&mut self);
    fn set_progress(&mut self, value: f64);
    fn set_text(&mut self, text: &str);
    fn hide(&mut self);
}

/// Factory for messages
pub trait StatusChannel: Send + Sync {
    fn create(&self, spec: MessageSpec) -> Box<dyn StatusMessage>;
}

/// Scoped ownership of a shown message
///
/// Hides the message exactly once: either through [`MessageGuard::hide`]
/// or when the guard is dropped.
pub struct MessageGuard {
    message: Box<dyn StatusMessage>,
    hidden: bool,
}

impl MessageGuard {
    /// Create and show a message
    pub fn show(channel: &dyn StatusChannel, spec: MessageSpec) -> Self {
        let mut message = channel.create(spec);
        message.show();
        Self {
            message,
            hidden: false,
        }
    }

    pub fn set_progress(&mut self, value: f64) {
        if !self.hidden {
            self.message.set_progress(value);
        }
    }

    pub fn set_text(&mut self, text: &str) {
        if !self.hidden {
            self.message.set_text(text);
        }
    }

    pub fn hide(&mut self) {
        if !self.hidden {
            self.hidden = true;
            self.message.hide();
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl Drop for MessageGuard {
    fn drop(&mut self) {
        self.hide();
    }
}

impl std::fmt::Debug for MessageGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageGuard")
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// The "current message" of one owner
///
/// Replaces the global current-message reference with an explicit slot.
/// This is advisory, not a lock: two slots can show messages at once.
#[derive(Debug, Clone, Default)]
pub struct MessageSlot {
    current: Arc<Mutex<Option<MessageGuard>>>,
}

impl MessageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide whatever is shown, then show `spec`
    pub fn replace(&self, channel: &dyn StatusChannel, spec: MessageSpec) {
        let mut current = self.current.lock();
        if let Some(mut previous) = current.take() {
            previous.hide();
        }
        *current = Some(MessageGuard::show(channel, spec));
    }

    /// Hide the current message, if any
    pub fn hide(&self) {
        if let Some(mut previous) = self.current.lock().take() {
            previous.hide();
        }
    }

    pub fn is_showing(&self) -> bool {
        self.current.lock().is_some()
    }
}

/// Observable message lifecycle transition
#[derive(Debug, Clone, PartialEq)]
pub enum MessageTransition {
    Shown { id: Uuid, spec: MessageSpec },
    Progress { id: Uuid, value: f64 },
    Text { id: Uuid, text: String },
    Hidden { id: Uuid },
}

impl MessageTransition {
    pub fn id(&self) -> Uuid {
        match self {
            MessageTransition::Shown { id, .. }
            | MessageTransition::Progress { id, .. }
            | MessageTransition::Text { id, .. }
            | MessageTransition::Hidden { id } => *id,
        }
    }
}

/// Status channel that writes messages to the log
///
/// Used by headless hosts. Every transition is also recorded so callers
/// can inspect the message history.
#[derive(Debug, Clone, Default)]
pub struct TracingStatusChannel {
    transitions: Arc<Mutex<Vec<MessageTransition>>>,
}

impl TracingStatusChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every transition so far
    pub fn transitions(&self) -> Vec<MessageTransition> {
        self.transitions.lock().clone()
    }

    /// Specs of messages that are currently shown
    pub fn visible(&self) -> Vec<MessageSpec> {
        let transitions = self.transitions.lock();
        let mut visible: Vec<(Uuid, MessageSpec)> = Vec::new();
        for t in transitions.iter() {
            match t {
                MessageTransition::Shown { id, spec } => visible.push((*id, spec.clone())),
                MessageTransition::Hidden { id } => visible.retain(|(v, _)| v != id),
                _ => {}
            }
        }
        visible.into_iter().map(|(_, spec)| spec).collect()
    }

    pub fn clear(&self) {
        self.transitions.lock().clear();
    }
}

impl StatusChannel for TracingStatusChannel {
    fn create(&self, spec: MessageSpec) -> Box<dyn StatusMessage> {
        Box::new(TracingMessage {
            id: Uuid::new_v4(),
            spec,
            transitions: self.transitions.clone(),
        })
    }
}

struct TracingMessage {
    id: Uuid,
    spec: MessageSpec,
    transitions: Arc<Mutex<Vec<MessageTransition>>>,
}

impl StatusMessage for TracingMessage {
    fn show(&mut self) {
        match self.spec.level {
            MessageLevel::Error => tracing::error!("[{}] {}", self.spec.title, self.spec.text),
            MessageLevel::Warning => tracing::warn!("[{}] {}", self.spec.title, self.spec.text),
            _ => tracing::info!("[{}] {}", self.spec.title, self.spec.text),
        }
        self.transitions.lock().push(MessageTransition::Shown {
            id: self.id,
            spec: self.spec.clone(),
        });
    }

    fn set_progress(&mut self, value: f64) {
        tracing::debug!("[{}] progress {:.1}%", self.spec.title, value);
        self.transitions
            .lock()
            .push(MessageTransition::Progress { id: self.id, value });
    }

    fn set_text(&mut self, text: &str) {
        self.spec.text = text.to_string();
        self.transitions.lock().push(MessageTransition::Text {
            id: self.id,
            text: text.to_string(),
        });
    }

    fn hide(&mut self) {
        self.transitions
            .lock()
            .push(MessageTransition::Hidden { id: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_count(channel: &TracingStatusChannel) -> usize {
        channel
            .transitions()
            .iter()
            .filter(|t| matches!(t, MessageTransition::Hidden { .. }))
            .count()
    }

    #[test]
    fn test_guard_hides_once_on_drop() {
        let channel = TracingStatusChannel::new();
        {
            let mut guard = MessageGuard::show(&channel, MessageSpec::info("t", "x"));
            guard.hide();
            guard.hide();
        }
        assert_eq!(hidden_count(&channel), 1);
        assert!(channel.visible().is_empty());
    }

    #[test]
    fn test_guard_ignores_updates_after_hide() {
        let channel = TracingStatusChannel::new();
        let mut guard = MessageGuard::show(&channel, MessageSpec::progress("t", "x"));
        guard.set_progress(10.0);
        guard.hide();
        guard.set_progress(20.0);
        let progress: Vec<_> = channel
            .transitions()
            .into_iter()
            .filter(|t| matches!(t, MessageTransition::Progress { .. }))
            .collect();
        assert_eq!(progress.len(), 1);
    }

    #[test]
    fn test_slot_hides_previous_before_showing() {
        let channel = TracingStatusChannel::new();
        let slot = MessageSlot::new();
        slot.replace(&channel, MessageSpec::info("t", "first"));
        slot.replace(&channel, MessageSpec::info("t", "second"));

        let visible = channel.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "second");

        let transitions = channel.transitions();
        assert!(matches!(transitions[1], MessageTransition::Hidden { .. }));
        assert_eq!(transitions[1].id(), transitions[0].id());

        slot.hide();
        assert!(!slot.is_showing());
        assert!(channel.visible().is_empty());
    }
}
