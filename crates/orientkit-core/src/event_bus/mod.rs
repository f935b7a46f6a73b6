//! # Event Bus Module
//!
//! Publish/subscribe plumbing between the host and the orientation core:
//! - the host publishes [`SceneEvent`]s (file loads, node changes)
//! - the core publishes [`JobEvent`]s and [`SettingsEvent`]s
//! - subscribers filter by [`EventCategory`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orientkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SceneEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Scene]),
//!     |event| tracing::debug!("{}", event.description()),
//! );
//!
//! bus.publish(AppEvent::Scene(SceneEvent::FileLoadStarted {
//!     file: "bracket.stl".to_string(),
//! }));
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
