//! Live settings
//!
//! [`SettingsStore`] is the single source of truth at runtime. Readers such
//! as the auto-orient watcher ask it on every decision instead of caching a
//! value, so a toggle takes effect immediately.

use crate::config::{Config, MAX_DEBOUNCE_MS};
use crate::error::{SettingsError, SettingsResult};
use crate::persistence;
use orientkit_core::{AppEvent, EventBus, SettingsEvent};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const KEY_AUTO_ORIENT: &str = "orientation.auto_orient_enabled";
pub const KEY_PENALIZE_VOLUME: &str = "orientation.penalize_overhang_volume";
pub const KEY_DEBOUNCE: &str = "orientation.auto_orient_debounce_ms";

/// Thread-safe runtime settings
#[derive(Debug, Default)]
pub struct SettingsStore {
    config: RwLock<Config>,
    path: Option<PathBuf>,
    bus: Option<Arc<EventBus>>,
}

impl SettingsStore {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            path: None,
            bus: None,
        }
    }

    /// Load from `path` (defaults when missing) and remember it for [`Self::save`]
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let config = persistence::load_or_default(&path)?;
        Ok(Self {
            config: RwLock::new(config),
            path: Some(path),
            bus: None,
        })
    }

    /// Publish change notifications on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> Config {
        self.config.read().clone()
    }

    pub fn auto_orient_enabled(&self) -> bool {
        self.config.read().orientation.auto_orient_enabled
    }

    pub fn penalize_overhang_volume(&self) -> bool {
        self.config.read().orientation.penalize_overhang_volume
    }

    pub fn auto_orient_debounce(&self) -> Duration {
        self.config.read().orientation.auto_orient_debounce()
    }

    pub fn set_auto_orient_enabled(&self, enabled: bool) {
        self.config.write().orientation.auto_orient_enabled = enabled;
        self.notify(KEY_AUTO_ORIENT, enabled.to_string());
    }

    pub fn set_penalize_overhang_volume(&self, enabled: bool) {
        self.config.write().orientation.penalize_overhang_volume = enabled;
        self.notify(KEY_PENALIZE_VOLUME, enabled.to_string());
    }

    pub fn set_auto_orient_debounce_ms(&self, millis: u64) -> SettingsResult<()> {
        if millis > MAX_DEBOUNCE_MS {
            return Err(SettingsError::InvalidSetting {
                key: KEY_DEBOUNCE.to_string(),
                reason: format!("must be at most {}", MAX_DEBOUNCE_MS),
            });
        }
        self.config.write().orientation.auto_orient_debounce_ms = millis;
        self.notify(KEY_DEBOUNCE, millis.to_string());
        Ok(())
    }

    /// Replace the whole configuration after validating it
    pub fn replace(&self, config: Config) -> SettingsResult<()> {
        config.validate()?;
        *self.config.write() = config;
        self.publish(SettingsEvent::Reloaded);
        Ok(())
    }

    /// Re-read the backing file
    pub fn reload(&self) -> SettingsResult<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| SettingsError::LoadError("store has no backing file".to_string()))?;
        let config = persistence::load_or_default(path)?;
        self.replace(config)
    }

    /// Write the current configuration to the backing file
    pub fn save(&self) -> SettingsResult<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| SettingsError::SaveError("store has no backing file".to_string()))?;
        persistence::save(&self.snapshot(), path)
    }

    fn notify(&self, key: &str, value: String) {
        debug!("Setting {} = {}", key, value);
        self.publish(SettingsEvent::Changed {
            key: key.to_string(),
            value,
        });
    }

    fn publish(&self, event: SettingsEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Settings(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orientkit_core::{EventCategory, EventFilter};
    use parking_lot::Mutex;

    #[test]
    fn test_setters_are_visible_immediately() {
        let store = SettingsStore::default();
        assert!(!store.auto_orient_enabled());
        store.set_auto_orient_enabled(true);
        assert!(store.auto_orient_enabled());
        store.set_penalize_overhang_volume(false);
        assert!(!store.penalize_overhang_volume());
    }

    #[test]
    fn test_setters_publish_changes() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Settings]),
            move |event| {
                if let AppEvent::Settings(SettingsEvent::Changed { key, value }) = event {
                    sink.lock().push((key, value));
                }
            },
        );

        let store = SettingsStore::new(Config::default()).with_event_bus(bus);
        store.set_auto_orient_enabled(true);
        store.set_auto_orient_debounce_ms(250).unwrap();

        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                (KEY_AUTO_ORIENT.to_string(), "true".to_string()),
                (KEY_DEBOUNCE.to_string(), "250".to_string()),
            ]
        );
    }

    #[test]
    fn test_debounce_out_of_range_is_rejected() {
        let store = SettingsStore::default();
        assert!(store.set_auto_orient_debounce_ms(MAX_DEBOUNCE_MS + 1).is_err());
        assert_eq!(store.auto_orient_debounce(), Duration::ZERO);
    }

    #[test]
    fn test_save_without_path_fails() {
        let store = SettingsStore::default();
        assert!(matches!(store.save(), Err(SettingsError::SaveError(_))));
    }
}
