//! OrientKit Settings Crate
//!
//! Handles configuration files, their location on disk, and the live
//! settings store read by the orientation commands.

pub mod config;
pub mod error;
pub mod persistence;
pub mod store;

pub use config::{Config, LoggingSettings, OrientationSettings, MAX_DEBOUNCE_MS};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use persistence::{config_dir, default_config_path, load_or_default, save};
pub use store::SettingsStore;
