//! # OrientKit
//!
//! Print orientation and silhouette alignment for 3D objects:
//! - background orientation jobs driven by an external optimizer
//! - auto-orientation of objects as they are loaded
//! - longest-edge and minimum-area-rectangle alignment about the vertical axis
//! - undoable rotation batches
//!
//! ## Architecture
//!
//! OrientKit is organized as a workspace with multiple crates:
//!
//! 1. **orientkit-core** - Scene nodes, errors, event bus, status messages
//! 2. **orientkit-geometry** - Convex hulls, oriented bounds, alignment math
//! 3. **orientkit-settings** - Persisted configuration and the live settings store
//! 4. **orientkit-orient** - Jobs, commands, undo history, auto-orient watcher
//! 5. **orientkit** - Re-exports and a headless demo binary

pub use orientkit_core;
pub use orientkit_geometry;
pub use orientkit_orient;
pub use orientkit_settings;

pub use orientkit_core::{
    AppEvent, Error, EventBus, JobState, MeshNode, MessageLevel, MessageSpec, NodeHandle,
    NodeRef, OrientationMode, Result, SceneEvent, StatusChannel, TracingStatusChannel,
};
pub use orientkit_geometry::{MinAreaRect, ProjectedHullExtractor, RotationDescriptor};
pub use orientkit_orient::{
    AutoOrientWatcher, JobReport, OrientationCommands, OrientationJob, Optimizer,
    OptimizerError, OrientationResult,
};
pub use orientkit_settings::{Config, LoggingSettings, SettingsStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from persisted settings
///
/// `RUST_LOG` still wins over `settings.level` when set. With
/// `settings.json` the console output is one JSON object per line.
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| anyhow::anyhow!("invalid log filter: {}", e))?;

    if settings.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
