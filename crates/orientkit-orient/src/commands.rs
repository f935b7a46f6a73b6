//! # Orientation Commands
//!
//! The public command surface a host binds to its menus or shortcuts.
//!
//! - `trigger_fast_orientation` / `trigger_extended_orientation` start a
//!   background [`OrientationJob`] for the selection.
//! - `trigger_main_axis_align` / `trigger_side_axis_align` rotate the
//!   selection about the up axis from its silhouette, as one undoable step.
//! - `reset_orientation` strips rotation from the selection, as one
//!   undoable step.
//!
//! All commands validate the selection first and never leave more than one
//! of their own messages on screen.

use crate::batch::TransformBatch;
use crate::history::UndoHistory;
use crate::job::{JobReport, OrientationJob};
use crate::messages;
use crate::optimizer::Optimizer;
use crate::selection::SelectionValidator;
use crate::shutdown::ShutdownSignal;
use orientkit_core::{
    EventBus, GeometryError, MessageGuard, MessageLevel, MessageSlot, MessageSpec, NodeRef,
    OrientationError, OrientationMode, Result, StatusChannel,
};
use orientkit_geometry::{
    build_main_alignment, build_side_alignment, compose_with_local, reset_rotation, ConvexHull2D,
    HullExtractor, MinAreaRect, OrientedBounds2D, ProjectedHullExtractor, RotationDescriptor,
};
use orientkit_settings::SettingsStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Features the host declares at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The oriented-bounds primitive is usable on this host.
    pub main_axis_alignment: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            main_axis_alignment: true,
        }
    }
}

/// Result of an alignment or reset command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentSummary {
    /// Nodes that received a new transform.
    pub aligned: usize,
    /// Nodes left untouched (no mesh, no hull, degenerate geometry).
    pub skipped: usize,
}

pub struct OrientationCommands {
    optimizer: Arc<dyn Optimizer>,
    channel: Arc<dyn StatusChannel>,
    settings: Arc<SettingsStore>,
    hulls: Arc<dyn HullExtractor>,
    bounds: Arc<dyn OrientedBounds2D>,
    capabilities: Capabilities,
    history: Mutex<UndoHistory>,
    slot: MessageSlot,
    bus: Option<Arc<EventBus>>,
    shutdown: ShutdownSignal,
    runtime: Option<Handle>,
}

impl OrientationCommands {
    pub fn new(
        optimizer: Arc<dyn Optimizer>,
        channel: Arc<dyn StatusChannel>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            optimizer,
            channel,
            settings,
            hulls: Arc::new(ProjectedHullExtractor),
            bounds: Arc::new(MinAreaRect),
            capabilities: Capabilities::default(),
            history: Mutex::new(UndoHistory::new()),
            slot: MessageSlot::new(),
            bus: None,
            shutdown: ShutdownSignal::new(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Runtime the orientation jobs are spawned on
    ///
    /// Defaults to the runtime current at construction, then to the one
    /// current at the call.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_hull_extractor(mut self, hulls: Arc<dyn HullExtractor>) -> Self {
        self.hulls = hulls;
        self
    }

    pub fn with_oriented_bounds(mut self, bounds: Arc<dyn OrientedBounds2D>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history = Mutex::new(UndoHistory::with_depth(depth));
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// The slot holding this surface's current message
    pub fn message_slot(&self) -> &MessageSlot {
        &self.slot
    }

    pub fn trigger_fast_orientation(&self, selection: &[NodeRef]) -> Result<JoinHandle<JobReport>> {
        self.trigger_orientation(selection, OrientationMode::Fast)
    }

    pub fn trigger_extended_orientation(
        &self,
        selection: &[NodeRef],
    ) -> Result<JoinHandle<JobReport>> {
        self.trigger_orientation(selection, OrientationMode::Extended)
    }

    fn trigger_orientation(
        &self,
        selection: &[NodeRef],
        mode: OrientationMode,
    ) -> Result<JoinHandle<JobReport>> {
        let nodes =
            SelectionValidator::validate(selection, false, &self.slot, self.channel.as_ref())?;
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            let error = OrientationError::NoRuntime;
            warn!("{} orientation not started: {}", mode, error);
            self.slot.replace(
                self.channel.as_ref(),
                MessageSpec::info(messages::AUTO_TITLE, error.to_string())
                    .with_level(MessageLevel::Error),
            );
            return Err(error.into());
        };

        let message = MessageGuard::show(
            self.channel.as_ref(),
            MessageSpec::progress(messages::AUTO_TITLE, messages::CALCULATING),
        );
        let mut job = OrientationJob::new(nodes, mode, self.optimizer.clone())
            .with_overhang_volume(self.settings.penalize_overhang_volume())
            .with_message(message)
            .with_shutdown(self.shutdown.clone());
        if let Some(bus) = &self.bus {
            job = job.with_event_bus(bus.clone());
        }

        let slot = self.slot.clone();
        let channel = self.channel.clone();
        let handle = job.start_on(
            &runtime,
            |_| {},
            move |report| slot.replace(channel.as_ref(), messages::job_outcome(&report)),
        )?;
        Ok(handle)
    }

    /// Square each object's minimum-area rectangle with the X/Z axes
    pub fn trigger_main_axis_align(&self, selection: &[NodeRef]) -> Result<AlignmentSummary> {
        if !self.capabilities.main_axis_alignment {
            warn!("Main axis alignment requested but not available on this host");
            return Err(OrientationError::CapabilityUnavailable {
                capability: "main_axis_alignment".to_string(),
            }
            .into());
        }
        let bounds = self.bounds.clone();
        self.align(selection, "Rotate in the main direction", |hull| {
            build_main_alignment(hull, bounds.as_ref())
        })
    }

    /// Turn each object's longest silhouette edge onto +X
    pub fn trigger_side_axis_align(&self, selection: &[NodeRef]) -> Result<AlignmentSummary> {
        self.align(selection, "Rotate the side direction", build_side_alignment)
    }

    fn align<F>(&self, selection: &[NodeRef], label: &str, build: F) -> Result<AlignmentSummary>
    where
        F: Fn(&ConvexHull2D) -> std::result::Result<RotationDescriptor, GeometryError>,
    {
        let nodes =
            SelectionValidator::validate(selection, false, &self.slot, self.channel.as_ref())?;

        let mut batch = TransformBatch::new(label);
        let mut skipped = 0;
        for node in nodes {
            if node.vertices().is_none() {
                debug!("{} has no mesh data, not aligned", node.name());
                skipped += 1;
                continue;
            }
            let rotation = match self.hulls.hull(&*node).and_then(|hull| build(&hull)) {
                Ok(rotation) => rotation,
                Err(e) => {
                    warn!("Object {} cannot be aligned: {}", node.name(), e);
                    skipped += 1;
                    continue;
                }
            };
            let target = compose_with_local(&rotation, &node.local_transform());
            batch.add(node, target);
        }

        let aligned = batch.commit(&mut self.history.lock());
        info!("{}: {} aligned, {} skipped", label, aligned, skipped);
        Ok(AlignmentSummary { aligned, skipped })
    }

    /// Remove rotation from the selection, keeping position and scale
    pub fn reset_orientation(&self, selection: &[NodeRef]) -> Result<AlignmentSummary> {
        let nodes =
            SelectionValidator::validate(selection, false, &self.slot, self.channel.as_ref())?;

        let mut batch = TransformBatch::new("Reinit rotation");
        for node in nodes {
            let target = reset_rotation(&node.local_transform());
            batch.add(node, target);
        }
        let aligned = batch.commit(&mut self.history.lock());
        Ok(AlignmentSummary {
            aligned,
            skipped: 0,
        })
    }

    /// Undo the last alignment or reset; returns its label
    pub fn undo(&self) -> Option<String> {
        self.history.lock().undo()
    }

    /// Redo the last undone alignment or reset; returns its label
    pub fn redo(&self) -> Option<String> {
        self.history.lock().redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.lock().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.lock().can_redo()
    }
}

impl std::fmt::Debug for OrientationCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrientationCommands")
            .field("capabilities", &self.capabilities)
            .field("history", &*self.history.lock())
            .field("slot", &self.slot)
            .finish()
    }
}
