//! # Auto-Orient Watcher
//!
//! Orients freshly loaded objects automatically when the
//! `auto_orient_enabled` setting is on.
//!
//! The host reports file loads and scene changes, directly or through
//! [`AutoOrientWatcher::attach`]. A changed node is queued when:
//! - auto-orient is enabled (read from the settings store every time)
//! - the node carries mesh data
//! - the file it came from is still loading
//! - it has not been queued before during that load
//!
//! A scene may change many times while one file loads. The first node
//! queued after a drain schedules the next drain, which waits until no new
//! node has been queued for the configured debounce (zero means the next
//! scheduler turn), then starts one extended-mode job per node.

use crate::job::{JobReport, OrientationJob};
use crate::messages;
use crate::optimizer::Optimizer;
use crate::shutdown::ShutdownSignal;
use orientkit_core::{
    AppEvent, EventBus, EventCategory, EventFilter, MessageGuard, MessageSlot, MessageSpec,
    NodeId, NodeRef, OrientationMode, SceneEvent, StatusChannel, SubscriptionId,
};
use orientkit_settings::SettingsStore;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Default)]
struct WatcherState {
    /// In-flight loads, each with the nodes already queued for it.
    loading: HashMap<String, HashSet<NodeId>>,
    queue: Vec<NodeRef>,
    drain_pending: bool,
    last_enqueue: Option<Instant>,
    /// Scheduled drains and started jobs; finished ones are pruned
    /// whenever new ones are added.
    drains: Vec<JoinHandle<()>>,
    jobs: Vec<JoinHandle<JobReport>>,
}

struct WatcherInner {
    settings: Arc<SettingsStore>,
    optimizer: Arc<dyn Optimizer>,
    channel: Arc<dyn StatusChannel>,
    bus: Option<Arc<EventBus>>,
    shutdown: ShutdownSignal,
    runtime: Option<Handle>,
    slot: MessageSlot,
    state: Mutex<WatcherState>,
    attachment: Mutex<Option<(Weak<EventBus>, SubscriptionId)>>,
}

/// Event-driven auto-orientation of newly loaded nodes
#[derive(Clone)]
pub struct AutoOrientWatcher {
    inner: Arc<WatcherInner>,
}

/// Builder for [`AutoOrientWatcher`]
pub struct AutoOrientWatcherBuilder {
    settings: Arc<SettingsStore>,
    optimizer: Arc<dyn Optimizer>,
    channel: Arc<dyn StatusChannel>,
    bus: Option<Arc<EventBus>>,
    shutdown: ShutdownSignal,
    runtime: Option<Handle>,
}

impl AutoOrientWatcherBuilder {
    /// Publish job events of auto-orient jobs on `bus`
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Schedule drains on `handle` instead of the current runtime
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> AutoOrientWatcher {
        AutoOrientWatcher {
            inner: Arc::new(WatcherInner {
                settings: self.settings,
                optimizer: self.optimizer,
                channel: self.channel,
                bus: self.bus,
                shutdown: self.shutdown,
                runtime: self.runtime.or_else(|| Handle::try_current().ok()),
                slot: MessageSlot::new(),
                state: Mutex::new(WatcherState::default()),
                attachment: Mutex::new(None),
            }),
        }
    }
}

impl AutoOrientWatcher {
    /// Create a watcher bound to the current tokio runtime, if any
    pub fn new(
        settings: Arc<SettingsStore>,
        optimizer: Arc<dyn Optimizer>,
        channel: Arc<dyn StatusChannel>,
    ) -> Self {
        Self::builder(settings, optimizer, channel).build()
    }

    pub fn builder(
        settings: Arc<SettingsStore>,
        optimizer: Arc<dyn Optimizer>,
        channel: Arc<dyn StatusChannel>,
    ) -> AutoOrientWatcherBuilder {
        AutoOrientWatcherBuilder {
            settings,
            optimizer,
            channel,
            bus: None,
            shutdown: ShutdownSignal::new(),
            runtime: None,
        }
    }

    pub fn load_started(&self, load_id: &str) {
        self.inner.load_started(load_id);
    }

    pub fn load_completed(&self, load_id: &str) {
        self.inner.load_completed(load_id);
    }

    /// Returns true when the node was queued
    pub fn node_changed(&self, node: NodeRef) -> bool {
        self.inner.node_changed(node)
    }

    pub fn is_loading(&self, load_id: &str) -> bool {
        self.inner.state.lock().loading.contains_key(load_id)
    }

    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// The slot holding the watcher's current message
    pub fn message_slot(&self) -> &MessageSlot {
        &self.inner.slot
    }

    /// Follow scene events on `bus`, replacing any earlier attachment
    pub fn attach(&self, bus: &Arc<EventBus>) -> SubscriptionId {
        self.detach();
        let weak = Arc::downgrade(&self.inner);
        let id = bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Scene]),
            move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle(event);
                }
            },
        );
        *self.inner.attachment.lock() = Some((Arc::downgrade(bus), id));
        debug!("Auto-orient watcher attached ({})", id);
        id
    }

    /// Stop following scene events; returns true if attached before
    pub fn detach(&self) -> bool {
        self.inner.detach()
    }

    /// Wait for every scheduled drain and the jobs it started
    ///
    /// Jobs that had already finished when a later drain started are no
    /// longer tracked, so their reports are not returned.
    pub async fn flush(&self) -> Vec<JobReport> {
        let mut reports = Vec::new();
        loop {
            let (drains, jobs) = {
                let mut state = self.inner.state.lock();
                (
                    std::mem::take(&mut state.drains),
                    std::mem::take(&mut state.jobs),
                )
            };
            if drains.is_empty() && jobs.is_empty() {
                break;
            }
            for job in jobs {
                match job.await {
                    Ok(report) => reports.push(report),
                    Err(e) => warn!("Auto-orient job failed to join: {}", e),
                }
            }
            for drain in drains {
                if let Err(e) = drain.await {
                    warn!("Auto-orient drain failed: {}", e);
                }
            }
        }
        reports
    }

    /// Drain and job handles still held by the watcher
    pub fn tracked_tasks(&self) -> usize {
        let state = self.inner.state.lock();
        state.drains.len() + state.jobs.len()
    }
}

impl std::fmt::Debug for AutoOrientWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AutoOrientWatcher")
            .field("loading", &state.loading.len())
            .field("queued", &state.queue.len())
            .field("drain_pending", &state.drain_pending)
            .finish()
    }
}

impl WatcherInner {
    fn handle(self: &Arc<Self>, event: AppEvent) {
        match event {
            AppEvent::Scene(SceneEvent::FileLoadStarted { file }) => self.load_started(&file),
            AppEvent::Scene(SceneEvent::FileLoadCompleted { file }) => self.load_completed(&file),
            AppEvent::Scene(SceneEvent::NodeChanged { node }) => {
                self.node_changed(node);
            }
            _ => {}
        }
    }

    fn load_started(&self, load_id: &str) {
        self.state
            .lock()
            .loading
            .insert(load_id.to_string(), HashSet::new());
    }

    fn load_completed(&self, load_id: &str) {
        self.state.lock().loading.remove(load_id);
    }

    fn node_changed(self: &Arc<Self>, node: NodeRef) -> bool {
        if !self.settings.auto_orient_enabled() || node.vertices().is_none() {
            return false;
        }
        let Some(load_id) = node.source_file() else {
            return false;
        };

        let mut state = self.state.lock();
        let Some(seen) = state.loading.get_mut(&load_id) else {
            return false;
        };
        if !seen.insert(node.id()) {
            return false;
        }

        debug!("Queued {} from {} for auto-orientation", node.name(), load_id);
        state.queue.push(node);
        state.last_enqueue = Some(Instant::now());
        if !state.drain_pending {
            self.schedule_drain(&mut state);
        }
        true
    }

    fn schedule_drain(self: &Arc<Self>, state: &mut WatcherState) {
        let Some(runtime) = &self.runtime else {
            warn!("No tokio runtime; dropping {} queued objects", state.queue.len());
            state.queue.clear();
            return;
        };
        state.drain_pending = true;
        state.drains.retain(|drain| !drain.is_finished());
        let inner = self.clone();
        state
            .drains
            .push(runtime.spawn(async move { inner.drain_when_quiet().await }));
    }

    async fn drain_when_quiet(self: Arc<Self>) {
        let debounce = self.settings.auto_orient_debounce();
        if debounce.is_zero() {
            tokio::task::yield_now().await;
        } else {
            loop {
                let deadline = self.state.lock().last_enqueue.map(|at| at + debounce);
                match deadline {
                    Some(deadline) if deadline > Instant::now() => {
                        tokio::time::sleep_until(deadline).await
                    }
                    _ => break,
                }
            }
        }
        self.drain()
    }

    fn drain(&self) {
        let nodes = {
            let mut state = self.state.lock();
            state.drain_pending = false;
            state.last_enqueue = None;
            std::mem::take(&mut state.queue)
        };
        if nodes.is_empty() {
            return;
        }
        info!("Auto-orienting {} newly loaded objects", nodes.len());
        let started: Vec<_> = nodes
            .into_iter()
            .filter_map(|node| self.start_job(node))
            .collect();

        let mut state = self.state.lock();
        state.jobs.retain(|job| !job.is_finished());
        state.jobs.extend(started);
    }

    fn start_job(&self, node: NodeRef) -> Option<JoinHandle<JobReport>> {
        self.slot.hide();
        let message = MessageGuard::show(
            self.channel.as_ref(),
            MessageSpec::progress(messages::AUTO_TITLE, messages::AUTO_CALCULATING),
        );
        let mut job = OrientationJob::new(vec![node], OrientationMode::Extended, self.optimizer.clone())
            .with_overhang_volume(self.settings.penalize_overhang_volume())
            .with_message(message)
            .with_shutdown(self.shutdown.clone());
        if let Some(bus) = &self.bus {
            job = job.with_event_bus(bus.clone());
        }

        let slot = self.slot.clone();
        let channel = self.channel.clone();
        match job.start(
            |_| {},
            move |report| slot.replace(channel.as_ref(), messages::job_outcome(&report)),
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Auto-orient job not started: {}", e);
                None
            }
        }
    }

    fn detach(&self) -> bool {
        match self.attachment.lock().take() {
            Some((bus, id)) => bus.upgrade().is_some_and(|bus| bus.unsubscribe(id)),
            None => false,
        }
    }
}

impl Drop for WatcherInner {
    fn drop(&mut self) {
        self.detach();
    }
}
