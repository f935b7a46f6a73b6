//! # Orientation Jobs
//!
//! An [`OrientationJob`] runs the external optimizer over a list of nodes on
//! the tokio runtime without blocking the caller.
//!
//! ## Behaviour
//!
//! - Nodes are processed strictly in the order given. Each optimizer call
//!   runs on the blocking pool; the job yields to the scheduler between
//!   nodes.
//! - Each result is applied to its node immediately, as a world-space
//!   rotation about the node's position.
//! - An optimizer failure ends the job as `Failed`. Rotations already
//!   applied are kept and the remaining nodes are never touched.
//! - A raised [`ShutdownSignal`] ends the job as `Cancelled` at the next
//!   node boundary.
//! - The completion callback fires exactly once, whatever the outcome, after
//!   the job's own status message has been hidden.

use crate::optimizer::{OptimizeRequest, Optimizer, OptimizerError, OrientationResult};
use crate::progress::{ProgressTracker, SharedMessage};
use crate::shutdown::ShutdownSignal;
use chrono::{DateTime, Utc};
use orientkit_core::{
    thread_safe, AppEvent, CompletionCallback, EventBus, JobEvent, JobState, MessageGuard, NodeRef,
    OrientationError, OrientationMode, ProgressCallback, ThreadSafe, TransformSpace, VertexSet,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outcome of a finished job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub job_id: Uuid,
    pub mode: OrientationMode,
    pub state: JobState,
    /// Nodes handed to the job.
    pub total: usize,
    /// Nodes that received a rotation.
    pub processed: usize,
    /// Nodes skipped for lack of mesh data.
    pub skipped: usize,
    pub error: Option<OrientationError>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.state == JobState::Completed
    }
}

/// Background orientation of a set of nodes
pub struct OrientationJob {
    id: Uuid,
    nodes: Vec<NodeRef>,
    request: OptimizeRequest,
    optimizer: Arc<dyn Optimizer>,
    state: ThreadSafe<JobState>,
    message: SharedMessage,
    bus: Option<Arc<EventBus>>,
    shutdown: ShutdownSignal,
}

impl OrientationJob {
    pub fn new(nodes: Vec<NodeRef>, mode: OrientationMode, optimizer: Arc<dyn Optimizer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            nodes,
            request: OptimizeRequest::new(mode),
            optimizer,
            state: thread_safe(JobState::Pending),
            message: thread_safe(None),
            bus: None,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_overhang_volume(mut self, enabled: bool) -> Self {
        self.request = self.request.with_overhang_volume(enabled);
        self
    }

    /// Status message driven by this job and hidden when it finishes
    pub fn with_message(self, message: MessageGuard) -> Self {
        *self.message.lock() = Some(message);
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

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> OrientationMode {
        self.request.mode
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Start the job on the current tokio runtime
    ///
    /// Fails with [`OrientationError::NoRuntime`] outside a runtime; use
    /// [`OrientationJob::start_on`] from plain host threads.
    pub fn start<P, C>(
        &self,
        on_progress: P,
        on_complete: C,
    ) -> Result<JoinHandle<JobReport>, OrientationError>
    where
        P: Fn(f64) + Send + Sync + 'static,
        C: FnOnce(JobReport) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| OrientationError::NoRuntime)?;
        self.start_on(&runtime, on_progress, on_complete)
    }

    /// Start the job on `runtime`
    ///
    /// `on_progress` receives a non-decreasing stream ending in a single
    /// 100 on success. Sub-progress is not rescaled per node: once a node
    /// has reported some value, later nodes stay silent until their own
    /// progress reaches it. A job can only be started once.
    pub fn start_on<P, C>(
        &self,
        runtime: &Handle,
        on_progress: P,
        on_complete: C,
    ) -> Result<JoinHandle<JobReport>, OrientationError>
    where
        P: Fn(f64) + Send + Sync + 'static,
        C: FnOnce(JobReport) + Send + 'static,
    {
        self.state.lock().transition(JobState::Running)?;
        info!(
            "Job {} started: {} objects, {} mode",
            self.id,
            self.nodes.len(),
            self.request.mode
        );

        let listener: ProgressCallback = Arc::new(on_progress);
        let run = JobRun {
            id: self.id,
            nodes: self.nodes.clone(),
            request: self.request,
            optimizer: self.optimizer.clone(),
            state: self.state.clone(),
            tracker: Arc::new(ProgressTracker::new(listener, self.message.clone())),
            message: self.message.clone(),
            bus: self.bus.clone(),
            shutdown: self.shutdown.clone(),
        };
        let on_complete: CompletionCallback<JobReport> = Box::new(on_complete);

        Ok(runtime.spawn(async move {
            let report = run.execute().await;
            on_complete(report.clone());
            report
        }))
    }
}

impl std::fmt::Debug for OrientationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrientationJob")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("request", &self.request)
            .field("state", &self.state())
            .finish()
    }
}

/// Everything the spawned task owns
struct JobRun {
    id: Uuid,
    nodes: Vec<NodeRef>,
    request: OptimizeRequest,
    optimizer: Arc<dyn Optimizer>,
    state: ThreadSafe<JobState>,
    tracker: Arc<ProgressTracker>,
    message: SharedMessage,
    bus: Option<Arc<EventBus>>,
    shutdown: ShutdownSignal,
}

impl JobRun {
    async fn execute(self) -> JobReport {
        let total = self.nodes.len();
        self.publish(JobEvent::Started {
            job_id: self.id,
            mode: self.request.mode,
            nodes: total,
        });

        let mut processed = 0;
        let mut skipped = 0;
        let mut outcome: Result<(), OrientationError> = Ok(());

        for node in &self.nodes {
            if self.shutdown.is_triggered() {
                warn!(
                    "Job {} aborted by shutdown after {} of {} objects",
                    self.id, processed, total
                );
                outcome = Err(OrientationError::JobAborted { processed, total });
                break;
            }

            let Some(vertices) = node.transformed_vertices() else {
                warn!("Object {} has no mesh data, skipping", node.name());
                skipped += 1;
                continue;
            };

            let result = match self.optimize(node, vertices).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Job {}: {}", self.id, e);
                    outcome = Err(e);
                    break;
                }
            };

            node.rotate(&result.to_world_rotation(), TransformSpace::World);
            processed += 1;
            debug!(
                "Job {} oriented {}: axis {:?}, angle {:.2}°",
                self.id,
                node.name(),
                result.axis,
                result.angle.to_degrees()
            );
            self.publish(JobEvent::NodeOriented {
                job_id: self.id,
                node: node.id(),
            });

            tokio::task::yield_now().await;
        }

        let state = match &outcome {
            Ok(()) => {
                self.tracker.complete();
                JobState::Completed
            }
            Err(OrientationError::JobAborted { .. }) => JobState::Cancelled,
            Err(_) => JobState::Failed,
        };

        if let Err(e) = self.state.lock().transition(state) {
            warn!("Job {}: {}", self.id, e);
        }
        // Hide before the completion callback shows its own message
        if let Some(mut message) = self.message.lock().take() {
            message.hide();
        }

        info!(
            "Job {} {}: {} oriented, {} skipped, {} total",
            self.id, state, processed, skipped, total
        );
        self.publish(JobEvent::Finished {
            job_id: self.id,
            state,
            processed,
        });

        JobReport {
            job_id: self.id,
            mode: self.request.mode,
            state,
            total,
            processed,
            skipped,
            error: outcome.err(),
            finished_at: Utc::now(),
        }
    }

    async fn optimize(
        &self,
        node: &NodeRef,
        vertices: VertexSet,
    ) -> Result<OrientationResult, OrientationError> {
        let optimizer = self.optimizer.clone();
        let tracker = self.tracker.clone();
        let request = self.request;

        let joined = tokio::task::spawn_blocking(move || {
            optimizer.optimize(&vertices, &request, &|value| tracker.report(value))
        })
        .await;

        joined
            .unwrap_or_else(|e| Err(OptimizerError::Panicked(e.to_string())))
            .and_then(|result| result.validate().map(|()| result))
            .map_err(|e| OrientationError::OptimizerFailure {
                node: node.name(),
                reason: e.to_string(),
            })
    }

    fn publish(&self, event: JobEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Job(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::OrientationResult;
    use nalgebra::{Matrix4, Vector3};
    use orientkit_core::{
        MeshNode, MessageSpec, MessageTransition, NodeHandle, TracingStatusChannel,
    };
    use parking_lot::Mutex;

    fn block(name: &str) -> NodeRef {
        MeshNode::cuboid(name, Vector3::new(2.0, 1.0, 3.0)).into_ref()
    }

    fn stepping_optimizer() -> Arc<dyn Optimizer> {
        Arc::new(
            |_: &VertexSet, _: &OptimizeRequest, progress: &dyn Fn(f64)| -> Result<OrientationResult, OptimizerError> {
                for v in [0.0, 30.0, 20.0, 60.0, 100.0] {
                    progress(v);
                }
                Ok(OrientationResult::new(Vector3::y(), 0.25))
            },
        )
    }

    #[tokio::test]
    async fn test_single_node_progress_reaches_hundred_once() {
        let node = block("a");
        let job = OrientationJob::new(vec![node.clone()], OrientationMode::Fast, stepping_optimizer());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let report = job
            .start(move |v| sink.lock().push(v), |_| {})
            .unwrap()
            .await
            .unwrap();

        assert_eq!(report.state, JobState::Completed);
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(report.processed, 1);
        assert_eq!(*seen.lock(), vec![0.0, 30.0, 60.0, 100.0]);
        assert_ne!(node.local_transform(), Matrix4::identity());
    }

    #[tokio::test]
    async fn test_job_cannot_start_twice() {
        let job = OrientationJob::new(vec![block("a")], OrientationMode::Fast, stepping_optimizer());
        let handle = job.start(|_| {}, |_| {}).unwrap();
        assert!(matches!(
            job.start(|_| {}, |_| {}),
            Err(OrientationError::InvalidStateTransition { .. })
        ));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_cancels_before_next_node() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        let node = block("a");
        let job = OrientationJob::new(vec![node.clone()], OrientationMode::Extended, stepping_optimizer())
            .with_shutdown(shutdown);

        let report = job.start(|_| {}, |_| {}).unwrap().await.unwrap();
        assert_eq!(report.state, JobState::Cancelled);
        assert_eq!(
            report.error,
            Some(OrientationError::JobAborted {
                processed: 0,
                total: 1
            })
        );
        assert_eq!(node.local_transform(), Matrix4::identity());
    }

    #[tokio::test]
    async fn test_meshless_nodes_are_skipped() {
        let group = MeshNode::empty("group").into_ref();
        let job = OrientationJob::new(
            vec![group.clone(), block("a")],
            OrientationMode::Fast,
            stepping_optimizer(),
        );
        let report = job.start(|_| {}, |_| {}).unwrap().await.unwrap();
        assert!(report.is_success());
        assert_eq!((report.processed, report.skipped), (1, 1));
        assert_eq!(group.local_transform(), Matrix4::identity());
    }

    #[tokio::test]
    async fn test_message_hidden_before_completion_callback() {
        let channel = TracingStatusChannel::new();
        let guard = MessageGuard::show(&channel, MessageSpec::progress("t", "working"));
        let job = OrientationJob::new(vec![block("a")], OrientationMode::Fast, stepping_optimizer())
            .with_message(guard);

        let observer = channel.clone();
        let visible_at_completion = Arc::new(Mutex::new(None));
        let slot = visible_at_completion.clone();
        job.start(|_| {}, move |_| *slot.lock() = Some(observer.visible().len()))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(*visible_at_completion.lock(), Some(0));
        let hidden = channel
            .transitions()
            .iter()
            .filter(|t| matches!(t, MessageTransition::Hidden { .. }))
            .count();
        assert_eq!(hidden, 1);
        let last_progress = channel.transitions().iter().rev().find_map(|t| match t {
            MessageTransition::Progress { value, .. } => Some(*value),
            _ => None,
        });
        assert_eq!(last_progress, Some(100.0));
    }

    #[tokio::test]
    async fn test_panicking_optimizer_fails_the_job() {
        let optimizer: Arc<dyn Optimizer> = Arc::new(
            |_: &VertexSet, _: &OptimizeRequest, _: &dyn Fn(f64)| -> Result<OrientationResult, OptimizerError> {
                panic!("boom")
            },
        );
        let job = OrientationJob::new(vec![block("a")], OrientationMode::Fast, optimizer);
        let report = job.start(|_| {}, |_| {}).unwrap().await.unwrap();
        assert_eq!(report.state, JobState::Failed);
        assert!(matches!(
            report.error,
            Some(OrientationError::OptimizerFailure { .. })
        ));
    }

    #[test]
    fn test_start_outside_runtime_is_an_error() {
        let node = block("a");
        let job = OrientationJob::new(vec![node.clone()], OrientationMode::Fast, stepping_optimizer());
        assert!(matches!(
            job.start(|_| {}, |_| {}),
            Err(OrientationError::NoRuntime)
        ));
        assert_eq!(job.state(), JobState::Pending);
        assert_eq!(node.local_transform(), Matrix4::identity());
    }

    #[test]
    fn test_start_on_explicit_runtime_from_plain_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let job = OrientationJob::new(vec![block("a")], OrientationMode::Extended, stepping_optimizer());
        let handle = job.start_on(runtime.handle(), |_| {}, |_| {}).unwrap();
        let report = runtime.block_on(handle).unwrap();
        assert_eq!(report.state, JobState::Completed);
        assert_eq!(report.mode, OrientationMode::Extended);
    }

    #[tokio::test]
    async fn test_later_nodes_do_not_rewind_progress() {
        let job = OrientationJob::new(
            vec![block("a"), block("b")],
            OrientationMode::Fast,
            stepping_optimizer(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        job.start(move |v| sink.lock().push(v), |_| {})
            .unwrap()
            .await
            .unwrap();

        // the second node is silent until it catches up with the first
        assert_eq!(*seen.lock(), vec![0.0, 30.0, 60.0, 60.0, 100.0]);
    }
}
