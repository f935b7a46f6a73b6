use std::sync::Arc;

use nalgebra::{Matrix4, Rotation3, Vector3};
use orientkit::{
    init_logging_with, AppEvent, AutoOrientWatcher, EventBus, MeshNode, NodeHandle,
    OrientationCommands, OrientationResult, SceneEvent, SettingsStore, TracingStatusChannel,
    BUILD_DATE, VERSION,
};
use orientkit_core::VertexSet;
use orientkit_orient::{OptimizeRequest, OptimizerError};
use orientkit_settings::default_config_path;
use tracing::info;

/// Stand-in optimizer: tips every object onto its side
fn tip_over(
    _vertices: &VertexSet,
    request: &OptimizeRequest,
    progress: &dyn Fn(f64),
) -> Result<OrientationResult, OptimizerError> {
    let steps = match request.mode {
        orientkit::OrientationMode::Fast => 2,
        orientkit::OrientationMode::Extended => 5,
    };
    for step in 1..=steps {
        progress(100.0 * step as f64 / steps as f64);
    }
    Ok(OrientationResult::new(
        Vector3::x(),
        std::f64::consts::FRAC_PI_2,
    ))
}

fn turned_plate(name: &str, degrees: f64) -> MeshNode {
    let turn = Rotation3::from_axis_angle(&Vector3::y_axis(), degrees.to_radians());
    MeshNode::cuboid(name, Vector3::new(40.0, 3.0, 15.0))
        .with_transform(Matrix4::new_translation(&Vector3::new(0.0, 1.5, 0.0)) * turn.to_homogeneous())
}

fn yaw_degrees(node: &dyn NodeHandle) -> f64 {
    let m = node.local_transform();
    (-m[(2, 0)]).atan2(m[(0, 0)]).to_degrees()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match default_config_path() {
        Ok(path) => SettingsStore::open(path)?,
        Err(_) => SettingsStore::default(),
    };
    init_logging_with(&settings.snapshot().logging)?;
    info!("OrientKit {} (built {})", VERSION, BUILD_DATE);

    let bus = Arc::new(EventBus::new());
    let settings = Arc::new(settings.with_event_bus(bus.clone()));
    let channel = TracingStatusChannel::new();
    let optimizer = Arc::new(tip_over);

    let commands = OrientationCommands::new(
        optimizer.clone(),
        Arc::new(channel.clone()),
        settings.clone(),
    )
    .with_event_bus(bus.clone());

    // silhouette alignment
    let plates = vec![
        turned_plate("plate-a", 27.0).into_ref(),
        turned_plate("plate-b", -61.0).into_ref(),
    ];
    let summary = commands.trigger_side_axis_align(&plates)?;
    info!("Side alignment: {} aligned, {} skipped", summary.aligned, summary.skipped);
    for plate in &plates {
        info!("{} now at {:.2} degrees", plate.name(), yaw_degrees(&**plate));
    }

    commands.undo();
    commands.trigger_main_axis_align(&plates)?;
    commands.reset_orientation(&plates)?;

    // background job
    let report = commands.trigger_fast_orientation(&plates)?.await?;
    info!(
        "Fast orientation {} after {} of {} objects",
        report.state, report.processed, report.total
    );

    // auto-orient on load
    settings.set_auto_orient_enabled(true);
    let watcher = AutoOrientWatcher::builder(settings.clone(), optimizer, Arc::new(channel.clone()))
        .event_bus(bus.clone())
        .build();
    watcher.attach(&bus);

    let loaded = MeshNode::cuboid("bracket", Vector3::new(10.0, 20.0, 5.0))
        .with_source_file("bracket.stl")
        .into_ref();
    bus.publish(AppEvent::Scene(SceneEvent::FileLoadStarted {
        file: "bracket.stl".to_string(),
    }));
    bus.publish(AppEvent::Scene(SceneEvent::NodeChanged { node: loaded.clone() }));
    bus.publish(AppEvent::Scene(SceneEvent::NodeChanged { node: loaded }));
    bus.publish(AppEvent::Scene(SceneEvent::FileLoadCompleted {
        file: "bracket.stl".to_string(),
    }));

    for report in watcher.flush().await {
        info!("Auto-orient job {} {}", report.job_id, report.state);
    }
    for message in channel.visible() {
        info!("[{:?}] {}: {}", message.level, message.title, message.text);
    }

    Ok(())
}
