use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use face_anchor::config::TrackerConfig;
use face_anchor::geometry::{DeviceOrientation, ViewportSize};
use face_anchor::io::ReplaySession;
use face_anchor::scene::LoggingScene;
use face_anchor::session::{FixedDisplay, LimitedReason, TrackingState};
use face_anchor::system::{Collaborators, FaceTrackingSystem};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let recording_path = args
        .next()
        .unwrap_or_else(|| "data/sample_session.csv".to_string());
    let config = match args.next() {
        Some(path) => TrackerConfig::from_yaml_file(&path)?,
        None => TrackerConfig::default(),
    };

    println!("Loading recording from: {}", recording_path);
    let replay = Arc::new(ReplaySession::from_csv(&recording_path)?);
    println!(
        "Loaded {} frames, tracking '{}' every {} ms",
        replay.len(),
        config.anchor_name(),
        config.scheduler.cadence_ms
    );

    let display = Arc::new(FixedDisplay::new(
        DeviceOrientation::Portrait,
        ViewportSize::new(375.0, 812.0),
    ));
    let collaborators = Collaborators {
        session: replay.clone(),
        detector: replay.clone(),
        display,
    };

    let stale_window = config.sweeper.stale_after() + config.sweeper.cadence();
    let mut system = FaceTrackingSystem::start(config, collaborators, LoggingScene::new())?;
    system.on_tracking_state_changed(TrackingState::Limited(LimitedReason::Initializing));
    system.on_tracking_state_changed(TrackingState::Normal);

    while !replay.is_finished() {
        thread::sleep(Duration::from_millis(100));
    }
    // Let the sweeper hide whatever was still visible at the end.
    thread::sleep(stale_window);

    let anchors = system.anchors();
    let scene = system.stop();

    println!("Done! {} anchors:", anchors.len());
    for anchor in &anchors {
        println!(
            "  {} '{}' node={} at [{:.3}, {:.3}, {:.3}] visible={} last frame={} ns",
            anchor.id,
            anchor.name,
            anchor.node,
            anchor.position.x,
            anchor.position.y,
            anchor.position.z,
            anchor.visible,
            anchor.last_frame_timestamp_ns
        );
    }
    if let Some(scene) = scene {
        println!(
            "Scene: {} nodes, {} visible",
            scene.num_nodes(),
            scene.num_visible()
        );
    }

    Ok(())
}
