//! FaceTrackingSystem - main entry point and thread orchestration.
//!
//! The `FaceTrackingSystem` is the top-level struct that users interact
//! with. Starting it corresponds to running the camera session; it owns the
//! shared state and spawns three threads:
//! - the pipeline scheduler (detection cycles)
//! - the staleness sweeper
//! - the anchor owner (sole user of the scene graph)
//!
//! Stopping it (or dropping it) tears all of them down.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;
use tracing::{info, warn};

use crate::anchors::{AnchorOwner, TrackedAnchor};
use crate::config::TrackerConfig;
use crate::detection::{DetectionStage, FaceDetector};
use crate::localization::StabilizedLocalizer;
use crate::scene::SceneGraph;
use crate::session::{ArSession, DisplayState, TrackingAdvisory, TrackingState};

use super::scheduler::PipelineScheduler;
use super::shared_state::SharedState;
use super::sweeper::StalenessSweeper;

/// External services the pipeline consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub session: Arc<dyn ArSession>,
    pub detector: Arc<dyn FaceDetector>,
    pub display: Arc<dyn DisplayState>,
}

/// A running face tracking session.
pub struct FaceTrackingSystem<S: SceneGraph + 'static> {
    /// Shared state (anchors, flags) accessible by all threads.
    shared: Arc<SharedState>,

    config: TrackerConfig,

    scheduler_handle: Option<JoinHandle<()>>,
    sweeper_handle: Option<JoinHandle<()>>,

    /// Returns the scene graph when the owner exits.
    owner_handle: Option<JoinHandle<S>>,
}

impl<S: SceneGraph + 'static> FaceTrackingSystem<S> {
    /// Validate the configuration and start all pipeline threads.
    ///
    /// `scene` moves to the anchor owner thread and is returned by
    /// [`stop`](Self::stop).
    pub fn start(config: TrackerConfig, collaborators: Collaborators, scene: S) -> Result<Self> {
        config.validate()?;

        let shared = SharedState::new(config.registry.clone());
        let (cmd_tx, cmd_rx) = unbounded();

        let mut system = Self {
            shared: shared.clone(),
            config: config.clone(),
            scheduler_handle: None,
            sweeper_handle: None,
            owner_handle: None,
        };

        let owner = AnchorOwner::new(scene, shared.clone());
        system.owner_handle = Some(
            thread::Builder::new()
                .name("anchor-owner".into())
                .spawn(move || owner.run(cmd_rx))
                .context("Failed to spawn anchor owner thread")?,
        );

        let mut scheduler = PipelineScheduler::new(
            shared.clone(),
            collaborators.session,
            collaborators.display,
            DetectionStage::new(collaborators.detector, config.region),
            StabilizedLocalizer::new(config.localizer.clone()),
            config.anchor_name(),
            cmd_tx.clone(),
            config.scheduler.clone(),
        );
        system.scheduler_handle = Some(
            thread::Builder::new()
                .name("pipeline-scheduler".into())
                .spawn(move || scheduler.run())
                .context("Failed to spawn scheduler thread")?,
        );

        let mut sweeper = StalenessSweeper::new(shared, cmd_tx, config.sweeper.clone());
        system.sweeper_handle = Some(
            thread::Builder::new()
                .name("staleness-sweeper".into())
                .spawn(move || sweeper.run())
                .context("Failed to spawn sweeper thread")?,
        );

        info!("Face tracking started for '{}'", config.anchor_name());
        Ok(system)
    }

    /// Get a reference to the shared state.
    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Snapshot of all anchors.
    pub fn anchors(&self) -> Vec<TrackedAnchor> {
        self.shared.anchor_snapshot()
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.shared.tracking_state()
    }

    /// Tracking-state callback for the camera session.
    ///
    /// Records the state and returns the advisory to show. Never blocks the
    /// pipeline and never changes anchor state.
    pub fn on_tracking_state_changed(&self, state: TrackingState) -> TrackingAdvisory {
        let previous = self.shared.set_tracking_state(state);
        match state {
            TrackingState::NotAvailable => warn!("Tracking not available"),
            _ if previous != state => info!("Tracking state: {:?} -> {:?}", previous, state),
            _ => {}
        }
        state.advisory()
    }

    /// Stop the session: signal shutdown and join every thread.
    ///
    /// In-flight work is discarded. Returns the scene graph on the first
    /// call, `None` afterwards.
    pub fn stop(&mut self) -> Option<S> {
        self.shared.request_shutdown();

        for (name, handle) in [
            ("scheduler", self.scheduler_handle.take()),
            ("sweeper", self.sweeper_handle.take()),
        ] {
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    warn!("{} thread panicked", name);
                }
            }
        }

        let scene = match self.owner_handle.take()?.join() {
            Ok(scene) => Some(scene),
            Err(_) => {
                warn!("anchor owner thread panicked");
                None
            }
        };
        info!("Face tracking stopped");
        scene
    }
}

impl<S: SceneGraph + 'static> Drop for FaceTrackingSystem<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
