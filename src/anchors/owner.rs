//! AnchorOwner - the single context allowed to mutate anchors and the scene.
//!
//! The scene graph is not thread-safe, and concurrent writers would corrupt
//! anchor timestamps. Every mutation is therefore sent here as an
//! [`AnchorCommand`] and applied in arrival order:
//! 1. `Apply`: match a cycle's stabilized positions against the registry
//! 2. `HideStale`: hide anchors that were not matched recently

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info};

use crate::scene::SceneGraph;
use crate::system::messages::{AnchorCommand, StabilizedPosition};
use crate::system::shared_state::SharedState;

use super::registry::UpdateOutcome;
use super::types::AnchorId;

/// Timeout for receiving commands. Allows periodic shutdown checks.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Counters kept by the owner thread.
#[derive(Debug, Default, Clone)]
pub struct OwnerStats {
    pub cycles_applied: usize,
    pub created: usize,
    pub moved: usize,
    pub held: usize,
    pub reappeared: usize,
    pub hidden: usize,
}

/// Owns the scene graph and is the only writer of the anchor registry.
pub struct AnchorOwner<S: SceneGraph> {
    scene: S,
    shared: Arc<SharedState>,
    stats: OwnerStats,
}

impl<S: SceneGraph> AnchorOwner<S> {
    pub fn new(scene: S, shared: Arc<SharedState>) -> Self {
        Self {
            scene,
            shared,
            stats: OwnerStats::default(),
        }
    }

    /// Main loop: apply commands until shutdown or until every sender is
    /// gone. Returns the scene graph so the caller can inspect or reuse it.
    pub fn run(mut self, receiver: Receiver<AnchorCommand>) -> S {
        info!("Anchor owner started");

        loop {
            if self.shared.is_shutdown_requested() {
                break;
            }

            match receiver.recv_timeout(RECV_TIMEOUT) {
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!(
            "Anchor owner exiting. Stats: cycles={}, created={}, moved={}, held={}, reappeared={}, hidden={}",
            self.stats.cycles_applied,
            self.stats.created,
            self.stats.moved,
            self.stats.held,
            self.stats.reappeared,
            self.stats.hidden
        );
        self.scene
    }

    /// Apply one command. Replies are best-effort: a requester that gave up
    /// waiting is not an error.
    pub fn handle(&mut self, cmd: AnchorCommand) {
        match cmd {
            AnchorCommand::Apply {
                updates,
                observed_at,
                reply,
            } => {
                let outcomes = self.apply(&updates, observed_at);
                let _ = reply.send(outcomes);
            }
            AnchorCommand::HideStale {
                now,
                stale_after,
                reply,
            } => {
                let hidden = self.hide_stale(now, stale_after);
                let _ = reply.send(hidden);
            }
        }
    }

    fn apply(&mut self, updates: &[StabilizedPosition], observed_at: Instant) -> Vec<UpdateOutcome> {
        self.stats.cycles_applied += 1;

        let mut registry = self.shared.anchors.write();
        let outcomes: Vec<UpdateOutcome> = updates
            .iter()
            .map(|u| {
                registry.update(
                    &mut self.scene,
                    &u.name,
                    u.position,
                    u.frame_timestamp_ns,
                    observed_at,
                )
            })
            .collect();

        for outcome in &outcomes {
            match outcome {
                UpdateOutcome::Created(_) => self.stats.created += 1,
                UpdateOutcome::Moved(_) => self.stats.moved += 1,
                UpdateOutcome::Held(_) => self.stats.held += 1,
                UpdateOutcome::Reappeared(_) => self.stats.reappeared += 1,
            }
        }
        debug!("Applied {} updates: {:?}", updates.len(), outcomes);
        outcomes
    }

    fn hide_stale(&mut self, now: Instant, stale_after: Duration) -> Vec<AnchorId> {
        let hidden = self
            .shared
            .anchors
            .write()
            .hide_stale(&mut self.scene, now, stale_after);
        self.stats.hidden += hidden.len();
        hidden
    }

    pub fn stats(&self) -> &OwnerStats {
        &self.stats
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }
}
