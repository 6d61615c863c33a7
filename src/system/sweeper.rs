//! StalenessSweeper - periodically hides anchors that stopped being matched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{tick, RecvTimeoutError, Sender};
use serde::Deserialize;
use tracing::{debug, info};

use crate::anchors::AnchorId;

use super::messages::{request, AnchorCommand};
use super::shared_state::SharedState;

/// Timeout for waiting on the tick channel. Allows periodic shutdown checks.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Configuration for [`StalenessSweeper`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Interval between sweeps, in milliseconds.
    pub cadence_ms: u64,

    /// Visible anchors not matched for longer than this are hidden.
    pub stale_after_ms: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            cadence_ms: 1000,
            stale_after_ms: 1500,
        }
    }
}

impl SweeperConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

/// Fixed-cadence maintenance scan over the anchor registry.
pub struct StalenessSweeper {
    shared: Arc<SharedState>,
    commands: Sender<AnchorCommand>,
    config: SweeperConfig,
    sweeps: usize,
    hidden: usize,
}

impl StalenessSweeper {
    pub fn new(shared: Arc<SharedState>, commands: Sender<AnchorCommand>, config: SweeperConfig) -> Self {
        Self {
            shared,
            commands,
            config,
            sweeps: 0,
            hidden: 0,
        }
    }

    pub fn run(&mut self) {
        info!(
            "Sweeper started (cadence {} ms, stale after {} ms)",
            self.config.cadence_ms, self.config.stale_after_ms
        );
        let ticker = tick(self.config.cadence());

        loop {
            if self.shared.is_shutdown_requested() {
                break;
            }

            match ticker.recv_timeout(RECV_TIMEOUT) {
                Ok(_) => {
                    self.sweep_once(Instant::now());
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("Sweeper exiting. Stats: sweeps={}, hidden={}", self.sweeps, self.hidden);
    }

    /// Ask the anchor owner to hide anchors stale at `now`.
    pub fn sweep_once(&mut self, now: Instant) -> Vec<AnchorId> {
        self.sweeps += 1;
        let stale_after = self.config.stale_after();
        let hidden = request(&self.commands, &self.shared, |reply| AnchorCommand::HideStale {
            now,
            stale_after,
            reply,
        })
        .unwrap_or_default();

        if !hidden.is_empty() {
            debug!("Sweep hid {:?}", hidden);
        }
        self.hidden += hidden.len();
        hidden
    }
}
