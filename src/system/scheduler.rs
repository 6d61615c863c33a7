//! PipelineScheduler - the fixed-cadence detection loop.
//!
//! Each tick runs one full cycle on the scheduler thread:
//! 1. Pull the current frame (skip the tick if there is none)
//! 2. Detect the landmark region on every face
//! 3. Transform each region to view coordinates and localize it
//! 4. Hand the stabilized positions to the anchor owner and wait for it
//!
//! Cycles never overlap. A cycle slower than the cadence delays the next
//! one; ticks that elapse meanwhile are coalesced by the tick channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{tick, RecvTimeoutError, Sender};
use serde::Deserialize;
use tracing::{debug, info};

use crate::anchors::UpdateOutcome;
use crate::detection::DetectionStage;
use crate::geometry::transform_bounding_box;
use crate::localization::StabilizedLocalizer;
use crate::session::{ArSession, DisplayState};

use super::messages::{request, AnchorCommand, StabilizedPosition};
use super::shared_state::SharedState;

/// Timeout for waiting on the tick channel. Allows periodic shutdown checks.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Configuration for [`PipelineScheduler`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between detection cycles, in milliseconds.
    pub cadence_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { cadence_ms: 600 }
    }
}

impl SchedulerConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

/// Counters kept by the scheduler thread.
#[derive(Debug, Default, Clone)]
pub struct SchedulerStats {
    pub ticks: usize,
    pub frames_skipped: usize,
    pub detections: usize,
    pub localized: usize,
}

/// Summary of one detection cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Frame processed by the cycle; `None` if the tick was skipped.
    pub frame_timestamp_ns: Option<u64>,
    pub detections: usize,
    pub localized: usize,
    /// Registry outcomes, one per localized detection. Empty if the owner
    /// did not answer (shutdown).
    pub outcomes: Vec<UpdateOutcome>,
    pub duration: Duration,
}

/// Drives frame sampling, detection and localization.
pub struct PipelineScheduler {
    shared: Arc<SharedState>,
    session: Arc<dyn ArSession>,
    display: Arc<dyn DisplayState>,
    stage: DetectionStage,
    localizer: StabilizedLocalizer,
    anchor_name: String,
    commands: Sender<AnchorCommand>,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

impl PipelineScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shared: Arc<SharedState>,
        session: Arc<dyn ArSession>,
        display: Arc<dyn DisplayState>,
        stage: DetectionStage,
        localizer: StabilizedLocalizer,
        anchor_name: &str,
        commands: Sender<AnchorCommand>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            shared,
            session,
            display,
            stage,
            localizer,
            anchor_name: anchor_name.to_string(),
            commands,
            config,
            stats: SchedulerStats::default(),
        }
    }

    /// Main thread loop: one cycle per tick until shutdown is requested.
    pub fn run(&mut self) {
        info!(
            "Scheduler started (cadence {} ms, region {:?})",
            self.config.cadence_ms,
            self.stage.region()
        );
        let ticker = tick(self.config.cadence());

        loop {
            if self.shared.is_shutdown_requested() {
                break;
            }

            match ticker.recv_timeout(RECV_TIMEOUT) {
                Ok(_) => {
                    self.run_cycle();
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!(
            "Scheduler exiting. Stats: ticks={}, skipped={}, detections={}, localized={}",
            self.stats.ticks, self.stats.frames_skipped, self.stats.detections, self.stats.localized
        );
    }

    /// Run one detect → localize → update chain and wait for it to finish.
    pub fn run_cycle(&mut self) -> CycleReport {
        let t_start = Instant::now();
        self.stats.ticks += 1;

        let Some(frame) = self.session.current_frame() else {
            self.stats.frames_skipped += 1;
            debug!("No frame available, skipping tick");
            return CycleReport {
                duration: t_start.elapsed(),
                ..CycleReport::default()
            };
        };

        let detections = self.stage.detect(&frame);
        self.stats.detections += detections.len();

        let mut updates = Vec::with_capacity(detections.len());
        for detection in &detections {
            let view_rect = transform_bounding_box(
                &detection.region,
                self.display.orientation(),
                self.display.viewport(),
            );
            match self.localizer.localize(self.session.as_ref(), &view_rect) {
                Some(position) => updates.push(StabilizedPosition {
                    name: self.anchor_name.clone(),
                    position,
                    frame_timestamp_ns: detection.frame.timestamp_ns,
                }),
                None => debug!("No feature point found for frame {}", frame.timestamp_ns),
            }
        }
        self.stats.localized += updates.len();

        let mut report = CycleReport {
            frame_timestamp_ns: Some(frame.timestamp_ns),
            detections: detections.len(),
            localized: updates.len(),
            ..CycleReport::default()
        };

        if !updates.is_empty() {
            let observed_at = Instant::now();
            report.outcomes = request(&self.commands, &self.shared, |reply| AnchorCommand::Apply {
                updates,
                observed_at,
                reply,
            })
            .unwrap_or_default();
        }

        report.duration = t_start.elapsed();
        debug!(
            "Cycle for frame {}: {} detections, {} localized, {:?} in {:.1} ms",
            frame.timestamp_ns,
            report.detections,
            report.localized,
            report.outcomes,
            report.duration.as_secs_f64() * 1e3
        );
        report
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}
