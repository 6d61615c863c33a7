//! Multi-sample ray casting.
//!
//! A single hit test against the live spatial map is noisy. The localizer
//! casts the same screen ray several times a few milliseconds apart, so the
//! session gets a chance to refine its map in between, and averages what it
//! found. No state survives between calls.

use std::thread;
use std::time::Duration;

use nalgebra::Vector3;
use serde::Deserialize;
use tracing::trace;

use crate::geometry::{centroid, Rect};
use crate::session::{ArSession, HitResult, HitTestKind};

/// Which of the remaining hits (after the near-hit filter) to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSelection {
    /// First remaining hit in the order the session reported them.
    #[default]
    FirstRemaining,
    /// Remaining hit with the smallest distance.
    Nearest,
}

/// Configuration for [`StabilizedLocalizer`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// Number of ray casts per localization.
    pub attempts: usize,

    /// Pause between consecutive ray casts, in milliseconds.
    pub attempt_delay_ms: u64,

    /// Hits at or below this distance are discarded. Very close hits are
    /// almost always noise on or near the device.
    pub min_hit_distance: f64,

    /// Selection among hits that survive the distance filter.
    pub hit_selection: HitSelection,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            attempt_delay_ms: 12,
            min_hit_distance: 0.10,
            hit_selection: HitSelection::FirstRemaining,
        }
    }
}

impl LocalizerConfig {
    pub fn attempt_delay(&self) -> Duration {
        Duration::from_millis(self.attempt_delay_ms)
    }
}

/// Resolves a view-space region to a stabilized world position.
pub struct StabilizedLocalizer {
    config: LocalizerConfig,
}

impl StabilizedLocalizer {
    pub fn new(config: LocalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    /// World position under the center of `view_rect`.
    ///
    /// Blocks for `(attempts - 1) * attempt_delay`. Returns `None` when no
    /// attempt produced a usable hit.
    pub fn localize(&self, session: &dyn ArSession, view_rect: &Rect) -> Option<Vector3<f64>> {
        let point = view_rect.center();
        let mut samples = Vec::with_capacity(self.config.attempts);

        for attempt in 0..self.config.attempts {
            if attempt > 0 {
                thread::sleep(self.config.attempt_delay());
            }
            let hits = session.hit_test(point, HitTestKind::FeaturePoint);
            match self.select_hit(&hits) {
                Some(hit) => samples.push(hit.world_position),
                None => trace!(
                    "Attempt {} at ({:.1}, {:.1}): no usable hit among {}",
                    attempt,
                    point.x,
                    point.y,
                    hits.len()
                ),
            }
        }

        centroid(&samples)
    }

    /// Pick one hit after dropping those too close to the camera.
    pub fn select_hit<'a>(&self, hits: &'a [HitResult]) -> Option<&'a HitResult> {
        let mut remaining = hits
            .iter()
            .filter(|h| h.distance > self.config.min_hit_distance);
        match self.config.hit_selection {
            HitSelection::FirstRemaining => remaining.next(),
            HitSelection::Nearest => remaining.min_by(|a, b| a.distance.total_cmp(&b.distance)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use nalgebra::Point2;
    use parking_lot::Mutex;

    use crate::session::Frame;

    /// Session that answers successive hit tests from a script.
    struct ScriptedHits {
        script: Mutex<VecDeque<Vec<HitResult>>>,
        points: Mutex<Vec<Point2<f64>>>,
    }

    impl ScriptedHits {
        fn new(script: Vec<Vec<HitResult>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                points: Mutex::new(Vec::new()),
            }
        }
    }

    impl ArSession for ScriptedHits {
        fn current_frame(&self) -> Option<Frame> {
            None
        }

        fn hit_test(&self, point: Point2<f64>, _kind: HitTestKind) -> Vec<HitResult> {
            self.points.lock().push(point);
            self.script.lock().pop_front().unwrap_or_default()
        }
    }

    fn fast_config() -> LocalizerConfig {
        LocalizerConfig {
            attempt_delay_ms: 0,
            ..LocalizerConfig::default()
        }
    }

    fn hit(x: f64, distance: f64) -> HitResult {
        HitResult::new(Vector3::new(x, 0.0, -distance), distance)
    }

    #[test]
    fn test_near_hits_discarded_and_samples_averaged() {
        let session = ScriptedHits::new(vec![
            vec![hit(9.0, 0.05), hit(1.0, 0.2)],
            vec![hit(3.0, 0.2)],
            vec![],
        ]);
        let localizer = StabilizedLocalizer::new(fast_config());

        let p = localizer
            .localize(&session, &Rect::new(100.0, 200.0, 40.0, 20.0))
            .unwrap();

        // mean of (1, 0, -0.2) and (3, 0, -0.2)
        assert!((p - Vector3::new(2.0, 0.0, -0.2)).norm() < 1e-12);
    }

    #[test]
    fn test_casts_exactly_three_rays_at_center() {
        let session = ScriptedHits::new(vec![]);
        let localizer = StabilizedLocalizer::new(fast_config());

        assert!(localizer
            .localize(&session, &Rect::new(100.0, 200.0, 40.0, 20.0))
            .is_none());

        let points = session.points.lock();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| *p == Point2::new(120.0, 210.0)));
    }

    #[test]
    fn test_only_near_hits_yields_none() {
        let session = ScriptedHits::new(vec![
            vec![hit(1.0, 0.05)],
            vec![hit(1.0, 0.10)],
            vec![hit(1.0, 0.01)],
        ]);
        let localizer = StabilizedLocalizer::new(fast_config());
        assert!(localizer.localize(&session, &Rect::new(0.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_first_remaining_keeps_report_order() {
        let localizer = StabilizedLocalizer::new(fast_config());
        let hits = [hit(0.0, 0.02), hit(1.0, 0.8), hit(2.0, 0.3)];
        assert_eq!(localizer.select_hit(&hits).unwrap().distance, 0.8);
    }

    #[test]
    fn test_nearest_selection() {
        let localizer = StabilizedLocalizer::new(LocalizerConfig {
            hit_selection: HitSelection::Nearest,
            ..fast_config()
        });
        let hits = [hit(0.0, 0.02), hit(1.0, 0.8), hit(2.0, 0.3)];
        assert_eq!(localizer.select_hit(&hits).unwrap().distance, 0.3);
    }

    #[test]
    fn test_attempt_delay_applied_between_casts() {
        let session = ScriptedHits::new(vec![]);
        let localizer = StabilizedLocalizer::new(LocalizerConfig {
            attempt_delay_ms: 10,
            ..LocalizerConfig::default()
        });

        let start = std::time::Instant::now();
        localizer.localize(&session, &Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
