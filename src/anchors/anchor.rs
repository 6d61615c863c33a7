//! TrackedAnchor - a named marker pinned to a world position.

use std::time::{Duration, Instant};

use nalgebra::Vector3;

use crate::scene::NodeHandle;

use super::types::AnchorId;

/// A named, positioned marker tracked across frames.
#[derive(Debug, Clone)]
pub struct TrackedAnchor {
    pub id: AnchorId,

    /// Feature kind this anchor follows, e.g. `"innerLips"`.
    pub name: String,

    /// Scene node displaying the anchor.
    pub node: NodeHandle,

    /// Current world position (mirrors the node's position).
    pub position: Vector3<f64>,

    /// Wall-clock time of the last match. Never moves backwards.
    pub last_updated: Instant,

    /// Timestamp of the frame that produced the last match.
    pub last_frame_timestamp_ns: u64,

    pub visible: bool,
}

impl TrackedAnchor {
    pub fn new(
        id: AnchorId,
        name: &str,
        node: NodeHandle,
        position: Vector3<f64>,
        frame_timestamp_ns: u64,
        now: Instant,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            node,
            position,
            last_updated: now,
            last_frame_timestamp_ns: frame_timestamp_ns,
            visible: true,
        }
    }

    /// Record a match from frame `frame_timestamp_ns` observed at `now`.
    pub fn touch(&mut self, frame_timestamp_ns: u64, now: Instant) {
        self.last_frame_timestamp_ns = frame_timestamp_ns;
        self.last_updated = self.last_updated.max(now);
    }

    /// Time since the last match, zero if `now` lies before it.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_updated)
    }

    /// Visible and not matched for longer than `timeout`.
    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        self.visible && self.age(now) > timeout
    }
}
