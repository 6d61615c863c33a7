//! AnchorRegistry - the table of tracked anchors.
//!
//! Matching a new world position against the registry:
//! 1. Candidates are anchors with the same name that were not already
//!    matched by the same frame.
//! 2. Candidates are ordered by distance to the new position.
//! 3. No candidate: create a new visible anchor.
//! 4. Nearest visible candidate: move it if the position changed by at least
//!    the hysteresis distance, refresh its timestamps either way.
//! 5. Only hidden candidates: snap the nearest one to the new position and
//!    show it again.
//!
//! Anchors are never removed. The registry performs scene mutations through
//! the `SceneGraph` it is handed, so it must only be driven from the context
//! owning that scene graph.

use std::time::{Duration, Instant};

use nalgebra::Vector3;
use serde::Deserialize;
use tracing::debug;

use crate::geometry::distance;
use crate::scene::SceneGraph;

use super::anchor::TrackedAnchor;
use super::types::AnchorId;

/// Configuration for [`AnchorRegistry`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Minimum displacement before a visible anchor is moved.
    pub hysteresis_distance: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            hysteresis_distance: 0.03,
        }
    }
}

/// What an update did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new anchor was created.
    Created(AnchorId),
    /// A visible anchor was moved to the new position.
    Moved(AnchorId),
    /// A visible anchor matched but moved less than the hysteresis distance.
    Held(AnchorId),
    /// A hidden anchor was snapped to the new position and shown.
    Reappeared(AnchorId),
}

impl UpdateOutcome {
    pub fn anchor_id(&self) -> AnchorId {
        match *self {
            Self::Created(id) | Self::Moved(id) | Self::Held(id) | Self::Reappeared(id) => id,
        }
    }
}

/// All anchors of a tracking session.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: Vec<TrackedAnchor>,
    next_id: u64,
    config: RegistryConfig,
}

impl AnchorRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            anchors: Vec::new(),
            next_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn anchors(&self) -> &[TrackedAnchor] {
        &self.anchors
    }

    pub fn get(&self, id: AnchorId) -> Option<&TrackedAnchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn num_visible(&self) -> usize {
        self.anchors.iter().filter(|a| a.visible).count()
    }

    /// Match `position` (seen in frame `frame_timestamp_ns`) against the
    /// anchors named `name`, creating or updating one of them.
    pub fn update<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        name: &str,
        position: Vector3<f64>,
        frame_timestamp_ns: u64,
        now: Instant,
    ) -> UpdateOutcome {
        let mut candidates: Vec<(usize, f64)> = self
            .anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.name == name && a.last_frame_timestamp_ns != frame_timestamp_ns)
            .map(|(idx, a)| (idx, distance(&a.position, &position)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let Some(&(nearest, _)) = candidates.first() else {
            return self.create(scene, name, position, frame_timestamp_ns, now);
        };

        let visible = candidates
            .iter()
            .copied()
            .find(|&(idx, _)| self.anchors[idx].visible);

        match visible {
            Some((idx, dist)) => {
                let hysteresis = self.config.hysteresis_distance;
                let anchor = &mut self.anchors[idx];
                anchor.touch(frame_timestamp_ns, now);
                if dist >= hysteresis {
                    scene.move_to(anchor.node, position);
                    anchor.position = position;
                    debug!("Moved {} '{}' by {:.3}", anchor.id, name, dist);
                    UpdateOutcome::Moved(anchor.id)
                } else {
                    UpdateOutcome::Held(anchor.id)
                }
            }
            None => {
                let anchor = &mut self.anchors[nearest];
                scene.set_position(anchor.node, position);
                scene.show(anchor.node);
                anchor.position = position;
                anchor.visible = true;
                anchor.touch(frame_timestamp_ns, now);
                debug!("Reappeared {} '{}'", anchor.id, name);
                UpdateOutcome::Reappeared(anchor.id)
            }
        }
    }

    fn create<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        name: &str,
        position: Vector3<f64>,
        frame_timestamp_ns: u64,
        now: Instant,
    ) -> UpdateOutcome {
        let id = AnchorId::new(self.next_id);
        self.next_id += 1;

        let node = scene.create_node(name, position);
        scene.show(node);
        self.anchors.push(TrackedAnchor::new(
            id,
            name,
            node,
            position,
            frame_timestamp_ns,
            now,
        ));

        debug!(
            "Created {} '{}' at [{:.3}, {:.3}, {:.3}]",
            id, name, position.x, position.y, position.z
        );
        UpdateOutcome::Created(id)
    }

    /// Hide every visible anchor not matched for longer than `stale_after`.
    ///
    /// Returns the ids of the anchors hidden by this call.
    pub fn hide_stale<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        now: Instant,
        stale_after: Duration,
    ) -> Vec<AnchorId> {
        let mut hidden = Vec::new();
        for anchor in self.anchors.iter_mut().filter(|a| a.is_stale(now, stale_after)) {
            debug!(
                "Hide {} '{}' (not seen for {:.2}s)",
                anchor.id,
                anchor.name,
                anchor.age(now).as_secs_f64()
            );
            scene.hide(anchor.node);
            anchor.visible = false;
            hidden.push(anchor.id);
        }
        hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::LoggingScene;

    const LIPS: &str = "innerLips";

    fn registry() -> AnchorRegistry {
        AnchorRegistry::new(RegistryConfig::default())
    }

    fn origin() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -0.5)
    }

    #[test]
    fn test_first_update_creates_visible_anchor() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let now = Instant::now();

        let outcome = reg.update(&mut scene, LIPS, origin(), 1, now);

        let id = match outcome {
            UpdateOutcome::Created(id) => id,
            other => panic!("expected creation, got {:?}", other),
        };
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.num_visible(), 1);
        let anchor = reg.get(id).unwrap();
        assert_eq!(anchor.position, origin());
        assert_eq!(anchor.last_updated, now);
        assert!(scene.node(anchor.node).unwrap().visible);
    }

    #[test]
    fn test_hysteresis_holds_small_moves() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        let id = reg.update(&mut scene, LIPS, origin(), 1, t0).anchor_id();

        let t1 = t0 + Duration::from_millis(600);
        let near = origin() + Vector3::new(0.029, 0.0, 0.0);
        assert_eq!(reg.update(&mut scene, LIPS, near, 2, t1), UpdateOutcome::Held(id));

        let anchor = reg.get(id).unwrap();
        assert_eq!(anchor.position, origin());
        assert_eq!(anchor.last_updated, t1);
        assert_eq!(anchor.last_frame_timestamp_ns, 2);
        assert_eq!(scene.node(anchor.node).unwrap().moves, 0);
    }

    #[test]
    fn test_hysteresis_passes_larger_moves() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        let id = reg.update(&mut scene, LIPS, origin(), 1, t0).anchor_id();

        let t1 = t0 + Duration::from_millis(600);
        let far = origin() + Vector3::new(0.031, 0.0, 0.0);
        assert_eq!(reg.update(&mut scene, LIPS, far, 2, t1), UpdateOutcome::Moved(id));

        let anchor = reg.get(id).unwrap();
        assert_eq!(anchor.position, far);
        assert_eq!(anchor.last_updated, t1);
        assert_eq!(scene.node(anchor.node).unwrap().position, far);
    }

    #[test]
    fn test_same_frame_does_not_rematch() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        let first = reg.update(&mut scene, LIPS, origin(), 7, t0).anchor_id();

        let t1 = t0 + Duration::from_millis(5);
        let second = reg.update(&mut scene, LIPS, origin(), 7, t1);

        // The first anchor is excluded from matching for frame 7.
        assert_ne!(second.anchor_id(), first);
        assert!(matches!(second, UpdateOutcome::Created(_)));
        assert_eq!(reg.get(first).unwrap().last_updated, t0);

        // The next frame matches again instead of creating a third anchor.
        let third = reg.update(&mut scene, LIPS, origin(), 8, t1);
        assert!(matches!(third, UpdateOutcome::Held(_)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_hidden_anchor_is_reused() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        let id = reg.update(&mut scene, LIPS, origin(), 1, t0).anchor_id();

        let hidden = reg.hide_stale(&mut scene, t0 + Duration::from_secs(2), Duration::from_millis(1500));
        assert_eq!(hidden, vec![id]);
        assert_eq!(reg.num_visible(), 0);

        // Re-appearance snaps even below the hysteresis distance.
        let t1 = t0 + Duration::from_secs(3);
        let p = origin() + Vector3::new(0.01, 0.0, 0.0);
        assert_eq!(reg.update(&mut scene, LIPS, p, 2, t1), UpdateOutcome::Reappeared(id));

        assert_eq!(reg.len(), 1);
        let anchor = reg.get(id).unwrap();
        assert!(anchor.visible);
        assert_eq!(anchor.position, p);
        assert_eq!(anchor.last_updated, t1);
        let node = scene.node(anchor.node).unwrap();
        assert!(node.visible);
        assert_eq!(node.position, p);
    }

    #[test]
    fn test_visible_preferred_over_nearer_hidden() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();

        let a = reg.update(&mut scene, LIPS, origin(), 1, t0).anchor_id();
        let far = origin() + Vector3::new(1.0, 0.0, 0.0);
        let b = reg.update(&mut scene, LIPS, far, 1, t0).anchor_id();
        assert_ne!(a, b);

        // Keep b fresh, let a go stale.
        let t1 = t0 + Duration::from_secs(1);
        reg.update(&mut scene, LIPS, far, 2, t1);
        let hidden = reg.hide_stale(&mut scene, t0 + Duration::from_millis(1600), Duration::from_millis(1500));
        assert_eq!(hidden, vec![a]);

        // Position next to hidden `a`: the visible `b` still wins.
        let t2 = t0 + Duration::from_millis(1700);
        let outcome = reg.update(&mut scene, LIPS, origin(), 3, t2);
        assert_eq!(outcome, UpdateOutcome::Moved(b));
        assert!(!reg.get(a).unwrap().visible);
    }

    #[test]
    fn test_names_are_matched_separately() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();

        reg.update(&mut scene, LIPS, origin(), 1, t0);
        let nose = reg.update(&mut scene, "nose", origin(), 2, t0);
        assert!(matches!(nose, UpdateOutcome::Created(_)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_staleness_threshold() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        let old = reg.update(&mut scene, LIPS, origin(), 1, t0).anchor_id();
        let recent = reg
            .update(&mut scene, "nose", origin(), 1, t0 + Duration::from_millis(200))
            .anchor_id();

        // old: 1.6s since last update, recent: 1.4s
        let hidden = reg.hide_stale(&mut scene, t0 + Duration::from_millis(1600), Duration::from_millis(1500));

        assert_eq!(hidden, vec![old]);
        assert!(!reg.get(old).unwrap().visible);
        assert!(reg.get(recent).unwrap().visible);
        assert!(!scene.node(reg.get(old).unwrap().node).unwrap().visible);
    }

    #[test]
    fn test_sweep_ignores_hidden_anchors() {
        let mut scene = LoggingScene::new();
        let mut reg = registry();
        let t0 = Instant::now();
        reg.update(&mut scene, LIPS, origin(), 1, t0);

        let stale_after = Duration::from_millis(1500);
        assert_eq!(reg.hide_stale(&mut scene, t0 + Duration::from_secs(2), stale_after).len(), 1);
        assert!(reg.hide_stale(&mut scene, t0 + Duration::from_secs(3), stale_after).is_empty());
    }
}
