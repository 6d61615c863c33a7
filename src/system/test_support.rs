//! Scripted session and detector for pipeline tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::Result;
use nalgebra::{Point2, Vector3};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detection::{FaceDetector, FaceLandmarks, FaceObservation, LandmarkGroup, LandmarkRegion};
use crate::geometry::Rect;
use crate::session::{ArSession, Frame, FrameBuffer, HitResult, HitTestKind};

/// Per-axis jitter added to every hit position.
const JITTER: f64 = 0.004;

/// A face held still in front of the camera.
///
/// Every `current_frame` call yields a new frame 33 ms after the previous
/// one. Every hit test reports a near noise hit first, then the face at
/// `target` with a little jitter.
pub struct StableFace {
    target: Vector3<f64>,
    streaming: AtomicBool,
    face_present: AtomicBool,
    frames: AtomicU64,
    rng: Mutex<StdRng>,
}

impl StableFace {
    pub fn new(target: Vector3<f64>) -> Self {
        Self {
            target,
            streaming: AtomicBool::new(true),
            face_present: AtomicBool::new(true),
            frames: AtomicU64::new(0),
            rng: Mutex::new(StdRng::seed_from_u64(7)),
        }
    }

    pub fn set_streaming(&self, on: bool) {
        self.streaming.store(on, Ordering::SeqCst);
    }

    pub fn set_face_present(&self, on: bool) {
        self.face_present.store(on, Ordering::SeqCst);
    }
}

impl ArSession for StableFace {
    fn current_frame(&self) -> Option<Frame> {
        if !self.streaming.load(Ordering::SeqCst) {
            return None;
        }
        let n = self.frames.fetch_add(1, Ordering::SeqCst) + 1;
        Some(Frame::new(n * 33_000_000, FrameBuffer::default()))
    }

    fn hit_test(&self, _point: Point2<f64>, _kind: HitTestKind) -> Vec<HitResult> {
        let mut rng = self.rng.lock();
        let jitter = Vector3::new(
            rng.gen_range(-JITTER..JITTER),
            rng.gen_range(-JITTER..JITTER),
            rng.gen_range(-JITTER..JITTER),
        );
        let position = self.target + jitter;
        vec![
            HitResult::new(Vector3::new(0.0, 0.0, -0.03), 0.03),
            HitResult::new(position, position.norm()),
        ]
    }
}

impl FaceDetector for StableFace {
    fn detect_faces(&self, _frame: &Frame) -> Result<Vec<FaceObservation>> {
        if !self.face_present.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![FaceObservation {
            bounding_box: Rect::new(0.3, 0.15, 0.4, 0.5),
            confidence: 0.98,
        }])
    }

    fn detect_landmarks(&self, _frame: &Frame, _face: &FaceObservation) -> Result<Option<FaceLandmarks>> {
        Ok(Some(FaceLandmarks::new().with_group(
            LandmarkRegion::InnerLips,
            LandmarkGroup::new(vec![
                Point2::new(0.44, 0.27),
                Point2::new(0.50, 0.25),
                Point2::new(0.56, 0.27),
                Point2::new(0.50, 0.29),
            ]),
        )))
    }
}
