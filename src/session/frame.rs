//! Frames, hit-test results and the session/display contracts.

use std::sync::Arc;

use nalgebra::{Point2, Vector3};
use parking_lot::RwLock;

use crate::geometry::{DeviceOrientation, ViewportSize};

/// Raw pixels of a captured camera image.
///
/// The pipeline never inspects the pixels; they are handed to the face
/// detector untouched.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A captured camera frame.
///
/// Cloning is cheap: the image is shared.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture timestamp in nanoseconds, as reported by the session.
    /// Used to de-duplicate anchor updates coming from the same frame.
    pub timestamp_ns: u64,
    pub image: Arc<FrameBuffer>,
}

impl Frame {
    pub fn new(timestamp_ns: u64, image: FrameBuffer) -> Self {
        Self {
            timestamp_ns,
            image: Arc::new(image),
        }
    }
}

/// What a ray cast may hit in the spatial map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitTestKind {
    /// Sparse feature points of the tracked scene.
    #[default]
    FeaturePoint,
    /// Planes already detected by the session.
    ExistingPlane,
}

/// One intersection of a screen-space ray with the spatial map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Intersection point in world coordinates.
    pub world_position: Vector3<f64>,
    /// Distance from the camera to the intersection.
    pub distance: f64,
}

impl HitResult {
    pub fn new(world_position: Vector3<f64>, distance: f64) -> Self {
        Self {
            world_position,
            distance,
        }
    }
}

/// Live camera session with a continuously refined spatial map.
pub trait ArSession: Send + Sync {
    /// Most recent frame, if the session has produced one.
    fn current_frame(&self) -> Option<Frame>;

    /// Cast a ray through `point` (view coordinates).
    ///
    /// Hits are returned in the order the session reports them.
    fn hit_test(&self, point: Point2<f64>, kind: HitTestKind) -> Vec<HitResult>;
}

/// Current device orientation and viewport size.
pub trait DisplayState: Send + Sync {
    fn orientation(&self) -> DeviceOrientation;
    fn viewport(&self) -> ViewportSize;
}

/// Display state that changes only when told to.
pub struct FixedDisplay {
    state: RwLock<(DeviceOrientation, ViewportSize)>,
}

impl FixedDisplay {
    pub fn new(orientation: DeviceOrientation, viewport: ViewportSize) -> Self {
        Self {
            state: RwLock::new((orientation, viewport)),
        }
    }

    pub fn set_orientation(&self, orientation: DeviceOrientation) {
        self.state.write().0 = orientation;
    }
}

impl DisplayState for FixedDisplay {
    fn orientation(&self) -> DeviceOrientation {
        self.state.read().0
    }

    fn viewport(&self) -> ViewportSize {
        self.state.read().1
    }
}
