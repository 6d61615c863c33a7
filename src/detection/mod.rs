//! Detection stage: camera frame to landmark regions.
//!
//! The face and landmark detector is an external black box behind the
//! [`FaceDetector`] trait. [`DetectionStage`] turns its output into the
//! bounding rect of one landmark group per face.

pub mod landmarks;
mod stage;

pub use landmarks::{FaceDetector, FaceLandmarks, FaceObservation, LandmarkGroup, LandmarkRegion};
pub use stage::{Detection, DetectionStage};
