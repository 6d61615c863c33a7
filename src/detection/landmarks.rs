//! Face observations, landmark groups and the detector contract.

use std::collections::HashMap;

use anyhow::Result;
use nalgebra::Point2;
use serde::Deserialize;

use crate::geometry::Rect;
use crate::session::Frame;

/// Named landmark group of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkRegion {
    #[default]
    InnerLips,
    OuterLips,
    Nose,
    LeftEye,
    RightEye,
}

impl LandmarkRegion {
    /// Name given to anchors that track this region.
    pub fn anchor_name(self) -> &'static str {
        match self {
            Self::InnerLips => "innerLips",
            Self::OuterLips => "outerLips",
            Self::Nose => "nose",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
        }
    }
}

/// A detected face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    /// Face bounds in normalized image coordinates (bottom-left origin).
    pub bounding_box: Rect,
    pub confidence: f32,
}

/// Contour points of one landmark group, in normalized image coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkGroup {
    pub points: Vec<Point2<f64>>,
}

impl LandmarkGroup {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Minimal rect enclosing all points; `None` for an empty group.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(&self.points)
    }
}

/// Landmark groups found on one face. Any group may be missing.
#[derive(Debug, Clone, Default)]
pub struct FaceLandmarks {
    groups: HashMap<LandmarkRegion, LandmarkGroup>,
}

impl FaceLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, region: LandmarkRegion, group: LandmarkGroup) -> Self {
        self.groups.insert(region, group);
        self
    }

    pub fn insert(&mut self, region: LandmarkRegion, group: LandmarkGroup) {
        self.groups.insert(region, group);
    }

    pub fn get(&self, region: LandmarkRegion) -> Option<&LandmarkGroup> {
        self.groups.get(&region)
    }
}

/// 2D face and landmark detector.
///
/// Both calls are blocking and may be slow; the pipeline only invokes them
/// from its own worker thread.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in the frame's image.
    fn detect_faces(&self, frame: &Frame) -> Result<Vec<FaceObservation>>;

    /// Detect landmarks of a single face. `Ok(None)` when the detector found
    /// none for this face.
    fn detect_landmarks(&self, frame: &Frame, face: &FaceObservation) -> Result<Option<FaceLandmarks>>;
}
