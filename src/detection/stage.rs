//! Per-frame detection: faces, then one landmark group per face.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::geometry::Rect;
use crate::session::Frame;

use super::landmarks::{FaceDetector, LandmarkRegion};

/// Landmark region found in one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding rect of the landmark group, normalized image coordinates.
    pub region: Rect,
    /// Frame the region was detected in.
    pub frame: Frame,
}

/// Runs the face detector and extracts the bounding rect of one landmark
/// group per face.
pub struct DetectionStage {
    detector: Arc<dyn FaceDetector>,
    region: LandmarkRegion,
}

impl DetectionStage {
    pub fn new(detector: Arc<dyn FaceDetector>, region: LandmarkRegion) -> Self {
        Self { detector, region }
    }

    pub fn region(&self) -> LandmarkRegion {
        self.region
    }

    /// Detect the configured landmark region on every face in `frame`.
    ///
    /// Never fails: detector errors are logged and treated as "nothing
    /// found". Faces without the landmark group are skipped.
    pub fn detect(&self, frame: &Frame) -> Vec<Detection> {
        let faces = match self.detector.detect_faces(frame) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Face detection failed on frame {}: {:#}", frame.timestamp_ns, e);
                return Vec::new();
            }
        };

        if faces.is_empty() {
            trace!("No faces in frame {}", frame.timestamp_ns);
            return Vec::new();
        }

        let mut detections = Vec::with_capacity(faces.len());
        for face in &faces {
            let landmarks = match self.detector.detect_landmarks(frame, face) {
                Ok(Some(lm)) => lm,
                Ok(None) => {
                    trace!("Face without landmarks in frame {}", frame.timestamp_ns);
                    continue;
                }
                Err(e) => {
                    warn!("Landmark detection failed on frame {}: {:#}", frame.timestamp_ns, e);
                    continue;
                }
            };

            let Some(region) = landmarks.get(self.region).and_then(|g| g.bounding_rect()) else {
                trace!("Face without {:?} in frame {}", self.region, frame.timestamp_ns);
                continue;
            };

            detections.push(Detection {
                region,
                frame: frame.clone(),
            });
        }

        debug!(
            "Frame {}: {} faces, {} {:?} regions",
            frame.timestamp_ns,
            faces.len(),
            detections.len(),
            self.region
        );
        detections
    }
}
