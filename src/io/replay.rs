//! Recorded session playback.
//!
//! A recording is a CSV file with one row per camera frame:
//!
//! ```text
//! # timestamp_ns,lip_min_x,lip_min_y,lip_max_x,lip_max_y,hit_x,hit_y,hit_z,hit_distance
//! 0,0.44,0.25,0.56,0.29,0.05,-0.02,-0.45,0.453
//! 33333333,,,,,,,,
//! ```
//!
//! Lip columns hold the inner-lip bounds in normalized image coordinates and
//! are empty when no face was seen. Hit columns hold the feature point under
//! the lips and are empty when the ray cast found nothing; `hit_distance`
//! defaults to the distance of the hit from the origin. Lines starting with
//! `#` are ignored.
//!
//! [`ReplaySession`] plays the rows back in real time and acts as both the
//! camera session and the face detector.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use nalgebra::{Point2, Vector3};
use serde::Deserialize;

use crate::detection::{FaceDetector, FaceLandmarks, FaceObservation, LandmarkGroup, LandmarkRegion};
use crate::geometry::Rect;
use crate::session::{ArSession, Frame, FrameBuffer, HitResult, HitTestKind};

/// One recorded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub timestamp_ns: u64,
    /// Inner-lip bounds, normalized image coordinates.
    pub lips: Option<Rect>,
    /// Feature point under the lips.
    pub hit: Option<HitResult>,
}

#[derive(Debug, Deserialize)]
struct ReplayRow {
    timestamp_ns: u64,
    lip_min_x: Option<f64>,
    lip_min_y: Option<f64>,
    lip_max_x: Option<f64>,
    lip_max_y: Option<f64>,
    hit_x: Option<f64>,
    hit_y: Option<f64>,
    hit_z: Option<f64>,
    hit_distance: Option<f64>,
}

impl ReplayRow {
    fn into_frame(self) -> Result<ReplayFrame> {
        let lips = match (self.lip_min_x, self.lip_min_y, self.lip_max_x, self.lip_max_y) {
            (Some(x0), Some(y0), Some(x1), Some(y1)) => {
                if x1 < x0 || y1 < y0 {
                    bail!("Inverted lip bounds at {} ns", self.timestamp_ns);
                }
                Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
            }
            (None, None, None, None) => None,
            _ => bail!("Incomplete lip bounds at {} ns", self.timestamp_ns),
        };

        let hit = match (self.hit_x, self.hit_y, self.hit_z) {
            (Some(x), Some(y), Some(z)) => {
                let position = Vector3::new(x, y, z);
                Some(HitResult::new(position, self.hit_distance.unwrap_or_else(|| position.norm())))
            }
            (None, None, None) => None,
            _ => bail!("Incomplete hit position at {} ns", self.timestamp_ns),
        };

        Ok(ReplayFrame {
            timestamp_ns: self.timestamp_ns,
            lips,
            hit,
        })
    }
}

/// Parse a recording. Timestamps must be strictly increasing.
pub fn load_recording<R: Read>(reader: R) -> Result<Vec<ReplayFrame>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut frames: Vec<ReplayFrame> = Vec::new();
    for (line, row) in rdr.deserialize::<ReplayRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed recording row {}", line + 1))?;
        let frame = row.into_frame()?;
        if let Some(prev) = frames.last() {
            if frame.timestamp_ns <= prev.timestamp_ns {
                bail!(
                    "Timestamps not increasing: {} after {}",
                    frame.timestamp_ns,
                    prev.timestamp_ns
                );
            }
        }
        frames.push(frame);
    }

    if frames.is_empty() {
        bail!("Recording contains no frames");
    }
    Ok(frames)
}

/// Real-time playback of a recording.
pub struct ReplaySession {
    frames: Vec<ReplayFrame>,
    started: Instant,
}

impl ReplaySession {
    /// Start playback of `frames` now.
    pub fn new(frames: Vec<ReplayFrame>) -> Self {
        Self {
            frames,
            started: Instant::now(),
        }
    }

    /// Load a CSV recording and start playback.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let frames = load_recording(file).with_context(|| format!("Failed to load {:?}", path))?;
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Frame on screen `elapsed_ns` after playback start.
    ///
    /// `None` once playback has run past the last frame.
    pub fn frame_at(&self, elapsed_ns: u64) -> Option<&ReplayFrame> {
        let first = self.frames.first()?.timestamp_ns;
        let last = self.frames.last()?.timestamp_ns;
        let t = first.saturating_add(elapsed_ns);
        if t > last {
            return None;
        }
        let idx = self.frames.partition_point(|f| f.timestamp_ns <= t);
        self.frames.get(idx.checked_sub(1)?)
    }

    /// True once playback has run past the last frame.
    pub fn is_finished(&self) -> bool {
        self.frame_at(self.elapsed_ns()).is_none()
    }

    fn elapsed_ns(&self) -> u64 {
        self.started.elapsed().as_nanos().min(u64::MAX as u128) as u64
    }

    fn current(&self) -> Option<&ReplayFrame> {
        self.frame_at(self.elapsed_ns())
    }

    fn by_timestamp(&self, timestamp_ns: u64) -> Option<&ReplayFrame> {
        self.frames
            .binary_search_by_key(&timestamp_ns, |f| f.timestamp_ns)
            .ok()
            .map(|idx| &self.frames[idx])
    }
}

impl ArSession for ReplaySession {
    fn current_frame(&self) -> Option<Frame> {
        self.current()
            .map(|f| Frame::new(f.timestamp_ns, FrameBuffer::default()))
    }

    fn hit_test(&self, _point: Point2<f64>, _kind: HitTestKind) -> Vec<HitResult> {
        self.current().and_then(|f| f.hit).into_iter().collect()
    }
}

impl FaceDetector for ReplaySession {
    fn detect_faces(&self, frame: &Frame) -> Result<Vec<FaceObservation>> {
        let Some(recorded) = self.by_timestamp(frame.timestamp_ns) else {
            bail!("Frame {} is not part of the recording", frame.timestamp_ns);
        };
        Ok(recorded
            .lips
            .map(|lips| FaceObservation {
                bounding_box: lips,
                confidence: 1.0,
            })
            .into_iter()
            .collect())
    }

    fn detect_landmarks(&self, _frame: &Frame, face: &FaceObservation) -> Result<Option<FaceLandmarks>> {
        let r = face.bounding_box;
        let contour = vec![
            Point2::new(r.min_x(), r.mid_y()),
            Point2::new(r.mid_x(), r.min_y()),
            Point2::new(r.max_x(), r.mid_y()),
            Point2::new(r.mid_x(), r.max_y()),
        ];
        Ok(Some(
            FaceLandmarks::new().with_group(LandmarkRegion::InnerLips, LandmarkGroup::new(contour)),
        ))
    }
}
