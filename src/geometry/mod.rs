//! Geometry utilities: view-space rect transform, world point averaging.

pub mod points;
pub mod rect;

pub use points::{centroid, distance};
pub use rect::{transform_bounding_box, DeviceOrientation, Rect, ViewportSize};
