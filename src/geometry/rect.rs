//! Screen-space rectangles and the orientation-aware bounding box transform.
//!
//! Detector output lives in normalized image coordinates: `[0, 1]` on both
//! axes with the origin at the bottom-left. View coordinates are points with
//! the origin at the top-left of the viewport. Which image axis maps onto
//! which view axis depends on how the device is held.

use nalgebra::Point2;

/// Axis-aligned rectangle given by its origin (minimum corner) and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing every point.
    ///
    /// Returns `None` for an empty point set.
    pub fn bounding(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width * 0.5
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height * 0.5
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.mid_x(), self.mid_y())
    }
}

/// Size of the view the camera image is displayed in, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Physical orientation of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceOrientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

impl DeviceOrientation {
    /// True when the long side of the screen is horizontal.
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

/// Map a normalized image-space bounding box into view coordinates.
///
/// Landscape orientations swap the width/height scale factors. The origin
/// formula differs per orientation; every branch except landscape-left flips
/// one image axis (`1 - max`) because image coordinates grow upwards while
/// view coordinates grow downwards. Face-up, face-down and unknown share the
/// portrait mapping.
pub fn transform_bounding_box(
    bbox: &Rect,
    orientation: DeviceOrientation,
    viewport: ViewportSize,
) -> Rect {
    let (w, h) = (viewport.width, viewport.height);

    let (width, height) = if orientation.is_landscape() {
        (bbox.width * h, bbox.height * w)
    } else {
        (bbox.width * w, bbox.height * h)
    };

    let (x, y) = match orientation {
        DeviceOrientation::LandscapeLeft => (bbox.min_y() * w, bbox.min_x() * h),
        DeviceOrientation::LandscapeRight => ((1.0 - bbox.max_y()) * w, (1.0 - bbox.max_x()) * h),
        DeviceOrientation::PortraitUpsideDown => ((1.0 - bbox.max_x()) * w, bbox.min_y() * h),
        _ => (bbox.min_x() * w, (1.0 - bbox.max_y()) * h),
    };

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn lips() -> Rect {
        // minX 0.4, minY 0.2, maxX 0.6, maxY 0.3
        Rect::new(0.4, 0.2, 0.2, 0.1)
    }

    fn viewport() -> ViewportSize {
        ViewportSize::new(375.0, 812.0)
    }

    fn assert_rect_eq(actual: Rect, expected: Rect) {
        assert!((actual.x - expected.x).abs() < EPS, "x: {:?} vs {:?}", actual, expected);
        assert!((actual.y - expected.y).abs() < EPS, "y: {:?} vs {:?}", actual, expected);
        assert!((actual.width - expected.width).abs() < EPS, "w: {:?} vs {:?}", actual, expected);
        assert!((actual.height - expected.height).abs() < EPS, "h: {:?} vs {:?}", actual, expected);
    }

    #[test]
    fn test_portrait_transform() {
        let r = transform_bounding_box(&lips(), DeviceOrientation::Portrait, viewport());
        assert_rect_eq(r, Rect::new(0.4 * 375.0, (1.0 - 0.3) * 812.0, 0.2 * 375.0, 0.1 * 812.0));
    }

    #[test]
    fn test_landscape_left_transform() {
        let r = transform_bounding_box(&lips(), DeviceOrientation::LandscapeLeft, viewport());
        assert_rect_eq(r, Rect::new(0.2 * 375.0, 0.4 * 812.0, 0.2 * 812.0, 0.1 * 375.0));
    }

    #[test]
    fn test_landscape_right_transform() {
        let r = transform_bounding_box(&lips(), DeviceOrientation::LandscapeRight, viewport());
        assert_rect_eq(
            r,
            Rect::new((1.0 - 0.3) * 375.0, (1.0 - 0.6) * 812.0, 0.2 * 812.0, 0.1 * 375.0),
        );
    }

    #[test]
    fn test_upside_down_transform() {
        let r = transform_bounding_box(&lips(), DeviceOrientation::PortraitUpsideDown, viewport());
        assert_rect_eq(r, Rect::new((1.0 - 0.6) * 375.0, 0.2 * 812.0, 0.2 * 375.0, 0.1 * 812.0));
    }

    #[test]
    fn test_flat_orientations_use_portrait_mapping() {
        let portrait = transform_bounding_box(&lips(), DeviceOrientation::Portrait, viewport());
        for o in [
            DeviceOrientation::FaceUp,
            DeviceOrientation::FaceDown,
            DeviceOrientation::Unknown,
        ] {
            assert_rect_eq(transform_bounding_box(&lips(), o, viewport()), portrait);
        }
    }

    #[test]
    fn test_bounding_rect() {
        let pts = [
            Point2::new(0.45, 0.25),
            Point2::new(0.4, 0.3),
            Point2::new(0.6, 0.2),
            Point2::new(0.5, 0.22),
        ];
        assert_rect_eq(Rect::bounding(&pts).unwrap(), lips());
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_center() {
        let c = Rect::new(10.0, 20.0, 30.0, 40.0).center();
        assert_eq!(c, Point2::new(25.0, 40.0));
    }
}
