//! World-space point helpers.

use nalgebra::Vector3;

/// Arithmetic mean of a set of positions, or `None` when the set is empty.
pub fn centroid(points: &[Vector3<f64>]) -> Option<Vector3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().sum();
    Some(sum / points.len() as f64)
}

/// Euclidean distance between two world positions.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid() {
        let pts = [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.5, 3.0, -1.0),
        ];
        let c = centroid(&pts).unwrap();
        assert!((c - Vector3::new(0.5, 1.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_centroid_empty() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_distance() {
        let d = distance(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(1.0, 2.0, 3.5));
        assert!((d - 0.5).abs() < 1e-12);
    }
}
