//! Oriented minimum-area bounding rectangle.
//!
//! Hosts may provide their own primitive through [`OrientedBounds2D`];
//! [`MinAreaRect`] is the built-in one.

use crate::hull::ConvexHull2D;
use nalgebra::{Matrix3, Point2, Rotation2, Vector2};
use orientkit_core::GeometryError;

/// Result of an oriented-bounds query
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedRect {
    /// Homogeneous 2D transform taking the input points into an
    /// origin-centred, axis-aligned rectangle.
    pub transform: Matrix3<f64>,
    /// Side lengths of the rectangle along x and y after `transform`.
    pub extents: Vector2<f64>,
}

impl OrientedRect {
    /// In-plane rotation angle contained in `transform`
    pub fn rotation_angle(&self) -> f64 {
        self.transform[(1, 0)].atan2(self.transform[(0, 0)])
    }

    pub fn area(&self) -> f64 {
        self.extents.x * self.extents.y
    }
}

/// Oriented-bounding-rectangle primitive
pub trait OrientedBounds2D: Send + Sync {
    fn oriented_bounds(&self, points: &[Point2<f64>]) -> Result<OrientedRect, GeometryError>;
}

/// Minimum-area rectangle by testing every hull edge direction
///
/// The optimal rectangle has one side collinear with a hull edge, so trying
/// each edge direction is exact. The longer side ends up along x.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinAreaRect;

impl OrientedBounds2D for MinAreaRect {
    fn oriented_bounds(&self, points: &[Point2<f64>]) -> Result<OrientedRect, GeometryError> {
        let hull = ConvexHull2D::from_points(points).map_err(|e| GeometryError::BoundsFailed {
            reason: e.to_string(),
        })?;

        let mut best: Option<(f64, f64, Point2<f64>, Vector2<f64>)> = None;
        for edge in hull.edges() {
            if edge.norm() == 0.0 {
                continue;
            }
            let angle = -edge.y.atan2(edge.x);
            let (min, max) = rotated_extent(hull.points(), angle);
            let size = max - min;
            let area = size.x * size.y;
            // strict comparison keeps the first edge on ties
            if best.as_ref().is_none_or(|(best_area, ..)| area < *best_area) {
                best = Some((area, angle, Point2::from((min.coords + max.coords) / 2.0), size));
            }
        }

        let (_, mut angle, mut center, mut size) = best.ok_or_else(|| GeometryError::BoundsFailed {
            reason: "hull has no usable edge".to_string(),
        })?;

        if size.y > size.x {
            let quarter = Rotation2::new(std::f64::consts::FRAC_PI_2);
            angle += std::f64::consts::FRAC_PI_2;
            center = quarter * center;
            size = Vector2::new(size.y, size.x);
        }

        // A half turn keeps the rectangle axis-aligned; prefer the smaller angle
        if angle > std::f64::consts::FRAC_PI_2 {
            angle -= std::f64::consts::PI;
            center = -center;
        } else if angle <= -std::f64::consts::FRAC_PI_2 {
            angle += std::f64::consts::PI;
            center = -center;
        }

        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let transform = Matrix3::new(
            c, -s, -center.x,
            s,  c, -center.y,
            0.0, 0.0, 1.0,
        );

        Ok(OrientedRect {
            transform,
            extents: size,
        })
    }
}

fn rotated_extent(points: &[Point2<f64>], angle: f64) -> (Point2<f64>, Point2<f64>) {
    let rotation = Rotation2::new(angle);
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        let r = rotation * p;
        min.x = min.x.min(r.x);
        min.y = min.y.min(r.y);
        max.x = max.x.max(r.x);
        max.y = max.y.max(r.y);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotated_rectangle(w: f64, h: f64, angle: f64, offset: Vector2<f64>) -> Vec<Point2<f64>> {
        let r = Rotation2::new(angle);
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
            .iter()
            .map(|&(x, y)| r * Point2::new(x, y) + offset)
            .collect()
    }

    fn apply(transform: &Matrix3<f64>, p: &Point2<f64>) -> Point2<f64> {
        transform.transform_point(p)
    }

    #[test]
    fn test_axis_aligned_rectangle_is_identity_rotation() {
        let pts = rotated_rectangle(4.0, 1.0, 0.0, Vector2::new(10.0, 5.0));
        let rect = MinAreaRect.oriented_bounds(&pts).unwrap();
        assert!(rect.rotation_angle().abs() < 1e-9);
        assert!((rect.extents - Vector2::new(4.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_rotated_rectangle_is_recovered() {
        let angle = 30f64.to_radians();
        let pts = rotated_rectangle(4.0, 1.0, angle, Vector2::new(-3.0, 7.0));
        let rect = MinAreaRect.oriented_bounds(&pts).unwrap();

        assert!((rect.area() - 4.0).abs() < 1e-9);
        assert!((rect.extents.x - 4.0).abs() < 1e-9);
        assert!((rect.rotation_angle() + angle).abs() < 1e-9);

        // Every transformed corner sits on the centred rectangle
        for p in &pts {
            let q = apply(&rect.transform, p);
            assert!((q.x.abs() - 2.0).abs() < 1e-9);
            assert!((q.y.abs() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tall_rectangle_puts_long_side_on_x() {
        let pts = rotated_rectangle(1.0, 5.0, 0.0, Vector2::zeros());
        let rect = MinAreaRect.oriented_bounds(&pts).unwrap();
        assert!((rect.extents - Vector2::new(5.0, 1.0)).norm() < 1e-9);
        assert!((rect.rotation_angle().abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_points_fail() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(matches!(
            MinAreaRect.oriented_bounds(&pts),
            Err(GeometryError::BoundsFailed { .. })
        ));
    }
}
