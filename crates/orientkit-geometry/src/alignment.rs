//! # Alignment Engine
//!
//! Pure functions that turn a silhouette hull into a rotation about the
//! world up axis, and compose that rotation with a node's local transform.
//!
//! Two modes are supported:
//! - **Side alignment**: the longest hull edge is turned onto the reference
//!   axis (+X by default).
//! - **Main alignment**: the minimum-area bounding rectangle is turned so
//!   its long side lies on X.
//!
//! Hull coordinates are build-plate coordinates: hull `x` is world X, hull
//! `y` is world Z. The up axis is world +Y.

use crate::bounds::OrientedBounds2D;
use crate::hull::ConvexHull2D;
use nalgebra::{Matrix4, Rotation3, Translation3, Unit, UnitQuaternion, Vector2, Vector3};
use orientkit_core::GeometryError;
use tracing::debug;

/// Longest edge of a hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongestEdge {
    /// Index of the edge's starting point.
    pub index: usize,
    pub vector: Vector2<f64>,
    pub length: f64,
}

/// Rotation as axis plus signed angle
///
/// Invariant: the axis is a unit vector, so it is never degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationDescriptor {
    pub axis: Unit<Vector3<f64>>,
    /// Signed angle in radians.
    pub angle: f64,
}

impl RotationDescriptor {
    /// Build from a raw axis
    ///
    /// A zero axis is only accepted together with a zero angle, which yields
    /// the identity.
    pub fn new(axis: Vector3<f64>, angle: f64) -> Result<Self, GeometryError> {
        match Unit::try_new(axis, f64::EPSILON) {
            Some(axis) => Ok(Self { axis, angle }),
            None if angle == 0.0 => Ok(Self::identity()),
            None => Err(GeometryError::ZeroVector),
        }
    }

    /// Rotation about the world up axis (+Y)
    pub fn about_up(angle: f64) -> Self {
        Self {
            axis: Vector3::y_axis(),
            angle,
        }
    }

    pub fn identity() -> Self {
        Self::about_up(0.0)
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.angle.abs() <= epsilon
    }

    pub fn to_rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&self.axis, self.angle)
    }

    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&self.axis, self.angle)
    }

    /// 4x4 homogeneous rotation matrix
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.to_rotation().to_homogeneous()
    }
}

/// Axes used by side alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentAxes {
    /// Hull-plane axis the longest edge is turned onto.
    pub reference: Vector2<f64>,
    /// Hull-plane axis deciding the turn direction.
    pub vertical: Vector2<f64>,
}

impl Default for AlignmentAxes {
    fn default() -> Self {
        Self {
            reference: Vector2::x(),
            vertical: Vector2::y(),
        }
    }
}

/// Longest edge, including the closing edge from the last point to the first
///
/// Ties keep the lowest starting index.
pub fn longest_edge(hull: &ConvexHull2D) -> Result<LongestEdge, GeometryError> {
    if hull.len() < 3 {
        return Err(GeometryError::DegenerateHull {
            points: hull.len(),
            longest: 0.0,
        });
    }

    let mut best = LongestEdge {
        index: 0,
        vector: Vector2::zeros(),
        length: 0.0,
    };
    for (index, vector) in hull.edges().enumerate() {
        let length = vector.norm();
        if length > best.length {
            best = LongestEdge {
                index,
                vector,
                length,
            };
        }
    }

    if best.length == 0.0 {
        return Err(GeometryError::DegenerateHull {
            points: hull.len(),
            longest: 0.0,
        });
    }
    Ok(best)
}

/// Unsigned angle between two vectors, in `[0, π]`
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> Result<f64, GeometryError> {
    let u1 = v1.try_normalize(0.0).ok_or(GeometryError::ZeroVector)?;
    let u2 = v2.try_normalize(0.0).ok_or(GeometryError::ZeroVector)?;
    Ok(u1.dot(&u2).clamp(-1.0, 1.0).acos())
}

/// `+1.0` when `edge` points along `axis`, otherwise `-1.0`
///
/// A perpendicular edge (zero dot product) resolves to `-1.0`.
pub fn sign_of(axis: &Vector2<f64>, edge: &Vector2<f64>) -> f64 {
    if axis.dot(edge) > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Rotation turning the longest hull edge onto +X
pub fn build_side_alignment(hull: &ConvexHull2D) -> Result<RotationDescriptor, GeometryError> {
    build_side_alignment_with(hull, &AlignmentAxes::default())
}

/// Rotation turning the longest hull edge onto `axes.reference`
pub fn build_side_alignment_with(
    hull: &ConvexHull2D,
    axes: &AlignmentAxes,
) -> Result<RotationDescriptor, GeometryError> {
    let edge = longest_edge(hull)?;
    let angle = angle_between(&axes.reference, &edge.vector)?;
    let direction = sign_of(&axes.vertical, &edge.vector);

    debug!(
        "Longest edge #{} {:?} length {:.3}, angle {:.2}°, direction {}",
        edge.index,
        edge.vector,
        edge.length,
        angle.to_degrees(),
        direction
    );

    Ok(RotationDescriptor::about_up(direction * angle))
}

/// Rotation that squares the minimum-area bounding rectangle with X/Z
pub fn build_main_alignment(
    hull: &ConvexHull2D,
    bounds: &dyn OrientedBounds2D,
) -> Result<RotationDescriptor, GeometryError> {
    let rect = bounds.oriented_bounds(hull.points())?;
    let in_plane = rect.rotation_angle();

    debug!(
        "Oriented bounds {:.3} x {:.3}, in-plane angle {:.2}°",
        rect.extents.x,
        rect.extents.y,
        in_plane.to_degrees()
    );

    // A counter-clockwise turn in hull (x, z) coordinates is a clockwise
    // turn about +Y.
    Ok(RotationDescriptor::about_up(-in_plane))
}

/// `rotation * existing`: the rotation is applied in the node's current frame
pub fn compose_with_local(rotation: &RotationDescriptor, existing: &Matrix4<f64>) -> Matrix4<f64> {
    rotation.to_homogeneous() * existing
}

/// Strip rotation from a local transform, keeping translation and scale
pub fn reset_rotation(existing: &Matrix4<f64>) -> Matrix4<f64> {
    let linear = existing.fixed_view::<3, 3>(0, 0);
    let scale = Vector3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    );
    let translation = Translation3::new(existing[(0, 3)], existing[(1, 3)], existing[(2, 3)]);
    translation.to_homogeneous() * Matrix4::new_nonuniform_scaling(&scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn hull(points: &[(f64, f64)]) -> ConvexHull2D {
        ConvexHull2D::new(points.iter().map(|&(x, y)| Point2::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn test_longest_edge_tie_keeps_lowest_index() {
        let h = hull(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let edge = longest_edge(&h).unwrap();
        assert_eq!(edge.index, 0);
        assert_eq!(edge.vector, Vector2::new(2.0, 0.0));
        assert_eq!(edge.length, 2.0);
    }

    #[test]
    fn test_longest_edge_can_be_closing_edge() {
        let h = hull(&[(0.0, 0.0), (1.0, 1.0), (0.0, 5.0)]);
        let edge = longest_edge(&h).unwrap();
        assert_eq!(edge.index, 2);
        assert_eq!(edge.vector, Vector2::new(0.0, -5.0));
    }

    #[test]
    fn test_longest_edge_all_zero_is_degenerate() {
        let h = hull(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert!(matches!(
            longest_edge(&h),
            Err(GeometryError::DegenerateHull { points: 3, .. })
        ));
    }

    #[test]
    fn test_angle_between_basics() {
        let x = Vector2::new(1.0, 0.0);
        assert_eq!(angle_between(&x, &x).unwrap(), 0.0);
        assert!((angle_between(&x, &-x).unwrap() - PI).abs() < 1e-12);
        assert!((angle_between(&x, &Vector2::new(0.0, 3.0)).unwrap() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(
            angle_between(&x, &Vector2::zeros()),
            Err(GeometryError::ZeroVector)
        );
    }

    #[test]
    fn test_sign_policy() {
        let y = Vector2::y();
        assert_eq!(sign_of(&y, &Vector2::new(1.0, 0.5)), 1.0);
        assert_eq!(sign_of(&y, &Vector2::new(1.0, -0.5)), -1.0);
        assert_eq!(sign_of(&y, &Vector2::new(1.0, 0.0)), -1.0);
    }

    #[test]
    fn test_square_hull_needs_no_rotation() {
        let h = hull(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let rotation = build_side_alignment(&h).unwrap();
        assert!(rotation.is_identity(0.0));
        assert_eq!(rotation.to_homogeneous(), Matrix4::identity());
    }

    #[test]
    fn test_triangle_hull_already_aligned() {
        let h = hull(&[(0.0, 0.0), (3.0, 0.0), (0.0, 1.0)]);
        let edge = longest_edge(&h).unwrap();
        assert_eq!(edge.index, 0);
        assert_eq!(edge.length, 3.0);
        assert_eq!(angle_between(&Vector2::x(), &edge.vector).unwrap(), 0.0);
        assert!(build_side_alignment(&h).unwrap().is_identity(0.0));
    }

    #[test]
    fn test_side_alignment_turns_edge_onto_x() {
        let a = 35f64.to_radians();
        let (s, c) = a.sin_cos();
        let h = hull(&[(0.0, 0.0), (10.0 * c, 10.0 * s), (5.0 * c - s, 5.0 * s + c)]);
        let rotation = build_side_alignment(&h).unwrap();
        assert!((rotation.angle - a).abs() < 1e-12);

        // hull (x, y) is world (x, z)
        let edge = Vector3::new(10.0 * c, 0.0, 10.0 * s);
        let turned = rotation.to_rotation() * edge;
        assert!(turned.z.abs() < 1e-9);
        assert!(turned.x > 0.0);
    }

    #[test]
    fn test_compose_pre_multiplies() {
        let rotation = RotationDescriptor::about_up(0.3);
        let existing = Translation3::new(1.0, 2.0, 3.0).to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 2.0, 0.5));
        let composed = compose_with_local(&rotation, &existing);
        assert_eq!(composed, rotation.to_homogeneous() * existing);
        assert_ne!(composed, existing * rotation.to_homogeneous());
    }

    #[test]
    fn test_reset_rotation_keeps_translation_and_scale() {
        let existing = Translation3::new(4.0, 0.0, -2.0).to_homogeneous()
            * RotationDescriptor::about_up(1.1).to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
        let reset = reset_rotation(&existing);
        let expected = Translation3::new(4.0, 0.0, -2.0).to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
        assert!((reset - expected).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_descriptor_rejects_zero_axis() {
        assert_eq!(
            RotationDescriptor::new(Vector3::zeros(), 0.5),
            Err(GeometryError::ZeroVector)
        );
        assert!(RotationDescriptor::new(Vector3::zeros(), 0.0)
            .unwrap()
            .is_identity(0.0));
    }
}
