//! # Silhouette Hulls
//!
//! A [`ConvexHull2D`] is the closed polygon bounding the horizontal
//! projection of an object. The projection plane is the build plate: world
//! X maps to hull `x`, world Z maps to hull `y`.
//!
//! Hulls are supplied to the alignment code explicitly. The
//! [`HullExtractor`] trait is the seam where a host plugs in its own
//! (possibly cached) hulls; [`ProjectedHullExtractor`] computes them from
//! mesh vertices.

use nalgebra::{Point2, Point3, Vector2};
use orientkit_core::{GeometryError, NodeHandle};
use tracing::debug;

/// Closed convex polygon in the projection plane
///
/// Invariant: at least three points, and no explicit closing duplicate;
/// the edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull2D {
    points: Vec<Point2<f64>>,
}

impl ConvexHull2D {
    /// Wrap an already-ordered polygon
    ///
    /// A trailing point equal to the first is dropped.
    pub fn new(mut points: Vec<Point2<f64>>) -> Result<Self, GeometryError> {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(GeometryError::DegenerateHull {
                points: points.len(),
                longest: 0.0,
            });
        }
        Ok(Self { points })
    }

    /// Convex hull of an unordered point cloud (monotone chain)
    ///
    /// The result is counter-clockwise with collinear points removed.
    pub fn from_points(points: &[Point2<f64>]) -> Result<Self, GeometryError> {
        let mut sorted: Vec<Point2<f64>> = points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .copied()
            .collect();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        sorted.dedup();

        if sorted.len() < 3 {
            return Err(GeometryError::DegenerateHull {
                points: sorted.len(),
                longest: 0.0,
            });
        }

        let mut lower: Vec<Point2<f64>> = Vec::with_capacity(sorted.len());
        for p in &sorted {
            while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(*p);
        }

        let mut upper: Vec<Point2<f64>> = Vec::with_capacity(sorted.len());
        for p in sorted.iter().rev() {
            while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(*p);
        }

        // Each chain ends where the other begins
        lower.pop();
        upper.pop();
        lower.extend(upper);

        Self::new(lower)
    }

    /// Hull of vertices projected onto the build plate (world X/Z)
    pub fn from_vertices(vertices: &[Point3<f64>]) -> Result<Self, GeometryError> {
        let projected: Vec<Point2<f64>> = vertices.iter().map(|v| Point2::new(v.x, v.z)).collect();
        Self::from_points(&projected)
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edge vectors `p[i+1] - p[i]`, including the closing edge `p[0] - p[n-1]`
    pub fn edges(&self) -> impl Iterator<Item = Vector2<f64>> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| self.points[(i + 1) % n] - self.points[i])
    }

    /// Enclosed area (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }
}

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Supplies the silhouette hull of a node
pub trait HullExtractor: Send + Sync {
    fn hull(&self, node: &dyn NodeHandle) -> Result<ConvexHull2D, GeometryError>;
}

/// Computes hulls from world-transformed mesh vertices
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectedHullExtractor;

impl HullExtractor for ProjectedHullExtractor {
    fn hull(&self, node: &dyn NodeHandle) -> Result<ConvexHull2D, GeometryError> {
        let vertices = node
            .transformed_vertices()
            .ok_or_else(|| GeometryError::MissingHull { node: node.name() })?;
        let hull = ConvexHull2D::from_vertices(&vertices)?;
        debug!(
            "Hull of {} has {} points from {} vertices",
            node.name(),
            hull.len(),
            vertices.len()
        );
        Ok(hull)
    }
}
