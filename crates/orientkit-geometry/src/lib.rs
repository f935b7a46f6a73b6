//! # OrientKit Geometry
//!
//! Deterministic 2D geometry behind the alignment commands:
//! silhouette hulls on the build plate, the oriented minimum-area
//! rectangle, and the rotations that turn either onto the world axes.
//!
//! Nothing here touches a node; callers compose the returned rotation with
//! a node's local transform and hand the result to a transform batch.

pub mod alignment;
pub mod bounds;
pub mod hull;

pub use alignment::{
    angle_between, build_main_alignment, build_side_alignment, build_side_alignment_with,
    compose_with_local, longest_edge, reset_rotation, sign_of, AlignmentAxes, LongestEdge,
    RotationDescriptor,
};
pub use bounds::{MinAreaRect, OrientedBounds2D, OrientedRect};
pub use hull::{ConvexHull2D, HullExtractor, ProjectedHullExtractor};
