//! Optimizer contract
//!
//! The support-minimizing search itself lives outside this crate. Jobs only
//! rely on the call contract below: hand over the world-space vertices and
//! a request, receive an axis/angle pair, and observe sub-progress through a
//! callback.

use nalgebra::{Unit, UnitQuaternion, Vector3};
use orientkit_core::{OrientationMode, VertexSet};
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;

/// Errors reported by an optimizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// The search itself failed
    #[error("{0}")]
    Failed(String),

    /// The search returned a result that cannot be turned into a rotation
    #[error("Invalid result: {0}")]
    InvalidResult(String),

    /// The optimizer panicked on the worker thread
    #[error("Optimizer panicked: {0}")]
    Panicked(String),
}

/// Parameters of one optimizer call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeRequest {
    pub mode: OrientationMode,
    /// Weigh the volume beneath overhangs, not only their area.
    pub penalize_overhang_volume: bool,
}

impl OptimizeRequest {
    pub fn new(mode: OrientationMode) -> Self {
        Self {
            mode,
            penalize_overhang_volume: true,
        }
    }

    pub fn with_overhang_volume(mut self, enabled: bool) -> Self {
        self.penalize_overhang_volume = enabled;
        self
    }
}

/// Orientation found by the optimizer, in the optimizer's Z-up frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationResult {
    pub axis: Vector3<f64>,
    /// Radians.
    pub angle: f64,
}

impl OrientationResult {
    pub fn new(axis: Vector3<f64>, angle: f64) -> Self {
        Self { axis, angle }
    }

    /// Identity in the optimizer frame; only the frame correction applies
    pub fn unchanged() -> Self {
        Self::new(Vector3::z(), 0.0)
    }

    /// Reject non-finite values and a null axis paired with a turn
    pub fn validate(&self) -> Result<(), OptimizerError> {
        if !self.angle.is_finite() || self.axis.iter().any(|c| !c.is_finite()) {
            return Err(OptimizerError::InvalidResult(format!(
                "non-finite orientation {:?} / {}",
                self.axis, self.angle
            )));
        }
        if self.angle != 0.0 && self.axis.norm() <= f64::EPSILON {
            return Err(OptimizerError::InvalidResult(format!(
                "zero axis with angle {}",
                self.angle
            )));
        }
        Ok(())
    }

    /// World-space rotation for a Y-up scene
    ///
    /// The optimizer reports the rotation that brings the object to its
    /// optimum as (axis, angle) in a Z-up frame; the node must be turned by
    /// the inverse axis, then the result is brought into the Y-up frame by
    /// a quarter turn about -X.
    pub fn to_world_rotation(&self) -> UnitQuaternion<f64> {
        let orientation = match Unit::try_new(-self.axis, f64::EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, self.angle),
            None => UnitQuaternion::identity(),
        };
        frame_correction() * orientation
    }
}

/// Quarter turn about -X, mapping the optimizer frame onto the scene frame
pub fn frame_correction() -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

/// External orientation search
///
/// Called on the blocking pool; may take a long time and must report
/// progress in `[0, 100]` through `progress`.
pub trait Optimizer: Send + Sync {
    fn optimize(
        &self,
        vertices: &VertexSet,
        request: &OptimizeRequest,
        progress: &dyn Fn(f64),
    ) -> Result<OrientationResult, OptimizerError>;
}

impl<F> Optimizer for F
where
    F: Fn(&VertexSet, &OptimizeRequest, &dyn Fn(f64)) -> Result<OrientationResult, OptimizerError>
        + Send
        + Sync,
{
    fn optimize(
        &self,
        vertices: &VertexSet,
        request: &OptimizeRequest,
        progress: &dyn Fn(f64),
    ) -> Result<OrientationResult, OptimizerError> {
        self(vertices, request, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_unchanged_result_only_applies_frame_correction() {
        let rotation = OrientationResult::unchanged().to_world_rotation();
        assert!(rotation.angle_to(&frame_correction()) < 1e-12);
        // optimizer +Z maps to scene +Y
        let up = rotation * Vector3::z();
        assert!((up - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn test_axis_is_inverted() {
        let result = OrientationResult::new(Vector3::new(0.0, 0.0, 2.0), 0.5);
        let expected = frame_correction()
            * UnitQuaternion::from_axis_angle(&-Vector3::z_axis(), 0.5);
        assert!(result.to_world_rotation().angle_to(&expected) < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(OrientationResult::unchanged().validate().is_ok());
        assert!(OrientationResult::new(Vector3::zeros(), 0.0).validate().is_ok());
        assert!(OrientationResult::new(Vector3::zeros(), 1.0).validate().is_err());
        assert!(OrientationResult::new(Vector3::x(), f64::NAN).validate().is_err());
    }

    #[test]
    fn test_closures_are_optimizers() {
        let optimizer = |vertices: &VertexSet,
                         request: &OptimizeRequest,
                         progress: &dyn Fn(f64)|
         -> Result<OrientationResult, OptimizerError> {
            progress(50.0);
            assert_eq!(request.mode, OrientationMode::Fast);
            Ok(OrientationResult::new(Vector3::x(), vertices.len() as f64))
        };
        let result = optimizer
            .optimize(
                &vec![Point3::origin(); 3],
                &OptimizeRequest::new(OrientationMode::Fast),
                &|_| {},
            )
            .unwrap();
        assert_eq!(result.angle, 3.0);
    }
}
