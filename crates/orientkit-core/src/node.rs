//! Scene node abstraction
//!
//! The host owns the scene graph. The core only sees nodes through the
//! [`NodeHandle`] trait: read access to mesh vertices and transforms, and a
//! single mutation point, [`NodeHandle::set_local_transform`]. Every other
//! mutation (such as [`NodeHandle::rotate`]) is built on top of it.
//!
//! The host convention is Y-up: the build plate is the X/Z plane.

use nalgebra::{Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Ordered vertex positions of a mesh.
pub type VertexSet = Vec<Point3<f64>>;

/// Shared handle to a host-owned node.
pub type NodeRef = Arc<dyn NodeHandle>;

/// Stable identity of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", &self.0.to_string()[..8])
    }
}

/// Frame a rotation is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    /// Relative to the node's own current transform (post-multiplied).
    Local,
    /// Global axes, pivoting about the node's world position.
    World,
}

/// Read/mutate access to a host-owned 3D object.
pub trait NodeHandle: Send + Sync + std::fmt::Debug {
    /// Identity used for de-duplication.
    fn id(&self) -> NodeId;

    /// Display name, used in logs and messages.
    fn name(&self) -> String;

    /// Untransformed mesh vertices, or `None` for nodes without mesh data.
    fn vertices(&self) -> Option<Arc<VertexSet>>;

    /// Identifier of the file load that produced this node, if any.
    fn source_file(&self) -> Option<String> {
        None
    }

    /// Current local transform.
    fn local_transform(&self) -> Matrix4<f64>;

    /// The single mutation point of a node.
    fn set_local_transform(&self, transform: Matrix4<f64>);

    /// World transform of the parent node.
    fn parent_world_transform(&self) -> Matrix4<f64> {
        Matrix4::identity()
    }

    fn world_transform(&self) -> Matrix4<f64> {
        self.parent_world_transform() * self.local_transform()
    }

    /// Mesh vertices under the current world transform.
    fn transformed_vertices(&self) -> Option<VertexSet> {
        let vertices = self.vertices()?;
        let world = self.world_transform();
        Some(
            vertices
                .iter()
                .map(|v| world.transform_point(v))
                .collect(),
        )
    }

    /// Rotate the node.
    ///
    /// In [`TransformSpace::World`] the rotation axes are global and the
    /// pivot is the node's world position, so the node turns in place.
    fn rotate(&self, rotation: &UnitQuaternion<f64>, space: TransformSpace) {
        let local = self.local_transform();
        let r = rotation.to_homogeneous();
        let updated = match space {
            TransformSpace::Local => local * r,
            TransformSpace::World => {
                let parent = self.parent_world_transform();
                let world = parent * local;
                let pivot = Vector3::new(world[(0, 3)], world[(1, 3)], world[(2, 3)]);
                let about_pivot = Translation3::from(pivot).to_homogeneous()
                    * r
                    * Translation3::from(-pivot).to_homogeneous();
                let parent_inv = parent.try_inverse().unwrap_or_else(Matrix4::identity);
                parent_inv * about_pivot * world
            }
        };
        self.set_local_transform(updated);
    }
}

/// In-memory mesh node
///
/// A plain [`NodeHandle`] implementation for hosts that keep their own
/// scene as a flat list, for the headless driver, and for tests.
#[derive(Debug)]
pub struct MeshNode {
    id: NodeId,
    name: String,
    vertices: Option<Arc<VertexSet>>,
    source_file: Option<String>,
    local: RwLock<Matrix4<f64>>,
}

impl MeshNode {
    /// Create a node with an identity transform
    pub fn new(name: impl Into<String>, vertices: VertexSet) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            vertices: Some(Arc::new(vertices)),
            source_file: None,
            local: RwLock::new(Matrix4::identity()),
        }
    }

    /// Create a node that carries no mesh data (a group or empty node)
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            vertices: None,
            source_file: None,
            local: RwLock::new(Matrix4::identity()),
        }
    }

    /// Axis-aligned box centred on the origin
    pub fn cuboid(name: impl Into<String>, size: Vector3<f64>) -> Self {
        let h = size / 2.0;
        let mut vertices = Vec::with_capacity(8);
        for &x in &[-h.x, h.x] {
            for &y in &[-h.y, h.y] {
                for &z in &[-h.z, h.z] {
                    vertices.push(Point3::new(x, y, z));
                }
            }
        }
        Self::new(name, vertices)
    }

    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    pub fn with_transform(self, transform: Matrix4<f64>) -> Self {
        *self.local.write() = transform;
        self
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

impl NodeHandle for MeshNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn vertices(&self) -> Option<Arc<VertexSet>> {
        self.vertices.clone()
    }

    fn source_file(&self) -> Option<String> {
        self.source_file.clone()
    }

    fn local_transform(&self) -> Matrix4<f64> {
        *self.local.read()
    }

    fn set_local_transform(&self, transform: Matrix4<f64>) {
        *self.local.write() = transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn test_transformed_vertices_follow_world_transform() {
        let node = MeshNode::new("p", vec![Point3::new(1.0, 0.0, 0.0)])
            .with_transform(Translation3::new(0.0, 5.0, 0.0).to_homogeneous());
        let verts = node.transformed_vertices().expect("mesh data");
        assert!((verts[0] - Point3::new(1.0, 5.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_world_rotation_pivots_on_node_position() {
        let node = MeshNode::new("p", vec![Point3::new(1.0, 0.0, 0.0)])
            .with_transform(Translation3::new(10.0, 0.0, 0.0).to_homogeneous());
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        node.rotate(&quarter, TransformSpace::World);

        let m = node.local_transform();
        // position is unchanged
        assert!((m[(0, 3)] - 10.0).abs() < 1e-12);
        let v = node.transformed_vertices().expect("mesh data");
        assert!((v[0] - Point3::new(10.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_empty_node_has_no_vertices() {
        let node = MeshNode::empty("group");
        assert!(node.vertices().is_none());
        assert!(node.transformed_vertices().is_none());
    }
}
