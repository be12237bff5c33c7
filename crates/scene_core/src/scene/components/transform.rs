//! Transform component
//!
//! Local placement of a node relative to its parent node. The parent is a
//! node handle, not a transform handle: the hierarchy follows
//! `transform.parent -> node -> node's transform` and a parent that has been
//! destroyed (or has no transform) simply reads as "no parent".

use crate::foundation::math::{euler_from_rotation, Mat4, Rotation3, Trs, Vec3};
use crate::scene::NodeRef;
use serde::{Deserialize, Serialize};

/// Local TRS and parent link
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Position, Euler rotation and scale relative to the parent
    pub trs: Trs,
    /// Parent node, `NodeRef::INVALID` for a root
    pub parent: NodeRef,
}

impl Transform {
    /// Root transform with the given local TRS
    pub fn new(trs: Trs) -> Self {
        Self {
            trs,
            parent: NodeRef::INVALID,
        }
    }

    /// Root transform at `pos`
    pub fn from_position(pos: Vec3) -> Self {
        Self::new(Trs::from_position(pos))
    }

    /// Builder pattern: set the parent node
    pub fn with_parent(mut self, parent: NodeRef) -> Self {
        self.parent = parent;
        self
    }

    /// Builder pattern: set the Euler rotation (radians)
    pub fn with_rotation(mut self, rot: Vec3) -> Self {
        self.trs.rot = rot;
        self
    }

    /// Builder pattern: set the scale
    pub fn with_scale(mut self, scl: Vec3) -> Self {
        self.trs.scl = scl;
        self
    }

    /// Builder pattern: uniform scale
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.trs.scl = Vec3::new(scale, scale, scale);
        self
    }

    /// Local matrix (T * R * S)
    pub fn local_matrix(&self) -> Mat4 {
        self.trs.to_matrix()
    }
}

/// Transform factory for common placements
pub struct TransformFactory;

impl TransformFactory {
    /// Transform at `position` oriented so its -Z axis faces `target`.
    ///
    /// Falls back to no rotation when `target` coincides with `position`.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Transform {
        let forward = target - position;
        if forward.magnitude_squared() < f32::EPSILON {
            return Transform::from_position(position);
        }
        // face_towards aligns +Z with the direction, the camera convention looks down -Z
        let rotation = Rotation3::face_towards(&-forward, &up);
        Transform::from_position(position).with_rotation(euler_from_rotation(&rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_transform_is_a_root() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(!t.parent.is_set());
        assert_eq!(t.trs.scl, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_local_matrix_translates_origin() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(2.0);
        let p = t.local_matrix().transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(p.coords, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_points_negative_z_at_target() {
        let t = TransformFactory::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y());
        let forward = t.local_matrix().transform_vector(&-Vec3::z());
        assert_relative_eq!(forward.normalize(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
    }

    #[test]
    fn test_look_at_degenerate_target() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let t = TransformFactory::look_at(p, p, Vec3::y());
        assert_eq!(t.trs.rot, Vec3::zeros());
    }
}
