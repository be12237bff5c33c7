//! Collision shape component
//!
//! A node may carry several of these. They are listed per node on the scene
//! in attachment order and read by the physics backend together with the
//! node's rigid body.

use crate::foundation::math::{Trs, Vec3};
use serde::{Deserialize, Serialize};

/// Primitive or mesh shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Sphere, radius in `size.x`
    #[default]
    Sphere,
    /// Box, full extents in `size`
    Cube,
    /// Cone, radius in `size.x`, height in `size.y`
    Cone,
    /// Capsule, radius in `size.x`, height in `size.y`
    Capsule,
    /// Cylinder, radius in `size.x`, height in `size.y`
    Cylinder,
    /// Triangle mesh loaded from `resource_path`
    Mesh,
}

/// Collision shape with its local offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Shape type
    pub kind: CollisionKind,
    /// Offset of the shape relative to the node
    pub trs: Trs,
    /// Mass contributed to the rigid body
    pub mass: f32,
    /// Shape dimensions, interpretation depends on `kind`
    pub size: Vec3,
    /// Mesh resource for [`CollisionKind::Mesh`]
    pub resource_path: String,
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            kind: CollisionKind::Sphere,
            trs: Trs::identity(),
            mass: 0.0,
            size: Vec3::new(0.5, 0.5, 0.5),
            resource_path: String::new(),
        }
    }
}

impl Collision {
    /// Builder pattern: set the local offset
    pub fn with_offset(mut self, trs: Trs) -> Self {
        self.trs = trs;
        self
    }

    /// Radius for round shapes
    pub fn radius(&self) -> f32 {
        self.size.x
    }

    /// Height for capsules, cones and cylinders
    pub fn height(&self) -> f32 {
        self.size.y
    }
}

/// Factory functions for collision shapes
pub struct CollisionFactory;

impl CollisionFactory {
    /// Sphere shape
    pub fn sphere(radius: f32, mass: f32) -> Collision {
        Collision {
            kind: CollisionKind::Sphere,
            mass,
            size: Vec3::new(radius, radius, radius),
            ..Default::default()
        }
    }

    /// Box shape with full extents
    pub fn cube(size: Vec3, mass: f32) -> Collision {
        Collision {
            kind: CollisionKind::Cube,
            mass,
            size,
            ..Default::default()
        }
    }

    /// Capsule shape
    pub fn capsule(radius: f32, height: f32, mass: f32) -> Collision {
        Self::round(CollisionKind::Capsule, radius, height, mass)
    }

    /// Cone shape
    pub fn cone(radius: f32, height: f32, mass: f32) -> Collision {
        Self::round(CollisionKind::Cone, radius, height, mass)
    }

    /// Cylinder shape
    pub fn cylinder(radius: f32, height: f32, mass: f32) -> Collision {
        Self::round(CollisionKind::Cylinder, radius, height, mass)
    }

    /// Triangle mesh shape
    pub fn mesh(resource_path: impl Into<String>, mass: f32) -> Collision {
        Collision {
            kind: CollisionKind::Mesh,
            mass,
            resource_path: resource_path.into(),
            ..Default::default()
        }
    }

    fn round(kind: CollisionKind, radius: f32, height: f32, mass: f32) -> Collision {
        Collision {
            kind,
            mass,
            size: Vec3::new(radius, height, radius),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_shapes_store_radius_and_height() {
        let capsule = CollisionFactory::capsule(0.25, 2.0, 70.0);
        assert_eq!(capsule.kind, CollisionKind::Capsule);
        assert_eq!(capsule.radius(), 0.25);
        assert_eq!(capsule.height(), 2.0);
    }

    #[test]
    fn test_mesh_keeps_resource_path() {
        let mesh = CollisionFactory::mesh("levels/ground.physics", 0.0);
        assert_eq!(mesh.kind, CollisionKind::Mesh);
        assert_eq!(mesh.resource_path, "levels/ground.physics");
    }
}
