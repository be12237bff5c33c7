//! Rigid body component
//!
//! Parameters consumed by an external physics backend. The shape comes from
//! the node's collision components.

use serde::{Deserialize, Serialize};

/// How the physics backend drives the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyKind {
    /// Simulated
    #[default]
    Dynamic,
    /// Moved by the node transform, pushes dynamic bodies
    Kinematic,
    /// Never moves
    Static,
}

/// Physics body parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// Simulation mode
    pub kind: RigidBodyKind,
    /// Linear velocity damping
    pub linear_damping: f32,
    /// Angular velocity damping
    pub angular_damping: f32,
    /// Bounciness
    pub restitution: f32,
    /// Sliding friction
    pub friction: f32,
    /// Rolling friction
    pub rolling_friction: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            kind: RigidBodyKind::Dynamic,
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution: 0.0,
            friction: 0.5,
            rolling_friction: 0.0,
        }
    }
}

impl RigidBody {
    /// Body of the given kind with default material parameters
    pub fn new(kind: RigidBodyKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Builder pattern: set linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Builder pattern: set restitution and friction
    pub fn with_surface(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }
}
