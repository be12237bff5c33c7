//! Scene components
//!
//! Plain value types stored in the scene's generational tables. A node holds
//! at most one reference per [`ComponentKind`]; collisions and scripts attach
//! as ordered lists and an instance attaches through its own link table.
//!
//! Components carry data only. Everything that walks the hierarchy or
//! touches more than one table lives on [`Scene`](crate::scene::Scene).

pub mod camera;
pub mod collision;
pub mod instance;
pub mod light;
pub mod object;
pub mod rigid_body;
pub mod script;
pub mod transform;

pub use camera::{Camera, CameraFactory, ZRange};
pub use collision::{Collision, CollisionFactory, CollisionKind};
pub use instance::Instance;
pub use light::{Light, LightFactory, LightKind, LightShadow};
pub use object::{MaterialRef, ModelRef, Object};
pub use rigid_body::{RigidBody, RigidBodyKind};
pub use script::{Script, ScriptParam};
pub use transform::{Transform, TransformFactory};

use crate::foundation::collections::{GenRef, GenerationalVectorList, TypedRef};
use crate::scene::Scene;

/// Untyped handle stored in a node's component slots
pub type ComponentRef = GenRef;

/// Handle to a [`Transform`]
pub type TransformRef = TypedRef<Transform>;
/// Handle to a [`Camera`]
pub type CameraRef = TypedRef<Camera>;
/// Handle to an [`Object`]
pub type ObjectRef = TypedRef<Object>;
/// Handle to a [`Light`]
pub type LightRef = TypedRef<Light>;
/// Handle to a [`RigidBody`]
pub type RigidBodyRef = TypedRef<RigidBody>;
/// Handle to a [`Collision`]
pub type CollisionRef = TypedRef<Collision>;
/// Handle to a [`Script`]
pub type ScriptRef = TypedRef<Script>;
/// Handle to an [`Instance`]
pub type InstanceRef = TypedRef<Instance>;

/// The five single-valued component slots of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Local placement and parent link
    Transform,
    /// Projection parameters
    Camera,
    /// Renderable model and materials
    Object,
    /// Light source
    Light,
    /// Physics body parameters
    RigidBody,
}

impl ComponentKind {
    /// Number of slots on a node
    pub const COUNT: usize = 5;

    /// Every kind in slot order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Transform,
        Self::Camera,
        Self::Object,
        Self::Light,
        Self::RigidBody,
    ];

    /// Slot index on [`Node`](crate::scene::Node)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Camera => "camera",
            Self::Object => "object",
            Self::Light => "light",
            Self::RigidBody => "rigid body",
        }
    }
}

/// A value type with its own table on [`Scene`].
///
/// Lets the scene expose one generic create/destroy/get surface instead of
/// one hand-written copy per component type.
pub trait SceneComponent: Clone + Sized + 'static {
    /// Name used in diagnostics
    const NAME: &'static str;

    /// The table holding values of this type
    fn table(scene: &Scene) -> &GenerationalVectorList<Self>;

    /// Mutable access to the table holding values of this type
    fn table_mut(scene: &mut Scene) -> &mut GenerationalVectorList<Self>;
}

/// A component that occupies one of the node's single-valued slots
pub trait NodeComponent: SceneComponent {
    /// Which slot it occupies
    const KIND: ComponentKind;
}
