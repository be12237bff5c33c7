//! # Scene Module
//!
//! Nodes, typed components and the operations tying them together.
//!
//! ## Organization
//!
//! - **Scene Graph**: component tables, node slots and the typed accessor API
//! - **Transform System**: parent-relative transforms and cached world matrices
//! - **Instancing**: nested scene loading, enable/disable propagation
//! - **Garbage Collection**: reclaiming components of destroyed nodes
//! - **Animation**: clip tables and playback clocks
//! - **Clock**: wall-clock frame timing feeding [`Scene::update`]
//! - **Library**: in-memory scene templates implementing [`SceneLoader`]

pub mod animation;
pub mod clock;
pub mod components;
pub mod error;
mod gc;
pub mod instancing;
pub mod library;
pub mod node;
mod playback;
pub mod scene_graph;
mod transform_system;

#[cfg(test)]
mod tests;

pub use animation::{Anim, AnimLoopMode, AnimRef, NodeAnim, PlayAnim, PlayAnimKey, SceneAnim, SceneAnimRef};
pub use clock::FrameClock;
pub use components::{
    CameraRef, CollisionRef, ComponentKind, ComponentRef, InstanceRef, LightRef, NodeComponent,
    ObjectRef, RigidBodyRef, SceneComponent, ScriptRef, TransformRef,
};
pub use error::SceneError;
pub use instancing::{LoadSceneContext, SceneLoader, SceneView};
pub use library::{NodeClipTemplate, NodeTemplate, SceneAnimTemplate, SceneLibrary, SceneTemplate};
pub use node::{Node, NodeFlags, NodeRef};
pub use scene_graph::{Scene, ScriptDetach};
