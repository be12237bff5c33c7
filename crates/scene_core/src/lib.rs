//! # Scene Core
//!
//! Generational slot stores and the scene graph of a real-time 3D runtime.
//!
//! ## Features
//!
//! - **Slot Stores**: O(1) insert and remove with index reuse and stale-handle detection
//! - **Typed Components**: transforms, cameras, objects, lights, rigid bodies,
//!   collisions, scripts and instances behind typed handles
//! - **World Matrices**: cached per frame with previous-frame tracking
//! - **Instancing**: nested scene loading with a recursion cap and
//!   enable/disable propagation
//! - **Garbage Collection**: reclaiming components of destroyed nodes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut library = SceneLibrary::new().with_scene(
//!         "crate",
//!         SceneTemplate::new().with_node(NodeTemplate::new("lid")),
//!     );
//!
//!     let mut scene = Scene::new();
//!     let host = scene.create_node_with_transform("spawn", Trs::identity(), NodeRef::INVALID);
//!     let instance = scene.create_instance(Instance::new("crate"));
//!     scene.set_node_instance(host, instance);
//!     scene.node_setup_instance(host, &mut library, 0)?;
//!
//!     scene.update(1.0 / 60.0);
//!     let lid = scene.get_node("lid");
//!     let _world = scene.get_node_world(lid);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod scene;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        core::config::{Config, ConfigError, SceneConfig},
        foundation::{
            collections::{GenRef, GenerationalVectorList, TypedRef, VectorList},
            load_queue::LoadQueue,
            logging::{CaptureSink, DiagnosticSink, LogSink},
            math::{Mat4, Trs, Vec3, Vec4},
        },
        scene::{
            components::{
                Camera, CameraFactory, Collision, CollisionFactory, Instance, Light, LightFactory,
                Object, RigidBody, Script, ScriptParam, Transform, TransformFactory,
            },
            AnimLoopMode, FrameClock, LoadSceneContext, NodeFlags, NodeRef, NodeTemplate, PlayAnimKey, Scene,
            SceneError, SceneLibrary, SceneLoader, SceneTemplate, SceneView,
        },
    };
}
