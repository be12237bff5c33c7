//! Instance component
//!
//! Marks a node as the host of a nested scene. Attaching the component does
//! nothing by itself; [`Scene::node_setup_instance`](crate::scene::Scene::node_setup_instance)
//! loads the scene at `path` and records the created content as the host's
//! view.

use crate::scene::AnimLoopMode;
use serde::{Deserialize, Serialize};

/// Nested scene reference with an optional animation to start on load
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instance {
    /// Scene to load
    pub path: String,
    /// Scene animation to start once loaded, empty for none
    pub anim: String,
    /// Loop mode of that animation
    pub loop_mode: AnimLoopMode,
}

impl Instance {
    /// Instance of the scene at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: start the named scene animation after instantiation
    pub fn with_anim(mut self, anim: impl Into<String>, loop_mode: AnimLoopMode) -> Self {
        self.anim = anim.into();
        self.loop_mode = loop_mode;
        self
    }
}
