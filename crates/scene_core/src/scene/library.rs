//! In-memory scene library
//!
//! [`SceneLibrary`] is a [`SceneLoader`] over named [`SceneTemplate`]s.
//! Templates describe nodes by index, so one template can be instantiated
//! any number of times. Libraries can be built in code or read from RON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Trs;
use crate::scene::animation::{Anim, SceneAnim};
use crate::scene::components::{
    Camera, Collision, Instance, Light, Object, RigidBody, Script, Transform,
};
use crate::scene::instancing::{LoadSceneContext, SceneLoader};
use crate::scene::{NodeRef, Scene, SceneError};

/// One node of a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTemplate {
    /// Node name
    pub name: String,
    /// Local transform
    pub trs: Trs,
    /// Index of the parent node in the same template
    pub parent: Option<usize>,
    /// Create the node disabled
    pub disabled: bool,
    /// Optional camera
    pub camera: Option<Camera>,
    /// Optional renderable object
    pub object: Option<Object>,
    /// Optional light
    pub light: Option<Light>,
    /// Optional rigid body
    pub rigid_body: Option<RigidBody>,
    /// Collision shapes
    pub collisions: Vec<Collision>,
    /// Attached scripts
    pub scripts: Vec<Script>,
    /// Nested scene
    pub instance: Option<Instance>,
}

impl NodeTemplate {
    /// Node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set the local transform
    pub fn with_trs(mut self, trs: Trs) -> Self {
        self.trs = trs;
        self
    }

    /// Builder pattern: parent to the template node at `index`
    pub fn with_parent(mut self, index: usize) -> Self {
        self.parent = Some(index);
        self
    }

    /// Builder pattern: create disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Builder pattern: attach a camera
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Builder pattern: attach an object
    pub fn with_object(mut self, object: Object) -> Self {
        self.object = Some(object);
        self
    }

    /// Builder pattern: attach a light
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    /// Builder pattern: attach a rigid body
    pub fn with_rigid_body(mut self, rigid_body: RigidBody) -> Self {
        self.rigid_body = Some(rigid_body);
        self
    }

    /// Builder pattern: add a collision shape
    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.collisions.push(collision);
        self
    }

    /// Builder pattern: add a script
    pub fn with_script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    /// Builder pattern: host a nested scene
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }
}

/// A clip driving one template node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeClipTemplate {
    /// Index of the animated node
    pub node: usize,
    /// Clip data
    pub anim: Anim,
}

/// Scene animation over template nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneAnimTemplate {
    /// Name looked up by instance components
    pub name: String,
    /// Range start in seconds
    pub t_start: f32,
    /// Range end in seconds
    pub t_end: f32,
    /// Per-node clips
    pub clips: Vec<NodeClipTemplate>,
}

impl SceneAnimTemplate {
    /// Scene animation without clips
    pub fn new(name: impl Into<String>, t_start: f32, t_end: f32) -> Self {
        Self {
            name: name.into(),
            t_start,
            t_end,
            clips: Vec::new(),
        }
    }

    /// Builder pattern: add a clip for the node at `node`
    pub fn with_clip(mut self, node: usize, anim: Anim) -> Self {
        self.clips.push(NodeClipTemplate { node, anim });
        self
    }
}

/// Reusable description of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTemplate {
    /// Nodes, referenced by index
    pub nodes: Vec<NodeTemplate>,
    /// Scene animations
    pub scene_anims: Vec<SceneAnimTemplate>,
}

impl SceneTemplate {
    /// Empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append a node
    pub fn with_node(mut self, node: NodeTemplate) -> Self {
        self.nodes.push(node);
        self
    }

    /// Builder pattern: append a scene animation
    pub fn with_scene_anim(mut self, anim: SceneAnimTemplate) -> Self {
        self.scene_anims.push(anim);
        self
    }

    /// Append a node and return its index
    pub fn push_node(&mut self, node: NodeTemplate) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn validate(&self, path: &str) -> Result<(), SceneError> {
        let invalid = |reason: String| SceneError::Load {
            path: path.to_owned(),
            reason,
        };
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(p) if p >= self.nodes.len() => {
                    return Err(invalid(format!("node {i} has out of range parent {p}")));
                }
                Some(p) if p == i => return Err(invalid(format!("node {i} is its own parent"))),
                _ => {}
            }
        }
        for anim in &self.scene_anims {
            if let Some(clip) = anim.clips.iter().find(|c| c.node >= self.nodes.len()) {
                return Err(invalid(format!(
                    "scene anim '{}' drives out of range node {}",
                    anim.name, clip.node
                )));
            }
        }
        Ok(())
    }

    /// Create the template's content in `scene`, recording it in `ctx.view`
    pub fn instantiate(&self, path: &str, scene: &mut Scene, ctx: &mut LoadSceneContext) -> Result<(), SceneError> {
        self.validate(path)?;

        let mut created: Vec<NodeRef> = Vec::with_capacity(self.nodes.len());
        for template in &self.nodes {
            let node = scene.create_node(template.name.clone());
            let transform = scene.create_transform(Transform::new(template.trs));
            scene.set_node_transform(node, transform);

            if let Some(camera) = template.camera {
                let r = scene.create_camera(camera);
                scene.set_node_camera(node, r);
            }
            if let Some(object) = &template.object {
                let r = scene.create_object(object.clone());
                scene.set_node_object(node, r);
            }
            if let Some(light) = template.light {
                let r = scene.create_light(light);
                scene.set_node_light(node, r);
            }
            if let Some(rigid_body) = template.rigid_body {
                let r = scene.create_rigid_body(rigid_body);
                scene.set_node_rigid_body(node, r);
            }
            for collision in &template.collisions {
                let r = scene.create_collision(collision.clone());
                scene.add_node_collision(node, r);
            }
            for script in &template.scripts {
                let r = scene.create_script(script.clone());
                scene.add_node_script(node, r);
            }
            if let Some(instance) = &template.instance {
                let r = scene.create_instance(instance.clone());
                scene.set_node_instance(node, r);
            }

            created.push(node);
            ctx.view.nodes.push(node);
        }

        for (template, &node) in self.nodes.iter().zip(&created) {
            if let Some(parent) = template.parent {
                let transform = scene.get_node_transform(node);
                scene.set_transform_parent(transform, created[parent]);
            }
            if template.disabled {
                scene.disable_node(node);
            }
        }

        for anim_template in &self.scene_anims {
            let mut scene_anim = SceneAnim::new(anim_template.name.clone(), anim_template.t_start, anim_template.t_end);
            for clip in &anim_template.clips {
                let anim = scene.create_anim(clip.anim.clone());
                ctx.view.anims.push(anim);
                scene_anim = scene_anim.with_node_anim(created[clip.node], anim);
            }
            let r = scene.create_scene_anim(scene_anim);
            ctx.view.scene_anims.push(r);
        }
        Ok(())
    }
}

/// Named scene templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneLibrary {
    scenes: BTreeMap<String, SceneTemplate>,
}

impl SceneLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a library from RON text mapping paths to templates
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Register a template, returning the one it replaces
    pub fn insert(&mut self, path: impl Into<String>, template: SceneTemplate) -> Option<SceneTemplate> {
        self.scenes.insert(path.into(), template)
    }

    /// Builder pattern: register a template
    pub fn with_scene(mut self, path: impl Into<String>, template: SceneTemplate) -> Self {
        self.insert(path, template);
        self
    }

    /// Template registered under `path`
    pub fn get(&self, path: &str) -> Option<&SceneTemplate> {
        self.scenes.get(path)
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl SceneLoader for SceneLibrary {
    fn load_scene(&mut self, path: &str, scene: &mut Scene, ctx: &mut LoadSceneContext) -> Result<(), SceneError> {
        let template = self
            .scenes
            .get(path)
            .ok_or_else(|| SceneError::UnknownScene(path.to_owned()))?;
        template.instantiate(path, scene, ctx)
    }
}
