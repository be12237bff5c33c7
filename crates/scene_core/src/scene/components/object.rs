//! Object component
//!
//! Binds a node to a model and its per-slot materials. Models and materials
//! live in an external resource cache; the scene only stores their ids.

use crate::scene::NodeRef;
use serde::{Deserialize, Serialize};

/// Opaque id of a model in the resource cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelRef(pub u32);

/// Opaque id of a material in the resource cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialRef(pub u32);

/// Renderable model with its material table and skinning bones
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Object {
    /// Model to draw, `None` for an empty object
    pub model: Option<ModelRef>,
    /// One material per model slot
    pub materials: Vec<MaterialRef>,
    /// Nodes driving the model's bones, in bone order
    pub bones: Vec<NodeRef>,
}

impl Object {
    /// Object drawing `model` with no materials assigned yet
    pub fn new(model: ModelRef) -> Self {
        Self {
            model: Some(model),
            ..Default::default()
        }
    }

    /// Builder pattern: set the material table
    pub fn with_materials(mut self, materials: Vec<MaterialRef>) -> Self {
        self.materials = materials;
        self
    }

    /// Builder pattern: set the bone nodes
    pub fn with_bones(mut self, bones: Vec<NodeRef>) -> Self {
        self.bones = bones;
        self
    }

    /// Material at `slot`
    pub fn material(&self, slot: usize) -> Option<MaterialRef> {
        self.materials.get(slot).copied()
    }

    /// Assign a material, growing the table when `slot` is past its end.
    ///
    /// Slots created by growth repeat the new material.
    pub fn set_material(&mut self, slot: usize, material: MaterialRef) {
        if slot >= self.materials.len() {
            self.materials.resize(slot + 1, material);
        }
        self.materials[slot] = material;
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_material_grows_table() {
        let mut object = Object::new(ModelRef(3));
        object.set_material(2, MaterialRef(7));
        assert_eq!(object.materials.len(), 3);
        assert_eq!(object.material(2), Some(MaterialRef(7)));
        assert_eq!(object.material(5), None);

        object.set_material(0, MaterialRef(1));
        assert_eq!(object.material(0), Some(MaterialRef(1)));
    }
}
