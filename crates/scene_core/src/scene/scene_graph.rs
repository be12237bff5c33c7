//! Scene graph
//!
//! [`Scene`] owns one generational table per component type, the node table
//! and the side tables linking nodes to their collisions, scripts and
//! instances. All mutation goes through `&mut Scene`.
//!
//! Stale handles never panic. Reads through a stale handle warn through the
//! scene's diagnostic sink and return a default value, writes warn and do
//! nothing.

use std::collections::BTreeMap;
use std::fmt;

use slotmap::SlotMap;

use crate::core::config::SceneConfig;
use crate::foundation::collections::{GenRef, GenerationalVectorList, TypedRef};
use crate::foundation::logging::{DiagnosticSink, Diagnostics};
use crate::foundation::math::{Trs, Vec3, Vec4};
use crate::scene::animation::{Anim, AnimLoopMode, PlayAnim, PlayAnimKey, SceneAnim};
use crate::scene::components::{
    Camera, Collision, CollisionKind, CollisionRef, ComponentKind, Instance, InstanceRef, Light,
    LightKind, LightShadow, MaterialRef, ModelRef, NodeComponent, Object, RigidBody,
    RigidBodyKind, SceneComponent, Script, ScriptParam, ScriptRef, Transform, ZRange,
};
use crate::scene::instancing::SceneView;
use crate::scene::node::{Node, NodeFlags, NodeRef};
use crate::scene::transform_system::WorldMatrices;

/// A script that the collector detached because its node was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptDetach {
    /// The destroyed node
    pub node: NodeRef,
    /// The script that was attached to it
    pub script: ScriptRef,
}

/// Nodes, components and the links between them
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    diagnostics: Diagnostics,

    pub(crate) nodes: GenerationalVectorList<Node>,

    pub(crate) transforms: GenerationalVectorList<Transform>,
    pub(crate) cameras: GenerationalVectorList<Camera>,
    pub(crate) objects: GenerationalVectorList<Object>,
    pub(crate) lights: GenerationalVectorList<Light>,
    pub(crate) rigid_bodies: GenerationalVectorList<RigidBody>,
    pub(crate) collisions: GenerationalVectorList<Collision>,
    pub(crate) scripts: GenerationalVectorList<Script>,
    pub(crate) instances: GenerationalVectorList<Instance>,

    pub(crate) anims: GenerationalVectorList<Anim>,
    pub(crate) scene_anims: GenerationalVectorList<SceneAnim>,
    pub(crate) play_anims: SlotMap<PlayAnimKey, PlayAnim>,

    pub(crate) node_collisions: BTreeMap<NodeRef, Vec<CollisionRef>>,
    pub(crate) node_scripts: BTreeMap<NodeRef, Vec<ScriptRef>>,
    pub(crate) node_instance: BTreeMap<NodeRef, InstanceRef>,
    pub(crate) node_instance_view: BTreeMap<NodeRef, SceneView>,
    pub(crate) node_instance_play: BTreeMap<NodeRef, PlayAnimKey>,

    pub(crate) script_detach_events: Vec<ScriptDetach>,
    pub(crate) world: WorldMatrices,
    current_camera: NodeRef,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements [`SceneComponent`] for a table and adds the named
/// create/destroy/validate entry points.
macro_rules! scene_table {
    ($ty:ty, $field:ident, $name:literal, $create:ident, $destroy:ident, $is_valid:ident) => {
        impl SceneComponent for $ty {
            const NAME: &'static str = $name;

            fn table(scene: &Scene) -> &GenerationalVectorList<Self> {
                &scene.$field
            }

            fn table_mut(scene: &mut Scene) -> &mut GenerationalVectorList<Self> {
                &mut scene.$field
            }
        }

        impl Scene {
            #[doc = concat!("Create a ", $name, " and return its handle")]
            pub fn $create(&mut self, value: $ty) -> TypedRef<$ty> {
                self.create(value)
            }

            #[doc = concat!("Destroy a ", $name, ", warning on a stale handle")]
            pub fn $destroy(&mut self, r: TypedRef<$ty>) {
                self.destroy(r);
            }

            #[doc = concat!("True while the ", $name, " handle is live")]
            pub fn $is_valid(&self, r: TypedRef<$ty>) -> bool {
                self.is_valid(r)
            }
        }
    };
}

/// Implements [`NodeComponent`] and the named slot accessors on nodes.
macro_rules! node_slot {
    ($ty:ty, $kind:ident, $set:ident, $get:ident) => {
        impl NodeComponent for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;
        }

        impl Scene {
            #[doc = concat!("Store a ", stringify!($ty), " handle in the node's slot, `INVALID` clears it")]
            pub fn $set(&mut self, node: NodeRef, r: TypedRef<$ty>) {
                self.set_node_component(node, r);
            }

            #[doc = concat!("The node's ", stringify!($ty), ", `INVALID` when unset or stale")]
            pub fn $get(&self, node: NodeRef) -> TypedRef<$ty> {
                self.get_node_component(node)
            }
        }
    };
}

/// Typed field getters and setters. Getters return a clone of the field or
/// its `Default` on a stale handle, setters ignore stale handles. Both warn.
macro_rules! component_fields {
    ($ty:ty { $( $get:ident / $set:ident : $field_ty:ty => $($field:ident).+ ; )* }) => {
        impl Scene {
            $(
                #[doc = concat!("Read `", stringify!($($field).+), "`")]
                pub fn $get(&self, r: TypedRef<$ty>) -> $field_ty {
                    match <$ty as SceneComponent>::table(self).get(r) {
                        Some(c) => c.$($field).+.clone(),
                        None => {
                            self.warn_invalid::<$ty>(r.raw());
                            <$field_ty>::default()
                        }
                    }
                }

                #[doc = concat!("Write `", stringify!($($field).+), "`")]
                pub fn $set(&mut self, r: TypedRef<$ty>, value: $field_ty) {
                    match <$ty as SceneComponent>::table_mut(self).get_mut(r) {
                        Some(c) => c.$($field).+ = value,
                        None => self.warn_invalid::<$ty>(r.raw()),
                    }
                }
            )*
        }
    };
}

scene_table!(Transform, transforms, "transform", create_transform, destroy_transform, is_valid_transform);
scene_table!(Camera, cameras, "camera", create_camera, destroy_camera, is_valid_camera);
scene_table!(Object, objects, "object", create_object, destroy_object, is_valid_object);
scene_table!(Light, lights, "light", create_light, destroy_light, is_valid_light);
scene_table!(RigidBody, rigid_bodies, "rigid body", create_rigid_body, destroy_rigid_body, is_valid_rigid_body);
scene_table!(Collision, collisions, "collision", create_collision, destroy_collision, is_valid_collision);
scene_table!(Script, scripts, "script", create_script, destroy_script, is_valid_script);
scene_table!(Instance, instances, "instance", create_instance, destroy_instance, is_valid_instance);
scene_table!(Anim, anims, "anim", create_anim, destroy_anim, is_valid_anim);
scene_table!(SceneAnim, scene_anims, "scene anim", create_scene_anim, destroy_scene_anim, is_valid_scene_anim);

node_slot!(Transform, Transform, set_node_transform, get_node_transform);
node_slot!(Camera, Camera, set_node_camera, get_node_camera);
node_slot!(Object, Object, set_node_object, get_node_object);
node_slot!(Light, Light, set_node_light, get_node_light);
node_slot!(RigidBody, RigidBody, set_node_rigid_body, get_node_rigid_body);

component_fields!(Transform {
    get_transform_pos / set_transform_pos: Vec3 => trs.pos;
    get_transform_rot / set_transform_rot: Vec3 => trs.rot;
    get_transform_scale / set_transform_scale: Vec3 => trs.scl;
    get_transform_trs / set_transform_trs: Trs => trs;
});

component_fields!(Camera {
    get_camera_zrange / set_camera_zrange: ZRange => zrange;
    get_camera_znear / set_camera_znear: f32 => zrange.znear;
    get_camera_zfar / set_camera_zfar: f32 => zrange.zfar;
    get_camera_fov / set_camera_fov: f32 => fov;
    get_camera_is_ortho / set_camera_is_ortho: bool => ortho;
    get_camera_size / set_camera_size: f32 => size;
});

component_fields!(Object {
    get_object_model / set_object_model: Option<ModelRef> => model;
    get_object_materials / set_object_materials: Vec<MaterialRef> => materials;
    get_object_bones / set_object_bones: Vec<NodeRef> => bones;
});

component_fields!(Light {
    get_light_kind / set_light_kind: LightKind => kind;
    get_light_shadow / set_light_shadow: LightShadow => shadow;
    get_light_diffuse / set_light_diffuse: Vec4 => diffuse;
    get_light_diffuse_intensity / set_light_diffuse_intensity: f32 => diffuse_intensity;
    get_light_specular / set_light_specular: Vec4 => specular;
    get_light_specular_intensity / set_light_specular_intensity: f32 => specular_intensity;
    get_light_radius / set_light_radius: f32 => radius;
    get_light_inner_angle / set_light_inner_angle: f32 => inner_angle;
    get_light_outer_angle / set_light_outer_angle: f32 => outer_angle;
    get_light_pssm_split / set_light_pssm_split: Vec4 => pssm_split;
    get_light_priority / set_light_priority: f32 => priority;
    get_light_shadow_bias / set_light_shadow_bias: f32 => shadow_bias;
});

component_fields!(RigidBody {
    get_rigid_body_kind / set_rigid_body_kind: RigidBodyKind => kind;
    get_rigid_body_linear_damping / set_rigid_body_linear_damping: f32 => linear_damping;
    get_rigid_body_angular_damping / set_rigid_body_angular_damping: f32 => angular_damping;
    get_rigid_body_restitution / set_rigid_body_restitution: f32 => restitution;
    get_rigid_body_friction / set_rigid_body_friction: f32 => friction;
    get_rigid_body_rolling_friction / set_rigid_body_rolling_friction: f32 => rolling_friction;
});

component_fields!(Collision {
    get_collision_kind / set_collision_kind: CollisionKind => kind;
    get_collision_trs / set_collision_trs: Trs => trs;
    get_collision_mass / set_collision_mass: f32 => mass;
    get_collision_size / set_collision_size: Vec3 => size;
    get_collision_resource_path / set_collision_resource_path: String => resource_path;
});

component_fields!(Script {
    get_script_path / set_script_path: String => path;
});

component_fields!(Instance {
    get_instance_path / set_instance_path: String => path;
    get_instance_anim / set_instance_anim: String => anim;
    get_instance_loop_mode / set_instance_loop_mode: AnimLoopMode => loop_mode;
});

impl Scene {
    /// Empty scene with the default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Empty scene with the given configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::new(),
            nodes: GenerationalVectorList::new(),
            transforms: GenerationalVectorList::new(),
            cameras: GenerationalVectorList::new(),
            objects: GenerationalVectorList::new(),
            lights: GenerationalVectorList::new(),
            rigid_bodies: GenerationalVectorList::new(),
            collisions: GenerationalVectorList::new(),
            scripts: GenerationalVectorList::new(),
            instances: GenerationalVectorList::new(),
            anims: GenerationalVectorList::new(),
            scene_anims: GenerationalVectorList::new(),
            play_anims: SlotMap::with_key(),
            node_collisions: BTreeMap::new(),
            node_scripts: BTreeMap::new(),
            node_instance: BTreeMap::new(),
            node_instance_view: BTreeMap::new(),
            node_instance_play: BTreeMap::new(),
            script_detach_events: Vec::new(),
            world: WorldMatrices::default(),
            current_camera: NodeRef::INVALID,
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ---- diagnostics ----

    /// Route warnings to `sink`, returning the previous sink
    pub fn install_diagnostic_sink(&mut self, sink: Box<dyn DiagnosticSink>) -> Box<dyn DiagnosticSink> {
        self.diagnostics.install(sink)
    }

    /// Restore the default `log` sink, returning the removed one
    pub fn remove_diagnostic_sink(&mut self) -> Box<dyn DiagnosticSink> {
        self.diagnostics.remove()
    }

    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        self.diagnostics.warn(args);
    }

    pub(crate) fn warn_invalid<T: SceneComponent>(&self, r: GenRef) {
        self.warn(format_args!("Invalid {} reference {:?}", T::NAME, r));
    }

    pub(crate) fn warn_invalid_node(&self, node: NodeRef) {
        self.warn(format_args!("Invalid node reference {:?}", node));
    }

    // ---- generic component tables ----

    /// Insert a component value
    pub fn create<T: SceneComponent>(&mut self, value: T) -> TypedRef<T> {
        TypedRef::from_raw(T::table_mut(self).add_ref(value))
    }

    /// Remove a component value. Returns false and warns on a stale handle.
    pub fn destroy<T: SceneComponent>(&mut self, r: TypedRef<T>) -> bool {
        let removed = T::table_mut(self).remove_ref(r);
        if !removed {
            self.warn_invalid::<T>(r.raw());
        }
        removed
    }

    /// True while the handle is live
    pub fn is_valid<T: SceneComponent>(&self, r: TypedRef<T>) -> bool {
        T::table(self).is_valid(r)
    }

    /// Component value behind a live handle
    pub fn get<T: SceneComponent>(&self, r: TypedRef<T>) -> Option<&T> {
        T::table(self).get(r)
    }

    /// Mutable component value behind a live handle
    pub fn get_mut<T: SceneComponent>(&mut self, r: TypedRef<T>) -> Option<&mut T> {
        T::table_mut(self).get_mut(r)
    }

    /// Number of live values of type `T`
    pub fn component_count<T: SceneComponent>(&self) -> usize {
        T::table(self).len()
    }

    /// Handles of every live value of type `T`
    pub fn component_refs<T: SceneComponent>(&self) -> Vec<TypedRef<T>> {
        T::table(self).refs().map(TypedRef::from_raw).collect()
    }

    // ---- nodes ----

    /// Create a node with empty component slots
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeRef {
        NodeRef::from_raw(self.nodes.add_ref(Node::new(name)))
    }

    /// Create a node with a fresh transform, optionally parented
    pub fn create_node_with_transform(&mut self, name: impl Into<String>, trs: Trs, parent: NodeRef) -> NodeRef {
        let node = self.create_node(name);
        let transform = self.create_transform(Transform::new(trs));
        self.set_node_transform(node, transform);
        if parent.is_set() {
            self.set_transform_parent(transform, parent);
        }
        node
    }

    /// Destroy a node. Its components stay until the next collection.
    pub fn destroy_node(&mut self, node: NodeRef) {
        if !self.nodes.remove_ref(node) {
            self.warn_invalid_node(node);
        }
    }

    /// True while the node handle is live
    pub fn is_valid_node(&self, node: NodeRef) -> bool {
        self.nodes.is_valid(node)
    }

    /// Node behind a live handle
    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        self.nodes.get(node)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node name, empty on a stale handle
    pub fn get_node_name(&self, node: NodeRef) -> String {
        match self.nodes.get(node) {
            Some(n) => n.name.clone(),
            None => {
                self.warn_invalid_node(node);
                String::new()
            }
        }
    }

    /// Rename a node
    pub fn set_node_name(&mut self, node: NodeRef, name: impl Into<String>) {
        match self.nodes.get_mut(node) {
            Some(n) => n.name = name.into(),
            None => self.warn_invalid_node(node),
        }
    }

    /// Node state bits, empty on a stale handle
    pub fn get_node_flags(&self, node: NodeRef) -> NodeFlags {
        match self.nodes.get(node) {
            Some(n) => n.flags,
            None => {
                self.warn_invalid_node(node);
                NodeFlags::empty()
            }
        }
    }

    /// Every live node
    pub fn get_all_nodes(&self) -> Vec<NodeRef> {
        self.nodes.refs().map(NodeRef::from_raw).collect()
    }

    /// Live nodes that were not created by instantiation
    pub fn get_nodes(&self) -> Vec<NodeRef> {
        self.nodes
            .iter()
            .filter(|(_, n)| !n.is_instantiated())
            .map(|(r, _)| NodeRef::from_raw(r))
            .collect()
    }

    /// First node named `name`, preferring nodes not created by
    /// instantiation. `INVALID` when there is none.
    pub fn get_node(&self, name: &str) -> NodeRef {
        let mut instantiated = NodeRef::INVALID;
        for (r, node) in self.nodes.iter() {
            if node.name != name {
                continue;
            }
            if !node.is_instantiated() {
                return NodeRef::from_raw(r);
            }
            if !instantiated.is_set() {
                instantiated = NodeRef::from_raw(r);
            }
        }
        instantiated
    }

    /// Resolve a `/`-separated path of names, starting from root nodes.
    ///
    /// Instantiated content hangs under its host, so `host/child` reaches
    /// into an instance.
    pub fn get_node_by_path(&self, path: &str) -> NodeRef {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return NodeRef::INVALID;
        };

        let mut current = self
            .nodes
            .iter()
            .find(|(r, n)| n.name == first && !self.get_node_parent(NodeRef::from_raw(*r)).is_set())
            .map_or(NodeRef::INVALID, |(r, _)| NodeRef::from_raw(r));

        for segment in segments {
            if !current.is_set() {
                break;
            }
            current = self
                .get_node_children(current)
                .into_iter()
                .find(|child| self.nodes.get(*child).is_some_and(|n| n.name == segment))
                .unwrap_or(NodeRef::INVALID);
        }
        current
    }

    /// Parent node through the node's transform. `INVALID` for roots,
    /// transform-less nodes and dangling parents.
    pub fn get_node_parent(&self, node: NodeRef) -> NodeRef {
        let Some(n) = self.nodes.get(node) else {
            return NodeRef::INVALID;
        };
        match self.transforms.get(n.component(ComponentKind::Transform)) {
            Some(t) if self.nodes.is_valid(t.parent) => t.parent,
            _ => NodeRef::INVALID,
        }
    }

    /// Direct children of a node
    pub fn get_node_children(&self, node: NodeRef) -> Vec<NodeRef> {
        if !node.is_set() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter_map(|(r, n)| {
                let t = self.transforms.get(n.component(ComponentKind::Transform))?;
                (t.parent == node).then(|| NodeRef::from_raw(r))
            })
            .collect()
    }

    /// Every descendant of a node, depth first
    pub fn get_all_node_children(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut children: BTreeMap<NodeRef, Vec<NodeRef>> = BTreeMap::new();
        for r in self.nodes.refs().map(NodeRef::from_raw) {
            let parent = self.get_node_parent(r);
            if parent.is_set() {
                children.entry(parent).or_default().push(r);
            }
        }

        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if out.len() > self.nodes.len() {
                break;
            }
            if let Some(kids) = children.get(&current) {
                for kid in kids.iter().rev() {
                    out.push(*kid);
                    stack.push(*kid);
                }
            }
        }
        out
    }

    /// True if `parent` is an ancestor of `node` at any depth
    pub fn is_child_of(&self, node: NodeRef, parent: NodeRef) -> bool {
        let mut current = self.get_node_parent(node);
        for _ in 0..self.nodes.len() {
            if !current.is_set() {
                return false;
            }
            if current == parent {
                return true;
            }
            current = self.get_node_parent(current);
        }
        false
    }

    // ---- node component slots ----

    /// Store a component handle in the node's slot for `T`. `INVALID` clears
    /// the slot; a stale handle is rejected with a warning.
    pub fn set_node_component<T: NodeComponent>(&mut self, node: NodeRef, r: TypedRef<T>) {
        if r.is_set() && !T::table(self).is_valid(r) {
            self.warn_invalid::<T>(r.raw());
            return;
        }
        match self.nodes.get_mut(node) {
            Some(n) => n.components[T::KIND.index()] = r.raw(),
            None => self.warn_invalid_node(node),
        }
    }

    /// Component handle in the node's slot for `T`. A slot pointing at a
    /// destroyed component reads as `INVALID`.
    pub fn get_node_component<T: NodeComponent>(&self, node: NodeRef) -> TypedRef<T> {
        let Some(n) = self.nodes.get(node) else {
            self.warn_invalid_node(node);
            return TypedRef::INVALID;
        };
        let r = n.component(T::KIND);
        if T::table(self).is_valid(r) {
            TypedRef::from_raw(r)
        } else {
            TypedRef::INVALID
        }
    }

    /// Append a collision to the node's list
    pub fn add_node_collision(&mut self, node: NodeRef, collision: CollisionRef) {
        if !self.nodes.is_valid(node) {
            return self.warn_invalid_node(node);
        }
        if !self.collisions.is_valid(collision) {
            return self.warn_invalid::<Collision>(collision.raw());
        }
        self.node_collisions.entry(node).or_default().push(collision);
    }

    /// Detach a collision from a node. The component itself is left alone.
    pub fn remove_node_collision(&mut self, node: NodeRef, collision: CollisionRef) -> bool {
        remove_from_list(&mut self.node_collisions, node, collision)
    }

    /// Live collisions of a node in attachment order
    pub fn get_node_collisions(&self, node: NodeRef) -> Vec<CollisionRef> {
        self.node_collisions
            .get(&node)
            .map(|list| list.iter().copied().filter(|c| self.collisions.is_valid(*c)).collect())
            .unwrap_or_default()
    }

    /// Append a script to the node's list
    pub fn add_node_script(&mut self, node: NodeRef, script: ScriptRef) {
        if !self.nodes.is_valid(node) {
            return self.warn_invalid_node(node);
        }
        if !self.scripts.is_valid(script) {
            return self.warn_invalid::<Script>(script.raw());
        }
        self.node_scripts.entry(node).or_default().push(script);
    }

    /// Detach a script from a node. The component itself is left alone.
    pub fn remove_node_script(&mut self, node: NodeRef, script: ScriptRef) -> bool {
        remove_from_list(&mut self.node_scripts, node, script)
    }

    /// Live scripts of a node in attachment order
    pub fn get_node_scripts(&self, node: NodeRef) -> Vec<ScriptRef> {
        self.node_scripts
            .get(&node)
            .map(|list| list.iter().copied().filter(|s| self.scripts.is_valid(*s)).collect())
            .unwrap_or_default()
    }

    /// Scripts detached by garbage collection since the last call
    pub fn take_script_detach_events(&mut self) -> Vec<ScriptDetach> {
        std::mem::take(&mut self.script_detach_events)
    }

    /// Parameter of a script, `None` when missing or on a stale handle
    pub fn get_script_param(&self, script: ScriptRef, name: &str) -> Option<ScriptParam> {
        match self.scripts.get(script) {
            Some(s) => s.param(name).cloned(),
            None => {
                self.warn_invalid::<Script>(script.raw());
                None
            }
        }
    }

    /// Set a script parameter
    pub fn set_script_param(&mut self, script: ScriptRef, name: impl Into<String>, value: ScriptParam) {
        match self.scripts.get_mut(script) {
            Some(s) => {
                s.set_param(name, value);
            }
            None => self.warn_invalid::<Script>(script.raw()),
        }
    }

    /// Link an instance component to a node, `INVALID` removes the link.
    ///
    /// Replacing the link does not touch content already instantiated for
    /// the previous component; call `node_destroy_instance` first.
    pub fn set_node_instance(&mut self, node: NodeRef, instance: InstanceRef) {
        if !self.nodes.is_valid(node) {
            return self.warn_invalid_node(node);
        }
        if !instance.is_set() {
            self.node_instance.remove(&node);
            return;
        }
        if !self.instances.is_valid(instance) {
            return self.warn_invalid::<Instance>(instance.raw());
        }
        self.node_instance.insert(node, instance);
    }

    /// Instance linked to a node, `INVALID` when none or stale
    pub fn get_node_instance(&self, node: NodeRef) -> InstanceRef {
        self.node_instance
            .get(&node)
            .copied()
            .filter(|i| self.instances.is_valid(*i))
            .unwrap_or(InstanceRef::INVALID)
    }

    /// Camera node used for rendering
    pub fn set_current_camera(&mut self, node: NodeRef) {
        if node.is_set() && !self.nodes.is_valid(node) {
            return self.warn_invalid_node(node);
        }
        self.current_camera = node;
    }

    /// Current camera node, `INVALID` once it has been destroyed
    pub fn current_camera(&self) -> NodeRef {
        if self.nodes.is_valid(self.current_camera) {
            self.current_camera
        } else {
            NodeRef::INVALID
        }
    }

    // ---- frame ----

    /// Advance playing animations, then recompute world matrices
    pub fn update(&mut self, dt: f32) {
        self.update_animations(dt);

        self.store_previous_world_matrices();
        self.ready_world_matrices();
        self.compute_world_matrices();
        self.fixup_previous_world_matrices();
    }

    // ---- whole-scene operations ----

    /// Clone nodes with their components. Parents inside the duplicated set
    /// are remapped to the copies, parents outside it are kept. Instance
    /// links are copied, instantiated content is not.
    pub fn duplicate_nodes(&mut self, nodes: &[NodeRef]) -> SceneView {
        let mut remap = BTreeMap::new();
        let mut view = SceneView::default();

        for &src in nodes {
            let Some(node) = self.nodes.get(src) else {
                self.warn_invalid_node(src);
                continue;
            };
            let copy = Node {
                name: node.name.clone(),
                flags: node.flags & NodeFlags::DISABLED,
                components: Default::default(),
            };
            let dst = NodeRef::from_raw(self.nodes.add_ref(copy));
            remap.insert(src, dst);
            view.nodes.push(dst);
        }

        for (&src, &dst) in &remap {
            self.duplicate_slot::<Transform>(src, dst);
            self.duplicate_slot::<Camera>(src, dst);
            self.duplicate_slot::<Object>(src, dst);
            self.duplicate_slot::<Light>(src, dst);
            self.duplicate_slot::<RigidBody>(src, dst);

            let transform = self.get_node_transform(dst);
            if let Some(t) = self.transforms.get_mut(transform) {
                if let Some(parent) = remap.get(&t.parent) {
                    t.parent = *parent;
                }
            }

            for c in self.get_node_collisions(src) {
                if let Some(value) = self.collisions.get(c).cloned() {
                    let copy = self.create_collision(value);
                    self.add_node_collision(dst, copy);
                }
            }
            for s in self.get_node_scripts(src) {
                if let Some(value) = self.scripts.get(s).cloned() {
                    let copy = self.create_script(value);
                    self.add_node_script(dst, copy);
                }
            }
            let instance = self.get_node_instance(src);
            if let Some(value) = self.instances.get(instance).cloned() {
                let copy = self.create_instance(value);
                self.set_node_instance(dst, copy);
            }
        }
        view
    }

    fn duplicate_slot<T: NodeComponent>(&mut self, src: NodeRef, dst: NodeRef) {
        let r = self.get_node_component::<T>(src);
        if let Some(value) = self.get(r).cloned() {
            let copy = self.create(value);
            self.set_node_component(dst, copy);
        }
    }

    /// Repack every table whose storage-to-live ratio exceeds the configured
    /// threshold. Returns the number of tables repacked.
    pub fn compact_components(&mut self) -> usize {
        let threshold = self.config.compaction_threshold;
        let compacted = compact_table(&mut self.nodes, threshold)
            + compact_table(&mut self.transforms, threshold)
            + compact_table(&mut self.cameras, threshold)
            + compact_table(&mut self.objects, threshold)
            + compact_table(&mut self.lights, threshold)
            + compact_table(&mut self.rigid_bodies, threshold)
            + compact_table(&mut self.collisions, threshold)
            + compact_table(&mut self.scripts, threshold)
            + compact_table(&mut self.instances, threshold)
            + compact_table(&mut self.anims, threshold)
            + compact_table(&mut self.scene_anims, threshold);
        if compacted > 0 {
            log::debug!("Compacted {} scene tables", compacted);
        }
        compacted
    }

    /// Drop every node, component, animation and link. Outstanding handles
    /// stay invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.transforms.clear();
        self.cameras.clear();
        self.objects.clear();
        self.lights.clear();
        self.rigid_bodies.clear();
        self.collisions.clear();
        self.scripts.clear();
        self.instances.clear();
        self.anims.clear();
        self.scene_anims.clear();
        self.play_anims.clear();
        self.node_collisions.clear();
        self.node_scripts.clear();
        self.node_instance.clear();
        self.node_instance_view.clear();
        self.node_instance_play.clear();
        self.script_detach_events.clear();
        self.world = WorldMatrices::default();
        self.current_camera = NodeRef::INVALID;
    }
}

fn compact_table<T>(table: &mut GenerationalVectorList<T>, threshold: f32) -> usize {
    if table.fragmentation() > threshold {
        table.compact();
        1
    } else {
        0
    }
}

fn remove_from_list<T: PartialEq>(map: &mut BTreeMap<NodeRef, Vec<T>>, node: NodeRef, item: T) -> bool {
    let Some(list) = map.get_mut(&node) else {
        return false;
    };
    let before = list.len();
    list.retain(|x| *x != item);
    let removed = list.len() != before;
    if list.is_empty() {
        map.remove(&node);
    }
    removed
}
