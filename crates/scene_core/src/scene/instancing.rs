//! Nested scene instancing
//!
//! A node carrying an [`Instance`] component can load another scene into
//! the current one. Everything the load creates is recorded in a
//! [`SceneView`] owned by the host node, so the content can be enabled,
//! disabled, moved and destroyed as a unit.
//!
//! Instantiated nodes are flagged `INSTANTIATED`. Their `INSTANCE_DISABLED`
//! bit mirrors the host's effective state and is refreshed whenever the host
//! is enabled, disabled or moved; the nodes' own `DISABLED` bit is never
//! touched by instancing.

use crate::scene::animation::{AnimRef, SceneAnimRef};
use crate::scene::components::{ComponentKind, Instance};
use crate::scene::{NodeFlags, NodeRef, Scene, SceneError};

/// Content created by one scene load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneView {
    /// Created nodes
    pub nodes: Vec<NodeRef>,
    /// Created clips
    pub anims: Vec<AnimRef>,
    /// Created scene animations
    pub scene_anims: Vec<SceneAnimRef>,
}

impl SceneView {
    /// True when the load created nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.anims.is_empty() && self.scene_anims.is_empty()
    }

    /// First node of the view named `name`
    pub fn get_node(&self, scene: &Scene, name: &str) -> NodeRef {
        self.nodes
            .iter()
            .copied()
            .find(|n| scene.node(*n).is_some_and(|node| node.name == name))
            .unwrap_or(NodeRef::INVALID)
    }

    /// First scene animation of the view named `name`
    pub fn get_scene_anim(&self, scene: &Scene, name: &str) -> SceneAnimRef {
        self.scene_anims
            .iter()
            .copied()
            .find(|a| scene.get(*a).is_some_and(|anim| anim.name == name))
            .unwrap_or(SceneAnimRef::INVALID)
    }
}

/// State threaded through one scene load
#[derive(Debug, Clone, Default)]
pub struct LoadSceneContext {
    /// Everything the loader created; loaders must record each node,
    /// clip and scene animation here
    pub view: SceneView,
    /// Nesting depth of this load, 0 for a top-level scene
    pub recursion_level: u32,
}

impl LoadSceneContext {
    /// Empty context at the given depth
    pub fn new(recursion_level: u32) -> Self {
        Self {
            view: SceneView::default(),
            recursion_level,
        }
    }
}

/// Builds scene content from a path.
///
/// Loaders create nodes and components through the regular [`Scene`] API
/// and record what they create in `ctx.view`. Nested instances are expanded
/// by the scene afterwards; loaders only attach the instance components.
pub trait SceneLoader {
    /// Load the scene at `path` into `scene`
    fn load_scene(&mut self, path: &str, scene: &mut Scene, ctx: &mut LoadSceneContext) -> Result<(), SceneError>;
}

impl Scene {
    /// Load a top-level scene and expand its instances
    pub fn load_scene(&mut self, path: &str, loader: &mut dyn SceneLoader) -> Result<SceneView, SceneError> {
        let mut ctx = LoadSceneContext::new(0);
        loader.load_scene(path, self, &mut ctx)?;

        for host in self.hosts_in(&ctx.view) {
            if let Err(err) = self.node_setup_instance(host, loader, 0) {
                self.warn(format_args!("Instance setup failed in '{}': {}", path, err));
            }
        }
        log::debug!("Loaded scene '{}' ({} nodes)", path, ctx.view.nodes.len());
        Ok(ctx.view)
    }

    fn hosts_in(&self, view: &SceneView) -> Vec<NodeRef> {
        view.nodes
            .iter()
            .copied()
            .filter(|n| self.node_instance.contains_key(n))
            .collect()
    }

    /// Load the scene named by the node's instance component under the node.
    ///
    /// At `recursion_level >= max_instance_recursion` nothing happens.
    /// Content from a previous setup is destroyed first. Nested instances
    /// are expanded one level deeper; their failures are reported as
    /// warnings, only a failure of this node's own load is returned.
    pub fn node_setup_instance(
        &mut self,
        node: NodeRef,
        loader: &mut dyn SceneLoader,
        recursion_level: u32,
    ) -> Result<(), SceneError> {
        if recursion_level >= self.config().max_instance_recursion {
            log::trace!("Instance recursion limit reached at {:?}", node);
            return Ok(());
        }
        if !self.is_valid_node(node) {
            self.warn_invalid_node(node);
            return Err(SceneError::InvalidHost(node));
        }
        let Some(instance) = self.get(self.get_node_instance(node)).cloned() else {
            return Ok(());
        };
        if instance.path.is_empty() {
            return Ok(());
        }

        self.teardown_instance(node);

        let mut ctx = LoadSceneContext::new(recursion_level + 1);
        let loaded = loader.load_scene(&instance.path, self, &mut ctx);

        // partial content from a failed load is still attached so it can be torn down
        self.adopt_view(node, &ctx.view);
        self.node_instance_view.insert(node, ctx.view.clone());
        loaded?;

        for host in self.hosts_in(&ctx.view) {
            if let Err(err) = self.node_setup_instance(host, loader, recursion_level + 1) {
                self.warn(format_args!("Nested instance setup failed under '{}': {}", instance.path, err));
            }
        }

        if !instance.anim.is_empty() {
            self.node_start_on_instantiate_anim(node);
        }
        log::debug!(
            "Instantiated '{}' under {:?} at level {} ({} nodes)",
            instance.path,
            node,
            recursion_level,
            ctx.view.nodes.len()
        );
        Ok(())
    }

    /// Flag the view's nodes as instantiated and hang its roots under `host`
    fn adopt_view(&mut self, host: NodeRef, view: &SceneView) {
        let host_enabled = self.is_node_effectively_enabled(host);

        for &n in &view.nodes {
            let Some(node) = self.nodes.get_mut(n) else {
                continue;
            };
            node.flags.insert(NodeFlags::INSTANTIATED);
            node.flags.set(NodeFlags::INSTANCE_DISABLED, !host_enabled);

            let t = node.component(ComponentKind::Transform);
            if let Some(transform) = self.transforms.get_mut(t) {
                if !transform.parent.is_set() {
                    transform.parent = host;
                }
            }
        }
    }

    /// Destroy everything instantiated under `node`, nested content first
    pub fn node_destroy_instance(&mut self, node: NodeRef) {
        if !self.is_valid_node(node) && !self.node_instance_view.contains_key(&node) {
            return self.warn_invalid_node(node);
        }
        let destroyed = self.teardown_instance(node);
        if destroyed > 0 {
            log::debug!("Destroyed instance under {:?} ({} entries)", node, destroyed);
        }
    }

    /// Tear down the view of `host` whether or not the host is still live.
    /// Returns the number of nodes, clips and scene animations destroyed.
    pub(crate) fn teardown_instance(&mut self, host: NodeRef) -> usize {
        if let Some(key) = self.node_instance_play.remove(&host) {
            self.play_anims.remove(key);
        }
        let Some(view) = self.node_instance_view.remove(&host) else {
            return 0;
        };

        let mut destroyed = 0;
        for &n in &view.nodes {
            if self.node_instance_view.contains_key(&n) {
                destroyed += self.teardown_instance(n);
            }
            if self.nodes.remove_ref(n) {
                destroyed += 1;
            }
        }
        for &a in &view.scene_anims {
            if self.scene_anims.remove_ref(a) {
                destroyed += 1;
            }
        }
        for &a in &view.anims {
            if self.anims.remove_ref(a) {
                destroyed += 1;
            }
        }
        self.play_anims
            .retain(|_, play| !view.scene_anims.contains(&play.scene_anim));
        destroyed
    }

    /// Transfer instantiated content and the instance link from `from` to
    /// `to` without reloading
    pub fn node_move_instance(&mut self, from: NodeRef, to: NodeRef) {
        if !self.is_valid_node(from) {
            return self.warn_invalid_node(from);
        }
        if !self.is_valid_node(to) {
            return self.warn_invalid_node(to);
        }
        if from == to {
            return;
        }
        if self.node_instance_view.contains_key(&to) {
            return self.warn(format_args!("Node {:?} already hosts an instance, move ignored", to));
        }
        if self.view_contains(from, to) {
            return self.warn(format_args!("Cannot move an instance into its own content {:?}", to));
        }
        if self.view_root_above(from, to) {
            return self.warn(format_args!("Cannot move an instance below its own content {:?}", to));
        }

        if let Some(instance) = self.node_instance.remove(&from) {
            self.node_instance.insert(to, instance);
        }
        if let Some(key) = self.node_instance_play.remove(&from) {
            self.node_instance_play.insert(to, key);
        }
        let Some(view) = self.node_instance_view.remove(&from) else {
            return;
        };

        for &n in &view.nodes {
            let t = self.get_node_transform(n);
            if let Some(transform) = self.transforms.get_mut(t) {
                if transform.parent == from {
                    transform.parent = to;
                }
            }
        }
        self.node_instance_view.insert(to, view);
        self.refresh_instance_state(to);
    }

    /// True if `node` was created by the instance hosted on `host`, at any depth
    fn view_contains(&self, host: NodeRef, node: NodeRef) -> bool {
        let Some(view) = self.node_instance_view.get(&host) else {
            return false;
        };
        view.nodes
            .iter()
            .any(|n| *n == node || self.view_contains(*n, node))
    }

    /// True if a root of the view hosted on `host` is an ancestor of `node`.
    /// Reparenting such a root under `node` would close a loop.
    fn view_root_above(&self, host: NodeRef, node: NodeRef) -> bool {
        let Some(view) = self.node_instance_view.get(&host) else {
            return false;
        };
        view.nodes.iter().any(|n| {
            let Some(t) = self.nodes.get(*n).map(|root| root.component(ComponentKind::Transform)) else {
                return false;
            };
            self.transforms.get(t).is_some_and(|transform| transform.parent == host)
                && self.is_ancestor_transform(t, node)
        })
    }

    /// Clear the node's `DISABLED` bit
    pub fn enable_node(&mut self, node: NodeRef) {
        self.set_node_disabled(node, false);
    }

    /// Set the node's `DISABLED` bit
    pub fn disable_node(&mut self, node: NodeRef) {
        self.set_node_disabled(node, true);
    }

    fn set_node_disabled(&mut self, node: NodeRef, disabled: bool) {
        match self.nodes.get_mut(node) {
            Some(n) => n.flags.set(NodeFlags::DISABLED, disabled),
            None => return self.warn_invalid_node(node),
        }
        self.refresh_instance_state(node);
    }

    /// Mirror the host's effective state into `INSTANCE_DISABLED` of its
    /// instantiated content, nested content included
    fn refresh_instance_state(&mut self, host: NodeRef) {
        let enabled = self.nodes.get(host).is_some_and(|n| n.is_effectively_enabled());
        let Some(nodes) = self.node_instance_view.get(&host).map(|v| v.nodes.clone()) else {
            return;
        };
        for n in nodes {
            if let Some(node) = self.nodes.get_mut(n) {
                node.flags.set(NodeFlags::INSTANCE_DISABLED, !enabled);
            }
            self.refresh_instance_state(n);
        }
    }

    /// Not disabled by the user. False on a stale handle.
    pub fn is_node_enabled(&self, node: NodeRef) -> bool {
        match self.nodes.get(node) {
            Some(n) => n.is_enabled(),
            None => {
                self.warn_invalid_node(node);
                false
            }
        }
    }

    /// Neither disabled by the user nor through its hosting instance
    pub fn is_node_effectively_enabled(&self, node: NodeRef) -> bool {
        match self.nodes.get(node) {
            Some(n) => n.is_effectively_enabled(),
            None => {
                self.warn_invalid_node(node);
                false
            }
        }
    }

    /// Content instantiated under a host, if any
    pub fn get_node_instance_view(&self, node: NodeRef) -> Option<&SceneView> {
        self.node_instance_view.get(&node)
    }

    /// Start the scene animation named by the host's instance component.
    /// Returns false when there is nothing to play.
    pub fn node_start_on_instantiate_anim(&mut self, node: NodeRef) -> bool {
        self.node_stop_on_instantiate_anim(node);

        let Some(Instance { anim, loop_mode, .. }) = self.get(self.get_node_instance(node)).cloned() else {
            return false;
        };
        let scene_anim = match self.node_instance_view.get(&node) {
            Some(view) => view.get_scene_anim(self, &anim),
            None => return false,
        };
        if !scene_anim.is_set() {
            self.warn(format_args!("Instance animation '{}' not found under {:?}", anim, node));
            return false;
        }
        let key = self.play_anim(scene_anim, loop_mode, 1.0);
        self.node_instance_play.insert(node, key);
        true
    }

    /// Stop the host's on-instantiate animation if it is still playing
    pub fn node_stop_on_instantiate_anim(&mut self, node: NodeRef) {
        if let Some(key) = self.node_instance_play.remove(&node) {
            self.play_anims.remove(key);
        }
    }
}
