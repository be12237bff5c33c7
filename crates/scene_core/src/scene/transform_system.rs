//! Transform hierarchy and world matrices
//!
//! World matrices are cached per transform index for one frame. Each cached
//! entry remembers the generation of the transform that produced it, so an
//! index reused by a new transform is never served its predecessor's matrix.
//!
//! Frame protocol, driven by [`Scene::update`]:
//!
//! 1. `store_previous_world_matrices` keeps last frame's results
//! 2. `ready_world_matrices` sizes the cache and clears the computed flags
//! 3. `compute_world_matrices` fills every live entry, memoised
//! 4. `fixup_previous_world_matrices` backfills the previous matrix of
//!    transforms that did not exist last frame
//!
//! Edits made during a frame (TRS setters, reparenting) show up in world
//! matrices at the next `update`. Only `set_transform_world` writes through.

use crate::foundation::collections::GenRef;
use crate::foundation::math::{inverse_or_identity, Mat4, Trs};
use crate::scene::components::{ComponentKind, Transform, TransformRef};
use crate::scene::{NodeRef, Scene};

const NO_GEN: u32 = u32::MAX;

/// Per-frame world matrix cache indexed by transform index
#[derive(Debug, Default, Clone)]
pub(crate) struct WorldMatrices {
    current: Vec<Mat4>,
    computed: Vec<bool>,
    current_gens: Vec<u32>,
    previous: Vec<Mat4>,
    previous_gens: Vec<u32>,
}

impl WorldMatrices {
    fn ready(&mut self, len: usize) {
        self.current.resize(len, Mat4::identity());
        self.computed.clear();
        self.computed.resize(len, false);
        self.current_gens.clear();
        self.current_gens.resize(len, NO_GEN);
    }

    fn cached(&self, r: GenRef) -> Option<Mat4> {
        let i = r.idx() as usize;
        match (self.computed.get(i), self.current_gens.get(i)) {
            (Some(true), Some(gen)) if *gen == r.gen() => Some(self.current[i]),
            _ => None,
        }
    }

    fn previous(&self, r: GenRef) -> Option<Mat4> {
        let i = r.idx() as usize;
        match self.previous_gens.get(i) {
            Some(gen) if *gen == r.gen() => Some(self.previous[i]),
            _ => None,
        }
    }

    fn store(&mut self, r: GenRef, world: Mat4) {
        let i = r.idx() as usize;
        if i >= self.current.len() {
            self.current.resize(i + 1, Mat4::identity());
            self.computed.resize(i + 1, false);
            self.current_gens.resize(i + 1, NO_GEN);
        }
        self.current[i] = world;
        self.computed[i] = true;
        self.current_gens[i] = r.gen();
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        std::mem::swap(&mut self.current_gens, &mut self.previous_gens);
        self.computed.fill(false);
    }

    fn fixup_previous(&mut self) {
        let len = self.current.len();
        self.previous.resize(len, Mat4::identity());
        self.previous_gens.resize(len, NO_GEN);
        for i in 0..len {
            if self.computed[i] && self.previous_gens[i] != self.current_gens[i] {
                self.previous[i] = self.current[i];
                self.previous_gens[i] = self.current_gens[i];
            }
        }
    }
}

impl Scene {
    /// Swap the current world matrices into the previous-frame slot
    pub fn store_previous_world_matrices(&mut self) {
        self.world.swap();
    }

    /// Size the cache to the transform table and mark every entry stale
    pub fn ready_world_matrices(&mut self) {
        let len = self.transforms.capacity();
        self.world.ready(len);
    }

    /// Compute the world matrix of every live transform
    pub fn compute_world_matrices(&mut self) {
        let refs: Vec<GenRef> = self.transforms.refs().collect();
        for r in refs {
            self.memoise_world(r);
        }
        log::trace!("Computed {} world matrices", self.transforms.len());
    }

    /// Give transforms that were absent last frame a previous matrix equal
    /// to their current one
    pub fn fixup_previous_world_matrices(&mut self) {
        self.world.fixup_previous();
    }

    /// Transform of `t`'s parent node, when the chain is intact
    pub(crate) fn parent_transform(&self, t: GenRef) -> Option<GenRef> {
        let parent = self.transforms.get(t)?.parent;
        let pt = self.nodes.get(parent)?.component(ComponentKind::Transform);
        self.transforms.is_valid(pt).then_some(pt)
    }

    /// Transforms from `t` up to (excluding) the first ancestor with a
    /// cached matrix, plus that ancestor's matrix or identity at a root.
    fn uncached_chain(&self, t: GenRef) -> (Vec<GenRef>, Mat4) {
        let mut chain = vec![t];
        let mut cursor = t;
        while let Some(parent) = self.parent_transform(cursor) {
            if let Some(world) = self.world.cached(parent) {
                return (chain, world);
            }
            // a loop can only come from reassigning node slots; treat its top as a root
            if chain.len() > self.transforms.len() {
                break;
            }
            chain.push(parent);
            cursor = parent;
        }
        (chain, Mat4::identity())
    }

    fn local_matrix_of(&self, t: GenRef) -> Mat4 {
        self.transforms
            .get(t)
            .map_or_else(Mat4::identity, Transform::local_matrix)
    }

    fn memoise_world(&mut self, t: GenRef) -> Mat4 {
        if let Some(world) = self.world.cached(t) {
            return world;
        }
        let (mut chain, mut world) = self.uncached_chain(t);
        while let Some(link) = chain.pop() {
            world *= self.local_matrix_of(link);
            self.world.store(link, world);
        }
        world
    }

    fn evaluate_world(&self, t: GenRef) -> Mat4 {
        if let Some(world) = self.world.cached(t) {
            return world;
        }
        let (chain, parent_world) = self.uncached_chain(t);
        chain
            .iter()
            .rev()
            .fold(parent_world, |world, link| world * self.local_matrix_of(*link))
    }

    /// World matrix of a transform, from the cache or computed on demand.
    /// Identity on a stale handle.
    pub fn get_transform_world(&self, t: TransformRef) -> Mat4 {
        if !self.transforms.is_valid(t) {
            self.warn_invalid::<Transform>(t.raw());
            return Mat4::identity();
        }
        self.evaluate_world(t.raw())
    }

    /// Like [`get_transform_world`](Self::get_transform_world) but caches
    /// every matrix it computes for the rest of the frame
    pub fn compute_transform_world(&mut self, t: TransformRef) -> Mat4 {
        if !self.transforms.is_valid(t) {
            self.warn_invalid::<Transform>(t.raw());
            return Mat4::identity();
        }
        self.memoise_world(t.raw())
    }

    /// Last frame's world matrix, or the current one for a transform that
    /// did not exist last frame
    pub fn get_transform_previous_world(&self, t: TransformRef) -> Mat4 {
        if !self.transforms.is_valid(t) {
            self.warn_invalid::<Transform>(t.raw());
            return Mat4::identity();
        }
        self.world
            .previous(t.raw())
            .unwrap_or_else(|| self.evaluate_world(t.raw()))
    }

    /// Set the local TRS so the transform lands on `world` under its
    /// current parent
    pub fn set_transform_world(&mut self, t: TransformRef, world: Mat4) {
        if !self.transforms.is_valid(t) {
            return self.warn_invalid::<Transform>(t.raw());
        }
        let parent_world = self
            .parent_transform(t.raw())
            .map_or_else(Mat4::identity, |p| self.evaluate_world(p));
        let local = inverse_or_identity(&parent_world) * world;

        if let Some(transform) = self.transforms.get_mut(t) {
            transform.trs = Trs::from_matrix(&local);
        }
        self.world.store(t.raw(), world);
    }

    /// Local matrix (T * R * S), identity on a stale handle
    pub fn get_transform_local_matrix(&self, t: TransformRef) -> Mat4 {
        match self.transforms.get(t) {
            Some(transform) => transform.local_matrix(),
            None => {
                self.warn_invalid::<Transform>(t.raw());
                Mat4::identity()
            }
        }
    }

    /// Set the local TRS by decomposing a matrix
    pub fn set_transform_local_matrix(&mut self, t: TransformRef, local: Mat4) {
        match self.transforms.get_mut(t) {
            Some(transform) => transform.trs = Trs::from_matrix(&local),
            None => self.warn_invalid::<Transform>(t.raw()),
        }
    }

    /// Parent node of a transform as stored, possibly dangling
    pub fn get_transform_parent(&self, t: TransformRef) -> NodeRef {
        match self.transforms.get(t) {
            Some(transform) => transform.parent,
            None => {
                self.warn_invalid::<Transform>(t.raw());
                NodeRef::INVALID
            }
        }
    }

    /// Reparent a transform under `parent`, `INVALID` detaches it.
    ///
    /// Rejected with a warning when `parent` is stale or when `t` already
    /// appears in `parent`'s ancestor chain.
    pub fn set_transform_parent(&mut self, t: TransformRef, parent: NodeRef) {
        if !self.transforms.is_valid(t) {
            return self.warn_invalid::<Transform>(t.raw());
        }
        if parent.is_set() && !self.nodes.is_valid(parent) {
            return self.warn(format_args!("Cannot parent {:?} to invalid node {:?}", t, parent));
        }
        if self.is_ancestor_transform(t.raw(), parent) {
            let name = self.nodes.get(parent).map_or("", |n| n.name.as_str());
            return self.warn(format_args!(
                "Parenting {:?} to node '{}' would create a cycle, ignored",
                t, name
            ));
        }
        if let Some(transform) = self.transforms.get_mut(t) {
            transform.parent = parent;
        }
    }

    /// True if `t` is the transform of `node` or of one of its ancestors
    pub(crate) fn is_ancestor_transform(&self, t: GenRef, node: NodeRef) -> bool {
        let mut current = node;
        for _ in 0..=self.nodes.len() {
            let Some(n) = self.nodes.get(current) else {
                return false;
            };
            let nt = n.component(ComponentKind::Transform);
            if nt == t {
                return true;
            }
            match self.transforms.get(nt) {
                Some(transform) => current = transform.parent,
                None => return false,
            }
        }
        // longer than the node count: already looping, refuse to extend it
        true
    }

    /// World matrix of a node's transform, identity when it has none
    pub fn get_node_world(&self, node: NodeRef) -> Mat4 {
        let t = self.get_node_transform(node);
        if self.transforms.is_valid(t) {
            self.evaluate_world(t.raw())
        } else {
            Mat4::identity()
        }
    }
}
