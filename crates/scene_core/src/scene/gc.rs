//! Garbage collection of unreferenced components
//!
//! Destroying a node leaves its components in their tables. A collection
//! pass marks every component still reachable from a live node and sweeps
//! the rest:
//!
//! - slot components (transform, camera, object, light, rigid body) are
//!   reachable through a live node's slot
//! - collisions and scripts are reachable through the per-node lists; list
//!   entries of destroyed nodes are dropped first, and every script dropped
//!   that way is reported as a [`ScriptDetach`](crate::scene::ScriptDetach)
//! - instances are reachable through the host link; content instantiated
//!   under a destroyed host is torn down before the link is dropped
//!
//! Instances are collected first: tearing down content destroys nodes, and
//! the slot and list sweeps that follow reclaim their components in the
//! same pass. [`Scene::garbage_collect`] still repeats passes until one
//! removes nothing.

use crate::foundation::collections::{GenRef, GenerationalVectorList, TypedRef};
use crate::scene::components::{
    Camera, Light, NodeComponent, Object, RigidBody, SceneComponent, Transform,
};
use crate::scene::{NodeRef, Scene, ScriptDetach};

impl Scene {
    /// Run collection passes until one removes nothing (bounded by
    /// `max_gc_passes`). Returns the total number of entries removed.
    pub fn garbage_collect(&mut self) -> usize {
        let mut total = 0;
        for pass in 0..self.config().max_gc_passes {
            let removed = self.garbage_collect_pass();
            total += removed;
            if removed == 0 {
                log::debug!("Garbage collection removed {} entries in {} passes", total, pass + 1);
                return total;
            }
        }
        log::warn!(
            "Garbage collection stopped after {} passes, {} entries removed",
            self.config().max_gc_passes,
            total
        );
        total
    }

    /// One mark and sweep over every component table. Returns the number
    /// of components, nodes, clips and scene animations removed.
    pub fn garbage_collect_pass(&mut self) -> usize {
        let mut removed = self.collect_instances();
        removed += self.collect_slot_components::<Transform>();
        removed += self.collect_slot_components::<Camera>();
        removed += self.collect_slot_components::<Object>();
        removed += self.collect_slot_components::<Light>();
        removed += self.collect_slot_components::<RigidBody>();
        removed += self.collect_collisions();
        removed += self.collect_scripts();
        removed
    }

    fn collect_slot_components<T: NodeComponent>(&mut self) -> usize {
        let table = T::table(self);
        let mut marked = vec![false; table.capacity()];
        for (_, node) in self.nodes.iter() {
            let r = node.component(T::KIND);
            if table.is_valid(r) {
                marked[r.idx() as usize] = true;
            }
        }
        sweep(T::table_mut(self), &marked)
    }

    fn collect_collisions(&mut self) -> usize {
        let nodes = &self.nodes;
        self.node_collisions.retain(|node, _| nodes.is_valid(*node));

        let collisions = &self.collisions;
        let mut marked = vec![false; collisions.capacity()];
        for list in self.node_collisions.values_mut() {
            list.retain(|c| collisions.is_valid(*c));
            mark(&mut marked, list);
        }
        sweep(&mut self.collisions, &marked)
    }

    fn collect_scripts(&mut self) -> usize {
        let dead: Vec<NodeRef> = self
            .node_scripts
            .keys()
            .copied()
            .filter(|node| !self.nodes.is_valid(*node))
            .collect();
        for node in dead {
            if let Some(list) = self.node_scripts.remove(&node) {
                let scripts = &self.scripts;
                self.script_detach_events.extend(
                    list.into_iter()
                        .filter(|s| scripts.is_valid(*s))
                        .map(|script| ScriptDetach { node, script }),
                );
            }
        }

        let scripts = &self.scripts;
        let mut marked = vec![false; scripts.capacity()];
        for list in self.node_scripts.values_mut() {
            list.retain(|s| scripts.is_valid(*s));
            mark(&mut marked, list);
        }
        sweep(&mut self.scripts, &marked)
    }

    fn collect_instances(&mut self) -> usize {
        let mut removed = 0;

        let mut dead_hosts: Vec<NodeRef> = self
            .node_instance
            .keys()
            .chain(self.node_instance_view.keys())
            .copied()
            .filter(|host| !self.nodes.is_valid(*host))
            .collect();
        dead_hosts.sort_unstable();
        dead_hosts.dedup();

        for host in dead_hosts {
            removed += self.teardown_instance(host);
        }
        // nested hosts die with their parent view
        let nodes = &self.nodes;
        self.node_instance.retain(|host, _| nodes.is_valid(*host));

        let instances = &self.instances;
        let mut marked = vec![false; instances.capacity()];
        for instance in self.node_instance.values() {
            if instances.is_valid(*instance) {
                marked[instance.idx() as usize] = true;
            }
        }
        removed + sweep(&mut self.instances, &marked)
    }
}

fn mark<T>(marked: &mut [bool], refs: &[TypedRef<T>]) {
    for r in refs {
        marked[r.idx() as usize] = true;
    }
}

/// Remove every live entry whose index is not marked
fn sweep<T>(table: &mut GenerationalVectorList<T>, marked: &[bool]) -> usize {
    let orphans: Vec<GenRef> = table
        .refs()
        .filter(|r| !marked.get(r.idx() as usize).copied().unwrap_or(false))
        .collect();
    for r in &orphans {
        table.remove_ref(*r);
    }
    orphans.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Trs;
    use crate::scene::components::{CollisionFactory, Script};

    #[test]
    fn test_destroyed_node_components_are_reclaimed() {
        let mut scene = Scene::new();
        let keep = scene.create_node_with_transform("keep", Trs::identity(), NodeRef::INVALID);
        let gone = scene.create_node_with_transform("gone", Trs::identity(), NodeRef::INVALID);
        let camera = scene.create_camera(Camera::default());
        scene.set_node_camera(gone, camera);
        let gone_t = scene.get_node_transform(gone);

        scene.destroy_node(gone);
        let removed = scene.garbage_collect();

        assert_eq!(removed, 2);
        assert!(!scene.is_valid_transform(gone_t));
        assert!(!scene.is_valid_camera(camera));
        assert!(scene.is_valid_transform(scene.get_node_transform(keep)));
        assert_eq!(scene.garbage_collect(), 0);
    }

    #[test]
    fn test_unattached_components_are_collected() {
        let mut scene = Scene::new();
        let light = scene.create_light(Light::default());
        let collision = scene.create_collision(CollisionFactory::sphere(1.0, 1.0));
        assert_eq!(scene.garbage_collect(), 2);
        assert!(!scene.is_valid_light(light));
        assert!(!scene.is_valid_collision(collision));
    }

    #[test]
    fn test_collision_list_keeps_components_alive() {
        let mut scene = Scene::new();
        let node = scene.create_node("body");
        let a = scene.create_collision(CollisionFactory::sphere(1.0, 1.0));
        let b = scene.create_collision(CollisionFactory::capsule(0.5, 2.0, 1.0));
        scene.add_node_collision(node, a);
        scene.add_node_collision(node, b);

        assert_eq!(scene.garbage_collect(), 0);
        assert_eq!(scene.get_node_collisions(node), vec![a, b]);

        scene.destroy_node(node);
        assert_eq!(scene.garbage_collect(), 2);
        assert!(scene.get_node_collisions(node).is_empty());
    }

    #[test]
    fn test_scripts_of_destroyed_nodes_emit_detach_events() {
        let mut scene = Scene::new();
        let node = scene.create_node("scripted");
        let script = scene.create_script(Script::new("logic.lua"));
        scene.add_node_script(node, script);

        scene.garbage_collect();
        assert!(scene.take_script_detach_events().is_empty());

        scene.destroy_node(node);
        scene.garbage_collect();
        assert_eq!(scene.take_script_detach_events(), vec![ScriptDetach { node, script }]);
        assert!(!scene.is_valid_script(script));
        assert!(scene.take_script_detach_events().is_empty());
    }
}
