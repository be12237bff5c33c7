//! Hierarchy scenarios
//!
//! Long seeded sequences of reparenting, instance moves and destruction.
//! The parent chain of every node must stay finite throughout.

use crate::foundation::logging::CaptureSink;
use crate::foundation::math::{Trs, Vec3};
use crate::scene::components::{Camera, Instance};
use crate::scene::{NodeRef, NodeTemplate, Scene, SceneLibrary, SceneTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }

        fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
            if items.is_empty() {
                return None;
            }
            let i = (self.next() % items.len() as u64) as usize;
            Some(items[i])
        }
    }

    /// `prop` is a two-node chain, `rack` holds a plain shelf and a nested prop
    fn library() -> SceneLibrary {
        let prop = SceneTemplate::new()
            .with_node(NodeTemplate::new("base"))
            .with_node(NodeTemplate::new("knob").with_parent(0).with_camera(Camera::default()));
        let rack = SceneTemplate::new()
            .with_node(NodeTemplate::new("shelf"))
            .with_node(NodeTemplate::new("slot").with_parent(0).with_instance(Instance::new("prop")));
        SceneLibrary::new().with_scene("prop", prop).with_scene("rack", rack)
    }

    fn spawn(scene: &mut Scene, library: &mut SceneLibrary, path: &str, parent: NodeRef) -> NodeRef {
        let host = scene.create_node_with_transform(path, Trs::from_position(Vec3::new(1.0, 0.0, 0.0)), parent);
        let instance = scene.create_instance(Instance::new(path));
        scene.set_node_instance(host, instance);
        scene.node_setup_instance(host, library, 0).unwrap();
        host
    }

    fn hosts(scene: &Scene) -> Vec<NodeRef> {
        scene
            .node_instance
            .keys()
            .copied()
            .filter(|host| scene.is_valid_node(*host))
            .collect()
    }

    fn assert_chains_terminate(scene: &Scene, step: usize) {
        let limit = scene.node_count();
        for node in scene.get_all_nodes() {
            let mut current = scene.get_node_parent(node);
            let mut steps = 0;
            while current.is_set() {
                steps += 1;
                assert!(steps <= limit, "step {step}: parent chain of {node:?} does not terminate");
                current = scene.get_node_parent(current);
            }
        }
    }

    fn run_sequence(seed: u64, steps: usize) {
        let mut scene = Scene::new();
        scene.install_diagnostic_sink(Box::new(CaptureSink::new()));
        let mut library = library();
        let mut rng = Lcg(seed);

        for i in 0..4 {
            let path = if i % 2 == 0 { "prop" } else { "rack" };
            spawn(&mut scene, &mut library, path, NodeRef::INVALID);
            scene.create_node_with_transform(format!("plain{i}"), Trs::identity(), NodeRef::INVALID);
        }

        for step in 0..steps {
            let nodes = scene.get_all_nodes();
            let a = rng.pick(&nodes).unwrap_or(NodeRef::INVALID);
            let b = rng.pick(&nodes).unwrap_or(NodeRef::INVALID);

            match rng.next() % 9 {
                0..=2 => {
                    let parent = if rng.next() % 5 == 0 { NodeRef::INVALID } else { b };
                    if scene.is_valid_node(a) && scene.is_valid_transform(scene.get_node_transform(a)) {
                        scene.set_transform_parent(scene.get_node_transform(a), parent);
                    }
                }
                3 | 4 => {
                    if let Some(host) = rng.pick(&hosts(&scene)) {
                        scene.node_move_instance(host, b);
                    }
                }
                5 => {
                    if scene.is_valid_node(a) {
                        scene.destroy_node(a);
                    }
                }
                6 => {
                    if scene.node_count() < 48 {
                        let path = if rng.next() % 2 == 0 { "prop" } else { "rack" };
                        spawn(&mut scene, &mut library, path, b);
                    } else {
                        scene.garbage_collect();
                    }
                }
                7 => {
                    if let Some(host) = rng.pick(&hosts(&scene)) {
                        scene.node_destroy_instance(host);
                    }
                }
                _ => {
                    scene.create_node_with_transform(format!("n{step}"), Trs::identity(), b);
                }
            }

            assert_chains_terminate(&scene, step);
            scene.update(1.0 / 60.0);
        }
    }

    #[test]
    fn test_random_hierarchy_edits_keep_chains_finite() {
        run_sequence(0x5eed, 400);
    }

    #[test]
    fn test_random_hierarchy_edits_other_seeds() {
        for seed in [1, 7, 0xdead_beef] {
            run_sequence(seed, 200);
        }
    }
}
