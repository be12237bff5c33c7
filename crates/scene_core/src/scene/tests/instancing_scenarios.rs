//! Instancing scenarios
//!
//! Nested loads, enable/disable propagation, teardown, moves and collection
//! of content under destroyed hosts.

use crate::foundation::logging::CaptureSink;
use crate::foundation::math::{Trs, Vec3};
use crate::scene::components::{Camera, Instance};
use crate::scene::{
    Anim, AnimLoopMode, NodeFlags, NodeRef, NodeTemplate, Scene, SceneAnimTemplate, SceneLibrary,
    SceneTemplate,
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// `level0` .. `level{depth}`, each holding one node `n{k}` that
    /// instances the next level
    fn chain_library(depth: usize) -> SceneLibrary {
        let mut library = SceneLibrary::new();
        for k in 0..=depth {
            let mut node = NodeTemplate::new(format!("n{k}"));
            if k < depth {
                node = node.with_instance(Instance::new(format!("level{}", k + 1)));
            }
            library.insert(format!("level{k}"), SceneTemplate::new().with_node(node));
        }
        library
    }

    /// `prop`: a `base` root with a `knob` child, plus an `idle` animation
    fn prop_library() -> SceneLibrary {
        let prop = SceneTemplate::new()
            .with_node(NodeTemplate::new("base").with_trs(Trs::from_position(Vec3::new(0.0, 1.0, 0.0))))
            .with_node(NodeTemplate::new("knob").with_parent(0).with_camera(Camera::default()))
            .with_scene_anim(SceneAnimTemplate::new("idle", 0.0, 1.0).with_clip(1, Anim::new("turn", 0.0, 1.0)));
        SceneLibrary::new().with_scene("prop", prop)
    }

    fn spawn_host(scene: &mut Scene, name: &str, path: &str) -> NodeRef {
        let host = scene.create_node_with_transform(name, Trs::from_position(Vec3::new(10.0, 0.0, 0.0)), NodeRef::INVALID);
        let instance = scene.create_instance(Instance::new(path));
        scene.set_node_instance(host, instance);
        host
    }

    #[test]
    fn test_nested_chain_stops_at_recursion_cap_without_warning() {
        let mut scene = Scene::new();
        let sink = CaptureSink::new();
        scene.install_diagnostic_sink(Box::new(sink.clone()));
        let mut library = chain_library(6);

        scene.load_scene("level0", &mut library).unwrap();

        for k in 0..=4 {
            assert!(scene.get_node(&format!("n{k}")).is_set(), "level {k} should be loaded");
        }
        assert!(!scene.get_node("n5").is_set());
        assert!(!scene.get_node("n6").is_set());
        assert_eq!(scene.node_count(), 5);
        assert!(sink.warnings().is_empty(), "unexpected warnings: {:?}", sink.warnings());

        for view in scene.node_instance_view.values() {
            for node in &view.nodes {
                let name = scene.get_node_name(*node);
                assert!(name != "n5" && name != "n6");
            }
        }
    }

    #[test]
    fn test_lower_recursion_cap_truncates_earlier() {
        let config = crate::core::SceneConfig::default().with_max_instance_recursion(2);
        let mut scene = Scene::with_config(config);
        scene.load_scene("level0", &mut chain_library(6)).unwrap();
        assert_eq!(scene.node_count(), 3);
        assert!(!scene.get_node("n3").is_set());
    }

    #[test]
    fn test_instantiated_roots_hang_under_host() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();

        let view = scene.get_node_instance_view(host).cloned().unwrap();
        let base = view.get_node(&scene, "base");
        let knob = view.get_node(&scene, "knob");

        assert_eq!(scene.get_node_parent(base), host);
        assert_eq!(scene.get_node_parent(knob), base);
        assert!(scene.get_node_flags(base).contains(NodeFlags::INSTANTIATED));
        assert!(scene.get_node_flags(knob).contains(NodeFlags::INSTANTIATED));
        assert_eq!(scene.get_node("base"), base);
        assert!(scene.get_nodes().iter().all(|n| *n == host));

        scene.update(0.0);
        let world = scene.get_node_world(base);
        assert_relative_eq!(world.m14, 10.0, epsilon = 1e-5);
        assert_relative_eq!(world.m24, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_disabling_host_disables_content_without_touching_own_flags() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        let view = scene.get_node_instance_view(host).cloned().unwrap();

        scene.disable_node(host);
        for node in &view.nodes {
            assert!(scene.is_node_enabled(*node));
            assert!(!scene.is_node_effectively_enabled(*node));
        }

        scene.enable_node(host);
        for node in &view.nodes {
            assert!(scene.is_node_effectively_enabled(*node));
            assert!(!scene.get_node_flags(*node).contains(NodeFlags::INSTANCE_DISABLED));
        }
    }

    #[test]
    fn test_user_disabled_content_stays_disabled_when_host_reenabled() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        let knob = scene.get_node("knob");

        scene.disable_node(knob);
        scene.disable_node(host);
        scene.enable_node(host);

        assert!(!scene.is_node_enabled(knob));
        assert!(!scene.is_node_effectively_enabled(knob));
        assert!(scene.is_node_effectively_enabled(scene.get_node("base")));
    }

    #[test]
    fn test_setup_under_disabled_host_starts_disabled() {
        let mut scene = Scene::new();
        let host = spawn_host(&mut scene, "host", "level1");
        scene.disable_node(host);
        scene.node_setup_instance(host, &mut chain_library(3), 0).unwrap();

        // nested content two levels down inherits the state as well
        for name in ["n1", "n2", "n3"] {
            let node = scene.get_node(name);
            assert!(node.is_set());
            assert!(!scene.is_node_effectively_enabled(node), "{name} should be disabled");
        }

        scene.enable_node(host);
        for name in ["n1", "n2", "n3"] {
            assert!(scene.is_node_effectively_enabled(scene.get_node(name)));
        }
    }

    #[test]
    fn test_destroy_instance_removes_nested_content() {
        let mut scene = Scene::new();
        let host = spawn_host(&mut scene, "host", "level1");
        scene.node_setup_instance(host, &mut chain_library(3), 0).unwrap();
        assert_eq!(scene.node_count(), 4);

        scene.node_destroy_instance(host);
        assert_eq!(scene.node_count(), 1);
        assert!(scene.get_node_instance_view(host).is_none());
        assert!(scene.node_instance_view.is_empty());

        // the host keeps its instance component and can be set up again
        scene.node_setup_instance(host, &mut chain_library(3), 0).unwrap();
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn test_setup_twice_replaces_previous_content() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        let first = scene.get_node_instance_view(host).cloned().unwrap();

        scene.node_setup_instance(host, &mut library, 0).unwrap();
        assert_eq!(scene.node_count(), 3);
        assert!(first.nodes.iter().all(|n| !scene.is_valid_node(*n)));
    }

    #[test]
    fn test_move_instance_reparents_and_recomputes_state() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let from = spawn_host(&mut scene, "from", "prop");
        let to = scene.create_node_with_transform("to", Trs::identity(), NodeRef::INVALID);
        scene.node_setup_instance(from, &mut library, 0).unwrap();
        let base = scene.get_node("base");

        scene.disable_node(to);
        scene.node_move_instance(from, to);

        assert_eq!(scene.get_node_parent(base), to);
        assert!(scene.get_node_instance_view(from).is_none());
        assert!(scene.get_node_instance_view(to).is_some());
        assert!(scene.get_node_instance(to).is_set());
        assert!(!scene.get_node_instance(from).is_set());
        assert!(!scene.is_node_effectively_enabled(base));

        scene.enable_node(to);
        assert!(scene.is_node_effectively_enabled(base));
    }

    #[test]
    fn test_move_into_own_content_is_rejected() {
        let mut scene = Scene::new();
        let sink = CaptureSink::new();
        scene.install_diagnostic_sink(Box::new(sink.clone()));
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        let base = scene.get_node("base");

        scene.node_move_instance(host, base);
        assert!(scene.get_node_instance_view(host).is_some());
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_move_below_own_content_is_rejected() {
        let mut scene = Scene::new();
        let sink = CaptureSink::new();
        scene.install_diagnostic_sink(Box::new(sink.clone()));
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        let base = scene.get_node("base");
        let knob = scene.get_node("knob");
        let x = scene.create_node_with_transform("x", Trs::identity(), base);
        let y = scene.create_node_with_transform("y", Trs::identity(), knob);

        scene.node_move_instance(host, x);
        scene.node_move_instance(host, y);

        assert_eq!(sink.warnings().len(), 2);
        assert!(scene.get_node_instance_view(host).is_some());
        assert!(scene.get_node_instance_view(x).is_none());
        assert_eq!(scene.get_node_parent(base), host);
        assert!(scene.is_child_of(y, host));
        assert!(!scene.is_child_of(base, x));
    }

    #[test]
    fn test_collecting_destroyed_host_tears_down_content() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();

        scene.destroy_node(host);
        let removed = scene.garbage_collect();

        assert!(removed > 0);
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.component_count::<crate::scene::components::Transform>(), 0);
        assert_eq!(scene.component_count::<Camera>(), 0);
        assert_eq!(scene.component_count::<Instance>(), 0);
        assert_eq!(scene.component_count::<crate::scene::SceneAnim>(), 0);
        assert!(scene.node_instance.is_empty());
        assert!(scene.node_instance_view.is_empty());
        assert_eq!(scene.garbage_collect(), 0);
    }

    #[test]
    fn test_single_pass_reclaims_torn_down_content() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = spawn_host(&mut scene, "host", "prop");
        scene.node_setup_instance(host, &mut library, 0).unwrap();

        scene.destroy_node(host);

        assert!(scene.garbage_collect_pass() > 0);
        assert_eq!(scene.garbage_collect_pass(), 0);
        assert_eq!(scene.component_count::<Camera>(), 0);
    }

    #[test]
    fn test_single_pass_reclaims_nested_hosts() {
        let mut scene = Scene::new();
        let mut library = chain_library(3);
        let host = spawn_host(&mut scene, "host", "level1");
        scene.node_setup_instance(host, &mut library, 0).unwrap();
        assert_eq!(scene.component_count::<Instance>(), 3);

        scene.destroy_node(host);

        assert!(scene.garbage_collect_pass() > 0);
        assert_eq!(scene.component_count::<Instance>(), 0);
        assert!(scene.node_instance.is_empty());
        assert_eq!(scene.garbage_collect_pass(), 0);
    }

    #[test]
    fn test_on_instantiate_anim_plays_until_content_is_destroyed() {
        let mut scene = Scene::new();
        let mut library = prop_library();
        let host = scene.create_node("host");
        let instance = scene.create_instance(Instance::new("prop").with_anim("idle", AnimLoopMode::Loop));
        scene.set_node_instance(host, instance);

        scene.node_setup_instance(host, &mut library, 0).unwrap();
        assert_eq!(scene.playing_anims().count(), 1);
        scene.update(2.5);
        assert_eq!(scene.playing_anims().count(), 1);

        scene.node_destroy_instance(host);
        assert_eq!(scene.playing_anims().count(), 0);
    }

    #[test]
    fn test_nested_failure_is_a_warning() {
        let mut scene = Scene::new();
        let sink = CaptureSink::new();
        scene.install_diagnostic_sink(Box::new(sink.clone()));
        let outer = SceneTemplate::new().with_node(NodeTemplate::new("inner").with_instance(Instance::new("missing")));
        let mut library = SceneLibrary::new().with_scene("outer", outer);

        let host = spawn_host(&mut scene, "host", "outer");
        assert!(scene.node_setup_instance(host, &mut library, 0).is_ok());
        assert!(scene.get_node("inner").is_set());
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_top_level_failure_is_returned() {
        let mut scene = Scene::new();
        let host = spawn_host(&mut scene, "host", "missing");
        assert!(scene.node_setup_instance(host, &mut SceneLibrary::new(), 0).is_err());
        assert!(scene.get_node_instance_view(host).is_some_and(|v| v.is_empty()));
    }
}
