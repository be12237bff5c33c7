//! Scene core demo application
//!
//! Builds a small library of nested scenes (a hangar holding ships, each ship
//! carrying turrets), spawns it through the budgeted load queue and drives a
//! few frames of updates while exercising enable/disable propagation,
//! instance moves and garbage collection.
//!
//! Usage: `scene_demo [config.toml|config.ron]`

use scene_core::prelude::*;
use scene_core::scene::components::ModelRef;
use scene_core::scene::{Anim, SceneAnimTemplate};

const FRAMES: u32 = 120;

/// Library of nested scenes used by the demo
fn build_library() -> SceneLibrary {
    let turret = SceneTemplate::new()
        .with_node(
            NodeTemplate::new("turret_base")
                .with_object(Object::new(ModelRef(2)))
                .with_collision(CollisionFactory::cylinder(0.4, 0.3, 5.0)),
        )
        .with_node(
            NodeTemplate::new("barrel")
                .with_parent(0)
                .with_trs(Trs::from_position(Vec3::new(0.0, 0.3, 0.5))),
        )
        .with_scene_anim(
            SceneAnimTemplate::new("sweep", 0.0, 2.0).with_clip(1, Anim::new("barrel_sweep", 0.0, 2.0)),
        );

    let ship = SceneTemplate::new()
        .with_node(
            NodeTemplate::new("hull")
                .with_object(Object::new(ModelRef(1)))
                .with_rigid_body(RigidBody::default())
                .with_collision(CollisionFactory::capsule(1.0, 4.0, 120.0))
                .with_script(Script::new("scripts/ship.lua").with_param("thrust", ScriptParam::Float(12.5))),
        )
        .with_node(
            NodeTemplate::new("turret_mount")
                .with_parent(0)
                .with_trs(Trs::from_position(Vec3::new(0.0, 1.0, 0.0)))
                .with_instance(Instance::new("turret").with_anim("sweep", AnimLoopMode::Loop)),
        )
        .with_node(
            NodeTemplate::new("engine_glow")
                .with_parent(0)
                .with_trs(Trs::from_position(Vec3::new(0.0, 0.0, -2.0)))
                .with_light(LightFactory::point(3.0, Vec4::new(0.3, 0.6, 1.0, 1.0), 2.0)),
        );

    let hangar = SceneTemplate::new()
        .with_node(NodeTemplate::new("floor").with_object(Object::new(ModelRef(0))))
        .with_node(
            NodeTemplate::new("overview")
                .with_trs(Trs::from_position(Vec3::new(0.0, 8.0, 20.0)))
                .with_camera(CameraFactory::perspective(0.1, 500.0, 60f32.to_radians())),
        );

    SceneLibrary::new()
        .with_scene("turret", turret)
        .with_scene("ship", ship)
        .with_scene("hangar", hangar)
}

/// Demo state: the scene, its scene library and the pending spawn queue
pub struct SceneDemo {
    config: SceneConfig,
    scene: Scene,
    library: SceneLibrary,
    spawn_queue: LoadQueue<NodeRef>,
    bays: Vec<NodeRef>,
}

impl SceneDemo {
    /// Create the demo with the given configuration
    pub fn new(config: SceneConfig) -> Self {
        log::info!("Creating scene demo...");
        Self {
            scene: Scene::with_config(config.clone()),
            config,
            library: build_library(),
            spawn_queue: LoadQueue::new(),
            bays: Vec::new(),
        }
    }

    /// Load the hangar and queue one ship per bay
    pub fn initialize(&mut self) -> Result<(), SceneError> {
        log::info!("Initializing scene demo...");

        let hangar = self.scene.load_scene("hangar", &mut self.library)?;
        log::info!("Hangar loaded with {} nodes", hangar.nodes.len());

        let camera = hangar.get_node(&self.scene, "overview");
        self.scene.set_current_camera(camera);

        for i in 0..4u8 {
            let x = f32::from(i) * 6.0 - 9.0;
            let bay = self
                .scene
                .create_node_with_transform(format!("bay_{i}"), Trs::from_position(Vec3::new(x, 0.0, 0.0)), NodeRef::INVALID);
            let ship = self.scene.create_instance(Instance::new("ship"));
            self.scene.set_node_instance(bay, ship);
            self.spawn_queue.push(bay);
            self.bays.push(bay);
        }
        log::info!("Queued {} ship spawns", self.spawn_queue.len());
        Ok(())
    }

    /// Drain the spawn queue within the frame budget
    fn process_spawns(&mut self) {
        let scene = &mut self.scene;
        let library = &mut self.library;
        let spawned = self.spawn_queue.process(self.config.load_budget(), |bay| {
            match scene.node_setup_instance(bay, library, 0) {
                Ok(()) => log::debug!("Spawned ship under {}", scene.get_node_name(bay)),
                Err(e) => log::error!("Failed to spawn ship: {}", e),
            }
        });
        if spawned > 0 {
            log::info!("Spawned {} ship(s), {} pending", spawned, self.spawn_queue.len());
        }
    }

    /// Scripted events keyed on the frame number
    fn frame_events(&mut self, frame: u32) {
        match frame {
            30 => {
                log::info!("Powering down bay_0");
                self.scene.disable_node(self.bays[0]);
                let hull = self.find_in_bay(0, "hull");
                log::info!(
                    "bay_0 hull enabled: {}, effectively enabled: {}",
                    self.scene.is_node_enabled(hull),
                    self.scene.is_node_effectively_enabled(hull)
                );
            }
            45 => {
                log::info!("Moving ship from bay_1 to bay_0");
                self.scene.node_destroy_instance(self.bays[0]);
                self.scene.node_move_instance(self.bays[1], self.bays[0]);
                self.scene.enable_node(self.bays[0]);
            }
            60 => {
                log::info!("Scrapping bay_2");
                let bay = self.bays[2];
                self.scene.destroy_node(bay);
                let removed = self.scene.garbage_collect();
                for detach in self.scene.take_script_detach_events() {
                    log::info!("Script {:?} detached from destroyed node {:?}", detach.script, detach.node);
                }
                log::info!("Garbage collection removed {} entries", removed);
            }
            90 => {
                let compacted = self.scene.compact_components();
                log::info!("Compacted {} tables", compacted);
            }
            _ => {}
        }
    }

    fn find_in_bay(&self, bay: usize, name: &str) -> NodeRef {
        self.scene
            .get_node_instance_view(self.bays[bay])
            .map_or(NodeRef::INVALID, |view| view.get_node(&self.scene, name))
    }

    /// Run the fixed number of frames
    pub fn run(&mut self) {
        let mut clock = FrameClock::fixed(1.0 / 60.0);
        let started = std::time::Instant::now();

        for frame in 0..FRAMES {
            self.process_spawns();
            self.frame_events(frame);
            clock.update_scene(&mut self.scene);

            if frame % 30 == 0 {
                self.report(frame);
            }
        }

        log::info!(
            "Ran {} frames ({:.2}s of scene time) in {:.3}s of wall time",
            clock.frame_count(),
            clock.scene_time(),
            started.elapsed().as_secs_f32()
        );
    }

    fn report(&self, frame: u32) {
        log::info!(
            "Frame {}: {} nodes, {} transforms, {} playing animations",
            frame,
            self.scene.node_count(),
            self.scene.component_count::<Transform>(),
            self.scene.playing_anims().count()
        );
        let barrel = self.scene.get_node("barrel");
        if barrel.is_set() {
            let world = self.scene.get_node_world(barrel);
            log::debug!(
                "First barrel at ({:.2}, {:.2}, {:.2})",
                world.m14,
                world.m24,
                world.m34
            );
        }
    }
}

fn load_config() -> SceneConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SceneConfig::default();
    };
    match SceneConfig::load_from_file(&path) {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            log::warn!("Failed to load {}: {}, using defaults", path, e);
            SceneConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    scene_core::foundation::logging::init_with_level(log::LevelFilter::Info);

    log::info!("Starting scene core demo");

    let config = load_config();
    let mut demo = SceneDemo::new(config);
    demo.initialize()?;
    demo.run();

    log::info!("Scene demo finished successfully");
    Ok(())
}
