//! Scene animation playback

use crate::scene::animation::{AnimLoopMode, PlayAnim, PlayAnimKey, SceneAnim, SceneAnimRef};
use crate::scene::Scene;

impl Scene {
    /// First scene animation named `name`, `INVALID` when none
    pub fn get_scene_anim_by_name(&self, name: &str) -> SceneAnimRef {
        self.scene_anims
            .iter()
            .find(|(_, anim)| anim.name == name)
            .map_or(SceneAnimRef::INVALID, |(r, _)| SceneAnimRef::from_raw(r))
    }

    /// Start playing a scene animation from the start of its range.
    ///
    /// Returns a null key (never playing) on a stale handle.
    pub fn play_anim(&mut self, scene_anim: SceneAnimRef, loop_mode: AnimLoopMode, speed: f32) -> PlayAnimKey {
        let Some(anim) = self.scene_anims.get(scene_anim) else {
            self.warn_invalid::<SceneAnim>(scene_anim.raw());
            return PlayAnimKey::default();
        };
        let t = anim.t_start;
        self.play_anims.insert(PlayAnim {
            scene_anim,
            t,
            loop_mode,
            speed,
        })
    }

    /// Stop a playback. Returns false if it had already stopped.
    pub fn stop_anim(&mut self, key: PlayAnimKey) -> bool {
        self.play_anims.remove(key).is_some()
    }

    /// Stop every playback
    pub fn stop_all_anims(&mut self) {
        self.play_anims.clear();
        self.node_instance_play.clear();
    }

    /// True until the playback stops or finishes
    pub fn is_playing(&self, key: PlayAnimKey) -> bool {
        self.play_anims.contains_key(key)
    }

    /// Current clock of a playback
    pub fn play_anim_time(&self, key: PlayAnimKey) -> Option<f32> {
        self.play_anims.get(key).map(|play| play.t)
    }

    /// Change the time scale of a running playback
    pub fn set_play_anim_speed(&mut self, key: PlayAnimKey, speed: f32) {
        if let Some(play) = self.play_anims.get_mut(key) {
            play.speed = speed;
        }
    }

    /// Running playbacks
    pub fn playing_anims(&self) -> impl Iterator<Item = (PlayAnimKey, &PlayAnim)> + '_ {
        self.play_anims.iter()
    }

    /// Advance every playback clock, dropping finished playbacks and
    /// playbacks whose scene animation was destroyed
    pub(crate) fn update_animations(&mut self, dt: f32) {
        let scene_anims = &self.scene_anims;
        self.play_anims.retain(|_, play| match scene_anims.get(play.scene_anim) {
            Some(anim) => play.advance(dt, anim.t_start, anim.t_end),
            None => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_once_playback_finishes_during_update() {
        let mut scene = Scene::new();
        let anim = scene.create_scene_anim(SceneAnim::new("door", 0.0, 1.0));
        let key = scene.play_anim(anim, AnimLoopMode::Once, 1.0);

        scene.update(0.4);
        assert!(scene.is_playing(key));
        assert_relative_eq!(scene.play_anim_time(key).unwrap_or_default(), 0.4);

        scene.update(0.7);
        assert!(!scene.is_playing(key));
        assert_eq!(scene.play_anim_time(key), None);
    }

    #[test]
    fn test_destroying_scene_anim_stops_playback() {
        let mut scene = Scene::new();
        let anim = scene.create_scene_anim(SceneAnim::new("spin", 0.0, 2.0));
        let key = scene.play_anim(anim, AnimLoopMode::Loop, 2.0);
        scene.destroy_scene_anim(anim);
        scene.update(0.1);
        assert!(!scene.is_playing(key));
    }

    #[test]
    fn test_stale_scene_anim_gives_null_key() {
        let mut scene = Scene::new();
        let anim = scene.create_scene_anim(SceneAnim::new("x", 0.0, 1.0));
        scene.destroy_scene_anim(anim);
        let key = scene.play_anim(anim, AnimLoopMode::Once, 1.0);
        assert!(!scene.is_playing(key));
        assert!(!scene.stop_anim(key));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut scene = Scene::new();
        scene.create_scene_anim(SceneAnim::new("a", 0.0, 1.0));
        let b = scene.create_scene_anim(SceneAnim::new("b", 0.0, 1.0));
        assert_eq!(scene.get_scene_anim_by_name("b"), b);
        assert!(!scene.get_scene_anim_by_name("c").is_set());
    }
}
