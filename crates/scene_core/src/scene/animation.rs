//! Animation tables and playback clocks
//!
//! The scene stores clips ([`Anim`]) and their bindings to nodes
//! ([`SceneAnim`]) in generational tables like any component, and keeps one
//! clock per playing scene animation. Keyframe data and its interpolation
//! belong to the animation collaborator, which samples clips at the times
//! reported by [`Scene::play_anim_time`](crate::scene::Scene::play_anim_time).

use crate::foundation::collections::TypedRef;
use crate::scene::NodeRef;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Handle to an [`Anim`]
pub type AnimRef = TypedRef<Anim>;
/// Handle to a [`SceneAnim`]
pub type SceneAnimRef = TypedRef<SceneAnim>;

new_key_type! {
    /// Handle to a running playback
    pub struct PlayAnimKey;
}

/// What happens when a playback reaches the end of its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimLoopMode {
    /// Stop at the end
    #[default]
    Once,
    /// Keep running past the end
    Infinite,
    /// Wrap back to the start
    Loop,
}

/// Animation clip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anim {
    /// Clip name
    pub name: String,
    /// First keyed time in seconds
    pub t_start: f32,
    /// Last keyed time in seconds
    pub t_end: f32,
    /// Collaborator-defined track payload, opaque to the scene
    pub tracks: Vec<u8>,
}

impl Anim {
    /// Empty clip over `[t_start, t_end]`
    pub fn new(name: impl Into<String>, t_start: f32, t_end: f32) -> Self {
        Self {
            name: name.into(),
            t_start,
            t_end,
            tracks: Vec::new(),
        }
    }
}

/// A clip bound to the node it drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAnim {
    /// Animated node
    pub node: NodeRef,
    /// Clip driving it
    pub anim: AnimRef,
}

/// Named group of node animations played together
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneAnim {
    /// Name looked up by instance components
    pub name: String,
    /// Playback range start in seconds
    pub t_start: f32,
    /// Playback range end in seconds
    pub t_end: f32,
    /// Clip driving scene-level properties, `INVALID` for none
    pub scene_anim: AnimRef,
    /// Per-node clips
    pub node_anims: Vec<NodeAnim>,
}

impl SceneAnim {
    /// Scene animation over `[t_start, t_end]` with no bindings
    pub fn new(name: impl Into<String>, t_start: f32, t_end: f32) -> Self {
        Self {
            name: name.into(),
            t_start,
            t_end,
            scene_anim: AnimRef::INVALID,
            node_anims: Vec::new(),
        }
    }

    /// Builder pattern: bind a clip to a node
    pub fn with_node_anim(mut self, node: NodeRef, anim: AnimRef) -> Self {
        self.node_anims.push(NodeAnim { node, anim });
        self
    }

    /// Length of the playback range
    pub fn duration(&self) -> f32 {
        self.t_end - self.t_start
    }
}

/// Clock of one running scene animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayAnim {
    /// Animation being played
    pub scene_anim: SceneAnimRef,
    /// Current time in seconds
    pub t: f32,
    /// End-of-range behaviour
    pub loop_mode: AnimLoopMode,
    /// Time scale
    pub speed: f32,
}

impl PlayAnim {
    /// Advance the clock by `dt * speed` over `[t_start, t_end]`.
    ///
    /// Returns false once a [`AnimLoopMode::Once`] playback has passed the
    /// end; the clock is then clamped to `t_end`.
    pub fn advance(&mut self, dt: f32, t_start: f32, t_end: f32) -> bool {
        self.t += dt * self.speed;
        let duration = t_end - t_start;

        match self.loop_mode {
            AnimLoopMode::Once => {
                if self.t >= t_end {
                    self.t = t_end;
                    return false;
                }
            }
            AnimLoopMode::Loop => {
                if duration > 0.0 {
                    if self.t > t_end || self.t < t_start {
                        self.t = t_start + (self.t - t_start).rem_euclid(duration);
                    }
                } else {
                    self.t = t_start;
                }
            }
            AnimLoopMode::Infinite => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn play(loop_mode: AnimLoopMode) -> PlayAnim {
        PlayAnim {
            scene_anim: SceneAnimRef::INVALID,
            t: 0.0,
            loop_mode,
            speed: 1.0,
        }
    }

    #[test]
    fn test_once_stops_at_end() {
        let mut p = play(AnimLoopMode::Once);
        assert!(p.advance(0.5, 0.0, 1.0));
        assert!(!p.advance(0.75, 0.0, 1.0));
        assert_relative_eq!(p.t, 1.0);
    }

    #[test]
    fn test_loop_wraps_into_range() {
        let mut p = play(AnimLoopMode::Loop);
        assert!(p.advance(2.5, 0.0, 1.0));
        assert_relative_eq!(p.t, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_loop_handles_reverse_speed() {
        let mut p = play(AnimLoopMode::Loop);
        p.speed = -1.0;
        p.t = 0.25;
        p.advance(0.5, 0.0, 1.0);
        assert_relative_eq!(p.t, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_infinite_runs_past_end() {
        let mut p = play(AnimLoopMode::Infinite);
        assert!(p.advance(5.0, 0.0, 1.0));
        assert_relative_eq!(p.t, 5.0);
    }

    #[test]
    fn test_scene_anim_duration() {
        let anim = SceneAnim::new("open", 1.0, 3.5);
        assert_relative_eq!(anim.duration(), 2.5);
        assert!(!anim.scene_anim.is_set());
    }
}
