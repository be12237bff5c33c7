//! Light component
//!
//! Pure data. Position and direction come from the owning node's transform;
//! the light itself only carries color and shape parameters.

use crate::foundation::math::{utils::deg_to_rad, Vec4};
use serde::{Deserialize, Serialize};

/// Shape of the emitted light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightKind {
    /// Radiates in all directions from the node position
    #[default]
    Point,
    /// Cone along the node's forward axis
    Spot,
    /// Parallel rays along the node's forward axis (sun)
    Linear,
}

/// Shadow casting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightShadow {
    /// Casts no shadow
    #[default]
    None,
    /// Shadow map
    Map,
}

/// Light source parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// The type of light
    pub kind: LightKind,
    /// Shadow casting mode
    pub shadow: LightShadow,
    /// Diffuse RGBA color
    pub diffuse: Vec4,
    /// Diffuse intensity multiplier
    pub diffuse_intensity: f32,
    /// Specular RGBA color
    pub specular: Vec4,
    /// Specular intensity multiplier
    pub specular_intensity: f32,
    /// Attenuation radius, 0 for infinite (point and spot)
    pub radius: f32,
    /// Inner cone angle in radians (spot)
    pub inner_angle: f32,
    /// Outer cone angle in radians (spot)
    pub outer_angle: f32,
    /// Cascade split distances (linear)
    pub pssm_split: Vec4,
    /// Relative priority when the renderer has to drop lights
    pub priority: f32,
    /// Depth bias applied when sampling the shadow map
    pub shadow_bias: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            shadow: LightShadow::None,
            diffuse: Vec4::new(1.0, 1.0, 1.0, 1.0),
            diffuse_intensity: 1.0,
            specular: Vec4::new(1.0, 1.0, 1.0, 1.0),
            specular_intensity: 1.0,
            radius: 0.0,
            inner_angle: deg_to_rad(30.0),
            outer_angle: deg_to_rad(45.0),
            pssm_split: Vec4::new(10.0, 50.0, 100.0, 200.0),
            priority: 0.0,
            shadow_bias: 0.0001,
        }
    }
}

impl Light {
    /// Builder pattern: set the shadow mode
    pub fn with_shadow(mut self, shadow: LightShadow) -> Self {
        self.shadow = shadow;
        self
    }

    /// Builder pattern: set the specular color and intensity
    pub fn with_specular(mut self, specular: Vec4, intensity: f32) -> Self {
        self.specular = specular;
        self.specular_intensity = intensity;
        self
    }

    /// Builder pattern: set the priority
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }
}

/// Factory functions for light components
pub struct LightFactory;

impl LightFactory {
    /// Point light
    pub fn point(radius: f32, diffuse: Vec4, diffuse_intensity: f32) -> Light {
        Light {
            kind: LightKind::Point,
            radius,
            diffuse,
            diffuse_intensity,
            ..Default::default()
        }
    }

    /// Spot light with cone angles in radians
    pub fn spot(radius: f32, inner_angle: f32, outer_angle: f32, diffuse: Vec4, diffuse_intensity: f32) -> Light {
        Light {
            kind: LightKind::Spot,
            radius,
            inner_angle,
            outer_angle: outer_angle.max(inner_angle),
            diffuse,
            diffuse_intensity,
            ..Default::default()
        }
    }

    /// Directional (sun) light
    pub fn linear(diffuse: Vec4, diffuse_intensity: f32) -> Light {
        Light {
            kind: LightKind::Linear,
            diffuse,
            diffuse_intensity,
            shadow: LightShadow::Map,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_outer_angle_never_below_inner() {
        let light = LightFactory::spot(10.0, 0.6, 0.3, Vec4::new(1.0, 0.0, 0.0, 1.0), 2.0);
        assert_eq!(light.kind, LightKind::Spot);
        assert!(light.outer_angle >= light.inner_angle);
    }

    #[test]
    fn test_linear_light_casts_shadows() {
        let light = LightFactory::linear(Vec4::new(1.0, 1.0, 0.9, 1.0), 1.5);
        assert_eq!(light.kind, LightKind::Linear);
        assert_eq!(light.shadow, LightShadow::Map);
        assert_eq!(light.with_shadow(LightShadow::None).shadow, LightShadow::None);
    }
}
