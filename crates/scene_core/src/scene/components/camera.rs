//! Camera component

use crate::foundation::math::{utils::deg_to_rad, Mat4};
use nalgebra::{Orthographic3, Perspective3};
use serde::{Deserialize, Serialize};

/// Near and far clipping planes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZRange {
    /// Near plane distance
    pub znear: f32,
    /// Far plane distance
    pub zfar: f32,
}

impl Default for ZRange {
    fn default() -> Self {
        Self {
            znear: 0.01,
            zfar: 1000.0,
        }
    }
}

/// Projection parameters of a camera node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Clipping planes
    pub zrange: ZRange,
    /// Vertical field of view in radians (perspective only)
    pub fov: f32,
    /// Orthographic instead of perspective projection
    pub ortho: bool,
    /// Vertical extent of the view volume (orthographic only)
    pub size: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zrange: ZRange::default(),
            fov: deg_to_rad(60.0),
            ortho: false,
            size: 1.0,
        }
    }
}

impl Camera {
    /// Projection matrix for the given viewport aspect ratio (width / height)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        if self.ortho {
            let half_h = self.size * 0.5;
            let half_w = half_h * aspect;
            Orthographic3::new(-half_w, half_w, -half_h, half_h, self.zrange.znear, self.zrange.zfar)
                .to_homogeneous()
        } else {
            Perspective3::new(aspect, self.fov, self.zrange.znear, self.zrange.zfar).to_homogeneous()
        }
    }
}

/// Factory functions for camera components
pub struct CameraFactory;

impl CameraFactory {
    /// Perspective camera
    pub fn perspective(znear: f32, zfar: f32, fov: f32) -> Camera {
        Camera {
            zrange: ZRange { znear, zfar },
            fov,
            ortho: false,
            ..Default::default()
        }
    }

    /// Orthographic camera covering `size` units vertically
    pub fn orthographic(znear: f32, zfar: f32, size: f32) -> Camera {
        Camera {
            zrange: ZRange { znear, zfar },
            ortho: true,
            size,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_factories_set_projection_mode() {
        let persp = CameraFactory::perspective(0.1, 100.0, deg_to_rad(45.0));
        assert!(!persp.ortho);
        assert_relative_eq!(persp.fov, deg_to_rad(45.0));

        let ortho = CameraFactory::orthographic(0.1, 100.0, 10.0);
        assert!(ortho.ortho);
        assert_relative_eq!(ortho.size, 10.0);
    }

    #[test]
    fn test_orthographic_projection_maps_extent_to_clip_edges() {
        let cam = CameraFactory::orthographic(0.1, 100.0, 4.0);
        let m = cam.projection_matrix(1.0);
        let edge = m.transform_point(&nalgebra::Point3::new(2.0, 2.0, -1.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(edge.y, 1.0, epsilon = 1e-5);
    }
}
