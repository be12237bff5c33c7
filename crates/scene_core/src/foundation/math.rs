//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph. Local transforms
//! are stored as position / Euler rotation / scale and converted to matrices on
//! demand.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Scale components below this magnitude are treated as degenerate during
/// matrix decomposition.
const DEGENERATE_SCALE: f32 = 1e-8;

/// Local transform as position, rotation and scale.
///
/// Rotation is stored as Euler angles in radians and applied as
/// `Rz * Ry * Rx` (roll around X first, yaw around Z last).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trs {
    /// Translation
    pub pos: Vec3,
    /// Euler rotation in radians (X, Y, Z)
    pub rot: Vec3,
    /// Scale factors
    pub scl: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            pos: Vec3::zeros(),
            rot: Vec3::zeros(),
            scl: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Trs {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform with only a translation
    pub fn from_position(pos: Vec3) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    /// Transform with translation and Euler rotation
    pub fn from_position_rotation(pos: Vec3, rot: Vec3) -> Self {
        Self {
            pos,
            rot,
            ..Default::default()
        }
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scl: Vec3) -> Self {
        self.scl = scl;
        self
    }

    /// Convert to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.pos)
            * rotation_from_euler(self.rot).to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scl)
    }

    /// Decompose an affine matrix into translation, Euler rotation and scale.
    ///
    /// Shear is lost. A negative determinant is folded into the X scale.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let pos = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let mut axes = [
            Vec3::new(matrix.m11, matrix.m21, matrix.m31),
            Vec3::new(matrix.m12, matrix.m22, matrix.m32),
            Vec3::new(matrix.m13, matrix.m23, matrix.m33),
        ];
        let mut scl = Vec3::new(axes[0].magnitude(), axes[1].magnitude(), axes[2].magnitude());

        if axes[0].cross(&axes[1]).dot(&axes[2]) < 0.0 {
            scl.x = -scl.x;
        }

        for (axis, scale) in axes.iter_mut().zip(scl.iter()) {
            if scale.abs() > DEGENERATE_SCALE {
                *axis /= *scale;
            }
        }

        let basis = Mat3::from_columns(&axes);
        let rotation = Rotation3::from_matrix(&basis);

        Self {
            pos,
            rot: euler_from_rotation(&rotation),
            scl,
        }
    }
}

/// Build a rotation from Euler angles (radians, X then Y then Z)
pub fn rotation_from_euler(euler: Vec3) -> Rotation3<f32> {
    Rotation3::from_euler_angles(euler.x, euler.y, euler.z)
}

/// Extract Euler angles (radians, X/Y/Z) from a rotation
pub fn euler_from_rotation(rotation: &Rotation3<f32>) -> Vec3 {
    let (x, y, z) = rotation.euler_angles();
    Vec3::new(x, y, z)
}

/// Translation part of an affine matrix
pub fn matrix_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Inverse of an affine matrix, identity when singular
pub fn inverse_or_identity(matrix: &Mat4) -> Mat4 {
    matrix.try_inverse().unwrap_or_else(Mat4::identity)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}
