use crate::{Mat4, Quat, Vec3};

/// Rigid transform with non-uniform scale.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Model transform spinning around the vertical axis, the only motion
    /// the control channel drives.
    #[inline]
    pub fn spin_y(degrees: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_y(degrees.to_radians()),
            ..Self::identity()
        }
    }

    /// Build matrix = T * R * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
