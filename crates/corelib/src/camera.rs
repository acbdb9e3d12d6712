use crate::{Mat4, Vec3, vec3};

/// Fixed viewer placement relative to the model.
pub const VIEWING_OFFSET_Y: f32 = -0.4;
pub const VIEWING_DISTANCE_Z: f32 = -8.0;

/// Perspective camera built from an explicit frustum (right-handed,
/// OpenGL-style clip space).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Applied as a translation after projection setup.
    pub offset: Vec3,
}

impl Camera {
    /// The viewer the model renderer uses: a narrow frustum with the model
    /// pushed down and away from the eye.
    pub fn default_view() -> Self {
        Self {
            left: -0.025,
            right: 0.025,
            bottom: -0.017,
            top: 0.017,
            z_near: 0.1,
            z_far: 1024.0,
            offset: vec3(0.0, VIEWING_OFFSET_Y, VIEWING_DISTANCE_Z),
        }
    }

    /// OpenGL-style off-center frustum projection (column-major).
    pub fn proj(&self) -> Mat4 {
        let (l, r) = (self.left, self.right);
        let (b, t) = (self.bottom, self.top);
        let (n, f) = (self.z_near, self.z_far);
        #[rustfmt::skip]
        let cols = [
            2.0 * n / (r - l), 0.0, 0.0, 0.0,
            0.0, 2.0 * n / (t - b), 0.0, 0.0,
            (r + l) / (r - l), (t + b) / (t - b), -(f + n) / (f - n), -1.0,
            0.0, 0.0, -2.0 * f * n / (f - n), 0.0,
        ];
        Mat4::from_cols_array(&cols)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(self.offset)
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}
