//! Graphics collaborator interface.
//!
//! The ingestion pipeline terminates here: a device accepts an interleaved
//! vertex buffer and an RGBA8 pixel buffer and knows nothing about file
//! formats. Handles follow GL conventions: 0 is the null handle and means
//! "nothing to draw", never undefined behavior.

use std::sync::Arc;

use asset::bmp::TextureData;
use asset::mesh::MeshBuffer;
use glam::Mat4;
use parking_lot::Mutex;

/// Handle to an uploaded vertex buffer. Zero is null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshHandle(pub u32);

/// Handle to an uploaded texture. Zero is null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureHandle(pub u32);

impl MeshHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl TextureHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// The interleaved vertex data as raw bytes for upload.
pub fn vertex_bytes(mesh: &MeshBuffer) -> &[u8] {
    bytemuck::cast_slice(&mesh.vertices)
}

/// Upload/draw surface the renderer backend implements.
pub trait GraphicsDevice {
    fn upload_mesh(&mut self, mesh: &MeshBuffer) -> MeshHandle;
    fn upload_texture(&mut self, texture: &TextureData) -> TextureHandle;
    fn draw(&mut self, mesh: MeshHandle, texture: TextureHandle, model: Mat4, view_proj: Mat4);
}

/// Recorded state of one uploaded mesh.
#[derive(Clone, Debug)]
pub struct UploadedMesh {
    pub byte_len: usize,
    pub vertex_count: u32,
}

/// Recorded state of one uploaded texture.
#[derive(Clone, Debug)]
pub struct UploadedTexture {
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Device that records uploads and draws without touching a GPU.
/// Backs the binary when no GPU backend is wired in, and the tests.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    pub meshes: Vec<UploadedMesh>,
    pub textures: Vec<UploadedTexture>,
    pub draw_calls: u64,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn upload_mesh(&mut self, mesh: &MeshBuffer) -> MeshHandle {
        self.meshes.push(UploadedMesh {
            byte_len: vertex_bytes(mesh).len(),
            vertex_count: mesh.vertex_count(),
        });
        let handle = MeshHandle(self.meshes.len() as u32);
        log::info!(
            "uploaded mesh {:?}: {} vertices",
            handle,
            mesh.vertex_count()
        );
        handle
    }

    fn upload_texture(&mut self, texture: &TextureData) -> TextureHandle {
        self.textures.push(UploadedTexture {
            width: texture.width,
            height: texture.height,
            byte_len: texture.pixels.len(),
        });
        let handle = TextureHandle(self.textures.len() as u32);
        log::info!(
            "uploaded texture {:?}: {}x{}",
            handle,
            texture.width,
            texture.height
        );
        handle
    }

    fn draw(&mut self, mesh: MeshHandle, _texture: TextureHandle, _model: Mat4, _view_proj: Mat4) {
        if mesh.is_null() {
            log::trace!("draw skipped: null mesh handle");
            return;
        }
        self.draw_calls += 1;
    }
}

/// Rotation cell shared between the control listener and the frame loop.
#[derive(Clone, Debug, Default)]
pub struct SharedRotation(Arc<Mutex<f32>>);

impl SharedRotation {
    pub fn new(degrees: f32) -> Self {
        Self(Arc::new(Mutex::new(degrees)))
    }

    pub fn set(&self, degrees: f32) {
        *self.0.lock() = degrees;
    }

    pub fn get(&self) -> f32 {
        *self.0.lock()
    }
}

#[cfg(test)]
mod tests {
    use asset::mesh::FLOATS_PER_FACE;

    use super::*;

    #[test]
    fn upload_returns_non_null_handles() {
        let mut device = HeadlessDevice::new();
        let mesh = MeshBuffer::new(vec![0.5; FLOATS_PER_FACE], 1);
        let handle = device.upload_mesh(&mesh);
        assert!(!handle.is_null());
        assert_eq!(device.meshes[0].byte_len, FLOATS_PER_FACE * 4);
        assert_eq!(device.meshes[0].vertex_count, 3);
    }

    #[test]
    fn draw_with_null_mesh_is_a_no_op() {
        let mut device = HeadlessDevice::new();
        device.draw(
            MeshHandle::NULL,
            TextureHandle::NULL,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
        );
        assert_eq!(device.draw_calls, 0);
    }

    #[test]
    fn shared_rotation_round_trips() {
        let rotation = SharedRotation::new(0.0);
        let clone = rotation.clone();
        clone.set(42.5);
        assert_eq!(rotation.get(), 42.5);
    }
}
