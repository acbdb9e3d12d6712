//! GPU-ready mesh buffer produced by the OBJ pipeline.

/// Floats per interleaved vertex: position3 + texcoord2 + normal3.
pub const FLOATS_PER_VERTEX: usize = 8;
/// Floats per triangle: three interleaved corners.
pub const FLOATS_PER_FACE: usize = 3 * FLOATS_PER_VERTEX;

/// Flat interleaved vertex buffer, one block of [`FLOATS_PER_FACE`] floats
/// per triangle. Corners keep input order; shared vertices are repeated,
/// never welded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffer {
    pub vertices: Vec<f32>,
    pub face_count: u32,
}

impl MeshBuffer {
    pub fn new(vertices: Vec<f32>, face_count: u32) -> Self {
        debug_assert_eq!(vertices.len(), face_count as usize * FLOATS_PER_FACE);
        Self {
            vertices,
            face_count,
        }
    }

    /// Number of vertices the renderer should draw.
    pub fn vertex_count(&self) -> u32 {
        self.face_count * 3
    }

    /// Returns `true` if the buffer holds at least one full triangle.
    pub fn is_valid(&self) -> bool {
        self.face_count > 0 && self.vertices.len() == self.face_count as usize * FLOATS_PER_FACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_validity_tracks_face_count() {
        assert!(!MeshBuffer::default().is_valid());
        let buf = MeshBuffer::new(vec![0.0; FLOATS_PER_FACE], 1);
        assert!(buf.is_valid());
        assert_eq!(buf.vertex_count(), 3);
    }
}
