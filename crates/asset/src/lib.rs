//! Asset ingestion pipeline (meshes, textures).
//! OBJ-style face-indexed meshes become interleaved vertex buffers;
//! uncompressed 24-bit BMPs become RGBA8 pixel buffers.

pub mod bmp;
pub mod error;
pub mod mesh;
pub mod obj;
pub mod raw;

pub use bmp::{TextureData, decode_bmp, load_bmp_from_path};
pub use error::AssetError;
pub use mesh::MeshBuffer;
pub use obj::{ElementCounts, LoadOptions, MeshArrays, load_obj_from_path, load_obj_from_str};
pub use raw::RawAsset;

/// Largest mesh description file accepted by a single load.
pub const OBJ_MAX_SIZE: u64 = 13_200_000;
/// Largest bitmap file accepted by a single load.
pub const BMP_MAX_SIZE: u64 = 3_200_000;
/// Largest texture dimension (either axis) the renderer will accept.
pub const MAX_TEXTURE_SIZE: u32 = 1024;
