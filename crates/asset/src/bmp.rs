//! Uncompressed 24-bit BMP decoder producing RGBA8 pixel buffers.

use std::path::Path;

use crate::error::{AssetError, AssetResult};
use crate::raw::RawAsset;
use crate::{BMP_MAX_SIZE, MAX_TEXTURE_SIZE};

/// Fixed header layout of an uncompressed truecolor bitmap.
const HEADER_SIZE: usize = 54;
const WIDTH_OFFSET: usize = 18;
const HEIGHT_OFFSET: usize = 22;
const BPP_OFFSET: usize = 28;

/// Decoded texture ready for GPU upload: tightly packed RGBA8, row order
/// as stored in the source (not flipped), alpha forced to 255.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the source file (only 24 is accepted).
    pub source_bpp: u16,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Bytes per pixel of the decoded buffer.
    pub fn bytes_per_pixel(&self) -> u32 {
        4
    }

    /// Returns `true` if the pixel buffer matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width * self.height * self.bytes_per_pixel()) as usize
    }
}

fn read_i32_le(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Decode an uncompressed 24-bit bitmap.
///
/// Rows in the source are padded to 4-byte multiples and stored in BGR
/// order; the output strips the padding and reorders to RGBA. Oversized
/// dimensions and truncated payloads are rejected outright, nothing is
/// clamped or best-effort decoded.
pub fn decode_bmp(data: &[u8]) -> AssetResult<TextureData> {
    if data.len() < HEADER_SIZE {
        return Err(AssetError::parse(format!(
            "bitmap header truncated: {} bytes, need {HEADER_SIZE}",
            data.len()
        )));
    }

    let width = read_i32_le(data, WIDTH_OFFSET);
    let height = read_i32_le(data, HEIGHT_OFFSET);
    let bpp = read_u16_le(data, BPP_OFFSET);
    log::debug!("bitmap header: {width}x{height}, {bpp} bpp");

    if bpp != 24 {
        return Err(AssetError::UnsupportedFormat { bits_per_pixel: bpp });
    }
    let max = MAX_TEXTURE_SIZE;
    if !(0..=max as i32).contains(&width) || !(0..=max as i32).contains(&height) {
        log::error!("bitmap {width}x{height} exceeds max texture size {max}");
        return Err(AssetError::DimensionExceeded { width, height, max });
    }

    let (w, h) = (width as usize, height as usize);
    let row_bytes = w * 3;
    let padding = (4 - row_bytes % 4) % 4;
    let needed = HEADER_SIZE + h * (row_bytes + padding);
    if data.len() < needed {
        return Err(AssetError::parse(format!(
            "bitmap pixel data truncated: {} bytes, need {needed}",
            data.len()
        )));
    }

    let mut pixels = Vec::with_capacity(w * h * 4);
    let mut src = &data[HEADER_SIZE..];
    for _ in 0..h {
        for bgr in src[..row_bytes].chunks_exact(3) {
            pixels.extend_from_slice(&[bgr[2], bgr[1], bgr[0], 255]);
        }
        src = &src[row_bytes + padding..];
    }

    Ok(TextureData {
        width: width as u32,
        height: height as u32,
        source_bpp: bpp,
        pixels,
    })
}

/// Load and decode a bitmap from a file path.
pub fn load_bmp_from_path(path: impl AsRef<Path>) -> AssetResult<TextureData> {
    let path = path.as_ref();
    let raw = RawAsset::read(path, BMP_MAX_SIZE)?;
    let texture = decode_bmp(raw.content())?;
    log::info!(
        "loaded texture {}: {}x{}, {} bytes",
        path.display(),
        texture.width,
        texture.height,
        texture.pixels.len()
    );
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal valid header followed by the given pixel payload.
    fn bmp_bytes(width: i32, height: i32, bpp: u16, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0] = b'B';
        data[1] = b'M';
        data[WIDTH_OFFSET..WIDTH_OFFSET + 4].copy_from_slice(&width.to_le_bytes());
        data[HEIGHT_OFFSET..HEIGHT_OFFSET + 4].copy_from_slice(&height.to_le_bytes());
        data[BPP_OFFSET..BPP_OFFSET + 2].copy_from_slice(&bpp.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn decodes_2x2_bgr_to_rgba() {
        // 2x2, 6 bytes per row + 2 padding bytes. Rows bottom-up as stored.
        #[rustfmt::skip]
        let payload = [
            255, 0, 0,   0, 255, 0,   0xAA, 0xBB, // blue, green + padding
            0, 0, 255,   10, 20, 30,  0xCC, 0xDD, // red, odd color + padding
        ];
        let tex = decode_bmp(&bmp_bytes(2, 2, 24, &payload)).expect("decode");
        assert_eq!((tex.width, tex.height), (2, 2));
        assert!(tex.is_valid());
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 255, 255,   0, 255, 0, 255,
            255, 0, 0, 255,   30, 20, 10, 255,
        ];
        assert_eq!(tex.pixels, expected);
    }

    #[test]
    fn strips_row_padding_for_width_1() {
        // width 1: 3 payload bytes + 1 padding byte per row.
        let payload = [1, 2, 3, 0xEE, 4, 5, 6, 0xEE];
        let tex = decode_bmp(&bmp_bytes(1, 2, 24, &payload)).expect("decode");
        assert_eq!(tex.pixels, vec![3, 2, 1, 255, 6, 5, 4, 255]);
    }

    #[test]
    fn rejects_unsupported_bpp() {
        let err = decode_bmp(&bmp_bytes(1, 1, 32, &[0; 8])).unwrap_err();
        match err {
            AssetError::UnsupportedFormat { bits_per_pixel } => assert_eq!(bits_per_pixel, 32),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let err = decode_bmp(&bmp_bytes(2048, 2, 24, &[])).unwrap_err();
        assert!(matches!(err, AssetError::DimensionExceeded { .. }));

        // A negative dimension reads as out of range too, never as a
        // huge allocation.
        let err = decode_bmp(&bmp_bytes(2, -2, 24, &[])).unwrap_err();
        assert!(matches!(err, AssetError::DimensionExceeded { .. }));
    }

    #[test]
    fn rejects_truncated_header_and_payload() {
        let err = decode_bmp(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));

        // Header claims 2x2 but carries a single row.
        let err = decode_bmp(&bmp_bytes(2, 2, 24, &[0; 8])).unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn missing_path_yields_io_fault() {
        let err = load_bmp_from_path("no/such/texture.bmp").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
