//! Bounded staging buffer for whole-file asset reads.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AssetError, AssetResult};

/// An asset file held fully in memory, owned by a single load call.
///
/// The backing buffer is zero-filled and one byte longer than the content,
/// so the content is always followed by a NUL terminator regardless of the
/// file's end-of-line style.
#[derive(Debug)]
pub struct RawAsset {
    buf: Vec<u8>,
    len: usize,
}

impl RawAsset {
    /// Read `path` in full, rejecting files larger than `max_size` bytes
    /// before any buffer is allocated.
    pub fn read(path: impl AsRef<Path>, max_size: u64) -> AssetResult<Self> {
        let path = path.as_ref();
        let io_err = |source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();
        if size > max_size {
            log::error!(
                "asset {} is too large: {} bytes (max {})",
                path.display(),
                size,
                max_size
            );
            return Err(AssetError::CapacityExceeded {
                path: path.to_path_buf(),
                size,
                max: max_size,
            });
        }

        let len = size as usize;
        let mut buf = vec![0u8; len + 1];
        file.read_exact(&mut buf[..len]).map_err(io_err)?;

        log::debug!("read asset {} ({} bytes)", path.display(), len);
        Ok(Self { buf, len })
    }

    /// The file content, without the trailing NUL.
    pub fn content(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The content as text. Faults on non-UTF-8 bytes.
    pub fn as_str(&self) -> AssetResult<&str> {
        std::str::from_utf8(self.content())
            .map_err(|e| AssetError::parse(format!("asset is not valid UTF-8 text: {e}")))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_content_with_nul_terminator() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"v 1 2 3\n").expect("write");

        let raw = RawAsset::read(file.path(), 64).expect("read");
        assert_eq!(raw.content(), b"v 1 2 3\n");
        assert_eq!(raw.len(), 8);
        assert_eq!(raw.as_str().expect("utf8"), "v 1 2 3\n");
    }

    #[test]
    fn missing_file_is_io_fault() {
        let err = RawAsset::read("no/such/asset.obj", 64).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"0123456789").expect("write");

        let err = RawAsset::read(file.path(), 4).unwrap_err();
        match err {
            AssetError::CapacityExceeded { size, max, .. } => {
                assert_eq!(size, 10);
                assert_eq!(max, 4);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let raw = RawAsset::read(file.path(), 4).expect("read");
        assert!(raw.is_empty());
        assert_eq!(raw.as_str().expect("utf8"), "");
    }
}
