//! Fault kinds for the ingestion pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading a mesh or texture.
/// Faults are local to one load call; nothing is retried and no stage
/// ever continues with partial or guessed data.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("asset {path} is {size} bytes, exceeds staging capacity of {max} bytes")]
    CapacityExceeded { path: PathBuf, size: u64, max: u64 },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("face {face} references {kind} index {index}, but only {count} were parsed")]
    IndexOutOfRange {
        face: usize,
        kind: &'static str,
        index: u32,
        count: usize,
    },

    #[error("unsupported bitmap format: {bits_per_pixel} bits per pixel")]
    UnsupportedFormat { bits_per_pixel: u16 },

    #[error("bitmap is {width}x{height}, exceeds max texture size {max}")]
    DimensionExceeded { width: i32, height: i32, max: u32 },
}

impl AssetError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn parse_at(line: usize, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            message: format!("line {line}: {message}"),
        }
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
