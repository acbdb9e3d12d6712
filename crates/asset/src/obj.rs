//! Two-pass OBJ-style mesh parser producing an interleaved vertex buffer.
//!
//! Pass 1 counts elements so pass 2 can pre-size its storage; both passes
//! share one tokenizer so they can never disagree on what a line is.
//! A line without a trailing newline is never scanned: files are expected
//! to end with a newline, and an unterminated final line is dropped by
//! both passes identically. `LoadOptions::strict_eol` turns that into a
//! fault instead.

use std::path::Path;

use crate::OBJ_MAX_SIZE;
use crate::error::{AssetError, AssetResult};
use crate::mesh::{FLOATS_PER_FACE, MeshBuffer};
use crate::raw::RawAsset;

/// Per-load knobs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    /// Fault when the mesh text does not end with a newline instead of
    /// silently dropping the final line.
    pub strict_eol: bool,
}

/// Exact occurrence counts from the first pass, used to size the
/// element arrays before the second pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementCounts {
    pub positions: usize,
    pub texcoords: usize,
    pub normals: usize,
    pub faces: usize,
}

/// Parallel element arrays filled by the second pass. Face entries hold
/// nine 1-based indices: position/texcoord/normal per corner, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshArrays {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 9]>,
}

impl MeshArrays {
    fn with_counts(counts: &ElementCounts) -> Self {
        Self {
            positions: Vec::with_capacity(counts.positions),
            texcoords: Vec::with_capacity(counts.texcoords),
            normals: Vec::with_capacity(counts.normals),
            faces: Vec::with_capacity(counts.faces),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Position,
    Texcoord,
    Normal,
    Face,
}

impl LineKind {
    /// Byte length of the line marker; element tokens start after it.
    fn marker_len(self) -> usize {
        match self {
            Self::Position => 2,
            Self::Texcoord | Self::Normal => 3,
            Self::Face => 1,
        }
    }
}

/// Longest-prefix line classification shared by both passes.
/// Unrecognized lines (comments, `o`/`g`/`s`/`usemtl`, blanks) are skipped.
fn classify(line: &str) -> Option<LineKind> {
    if line.starts_with("v ") {
        Some(LineKind::Position)
    } else if line.starts_with("vt") {
        Some(LineKind::Texcoord)
    } else if line.starts_with("vn") {
        Some(LineKind::Normal)
    } else if line.starts_with('f') {
        Some(LineKind::Face)
    } else {
        None
    }
}

/// Yields `(line_no, line)` for every newline-terminated line, with any
/// trailing `\r` stripped. The final line is skipped when unterminated,
/// so both passes see the same set of lines.
fn terminated_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = text;
    let mut line_no = 0usize;
    std::iter::from_fn(move || {
        let nl = rest.find('\n')?;
        let line = rest[..nl].trim_end_matches('\r');
        rest = &rest[nl + 1..];
        line_no += 1;
        Some((line_no, line))
    })
}

/// First pass: count positions, texcoords, normals and faces.
pub fn scan_counts(text: &str) -> ElementCounts {
    let mut counts = ElementCounts::default();
    for (_, line) in terminated_lines(text) {
        match classify(line) {
            Some(LineKind::Position) => counts.positions += 1,
            Some(LineKind::Texcoord) => counts.texcoords += 1,
            Some(LineKind::Normal) => counts.normals += 1,
            Some(LineKind::Face) => counts.faces += 1,
            None => {}
        }
    }
    counts
}

/// Second pass: fill the element arrays, storage pre-sized from `counts`.
/// Any malformed token faults the whole load; there is no partial mesh.
pub fn parse_elements(text: &str, counts: &ElementCounts) -> AssetResult<MeshArrays> {
    let mut arrays = MeshArrays::with_counts(counts);
    for (line_no, line) in terminated_lines(text) {
        let Some(kind) = classify(line) else {
            continue;
        };
        let body = line.get(kind.marker_len()..).unwrap_or("");
        match kind {
            LineKind::Position => arrays.positions.push(parse_floats(body, line_no, "position")?),
            LineKind::Texcoord => arrays.texcoords.push(parse_floats(body, line_no, "texcoord")?),
            LineKind::Normal => arrays.normals.push(parse_floats(body, line_no, "normal")?),
            LineKind::Face => arrays.faces.push(parse_face(body, line_no)?),
        }
    }
    Ok(arrays)
}

/// Parses the first `N` whitespace-delimited floats of `body`. Trailing
/// tokens are ignored (vertex colors after `v x y z`, a third texcoord).
fn parse_floats<const N: usize>(
    body: &str,
    line_no: usize,
    what: &str,
) -> AssetResult<[f32; N]> {
    let mut out = [0f32; N];
    let mut tokens = body.split_whitespace();
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            AssetError::parse_at(line_no, format_args!("{} needs {} values, found {}", what, N, i))
        })?;
        *slot = token.parse::<f32>().map_err(|_| {
            AssetError::parse_at(line_no, format_args!("invalid {what} value '{token}'"))
        })?;
    }
    Ok(out)
}

/// Parses a face body into nine 1-based indices, split on whitespace or
/// `/`. Every corner must carry a full position/texcoord/normal triple;
/// anything else would silently misindex, so it faults instead.
fn parse_face(body: &str, line_no: usize) -> AssetResult<[u32; 9]> {
    let mut out = [0u32; 9];
    let mut tokens = body
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            AssetError::parse_at(line_no, format_args!("face needs 9 indices, found {i}"))
        })?;
        *slot = token.parse::<u32>().map_err(|_| {
            AssetError::parse_at(line_no, format_args!("invalid face index '{token}'"))
        })?;
    }
    if let Some(extra) = tokens.next() {
        return Err(AssetError::parse_at(
            line_no,
            format_args!("face has more than 9 indices (unexpected '{extra}')"),
        ));
    }
    Ok(out)
}

/// Resolves a 1-based index into an element array, faulting on 0 or
/// anything past the end.
fn resolve<const N: usize>(
    items: &[[f32; N]],
    index: u32,
    face: usize,
    kind: &'static str,
) -> AssetResult<[f32; N]> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i as usize))
        .copied()
        .ok_or(AssetError::IndexOutOfRange {
            face,
            kind,
            index,
            count: items.len(),
        })
}

/// Builds the flat interleaved buffer: per face, per corner, 8 floats
/// (position3, texcoord2, normal3). Output length is exactly
/// `faces * 24`. Pure with respect to its input.
pub fn interleave(arrays: &MeshArrays) -> AssetResult<Vec<f32>> {
    let mut vb = Vec::with_capacity(arrays.faces.len() * FLOATS_PER_FACE);
    for (face, indices) in arrays.faces.iter().enumerate() {
        for corner in indices.chunks_exact(3) {
            let position = resolve(&arrays.positions, corner[0], face, "position")?;
            let texcoord = resolve(&arrays.texcoords, corner[1], face, "texcoord")?;
            let normal = resolve(&arrays.normals, corner[2], face, "normal")?;
            vb.extend_from_slice(&position);
            vb.extend_from_slice(&texcoord);
            vb.extend_from_slice(&normal);
        }
    }
    Ok(vb)
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> AssetResult<MeshBuffer> {
    let path = path.as_ref();
    let raw = RawAsset::read(path, OBJ_MAX_SIZE)?;
    let mesh = load_obj_from_str(raw.as_str()?, options)?;
    log::info!(
        "loaded mesh {}: {} faces, {} floats",
        path.display(),
        mesh.face_count,
        mesh.vertices.len()
    );
    Ok(mesh)
}

/// Parse an in-memory mesh description.
pub fn load_obj_from_str(text: &str, options: &LoadOptions) -> AssetResult<MeshBuffer> {
    if options.strict_eol && !text.is_empty() && !text.ends_with('\n') {
        return Err(AssetError::parse(
            "mesh text does not end with a newline (strict mode)",
        ));
    }

    let counts = scan_counts(text);
    log::debug!(
        "mesh counts: {} positions, {} texcoords, {} normals, {} faces",
        counts.positions,
        counts.texcoords,
        counts.normals,
        counts.faces
    );

    let arrays = parse_elements(text, &counts)?;
    let vertices = interleave(&arrays)?;
    Ok(MeshBuffer::new(vertices, counts.faces as u32))
}
