//! Height-field file format.
//!
//! ```text
//! "HFLD"            magic
//! u8                version (1)
//! u32 LE            width
//! u32 LE            depth
//! i8 × width×depth×4 corner heights, x-major, then y, then corner
//! ```

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use thiserror::Error;

use super::height_field::{HeightField, Tile};

const MAGIC: &[u8; 4] = b"HFLD";
const VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1 + 4 + 4;

/// Errors that can occur while reading or writing a height-field file.
#[derive(Error, Debug)]
pub enum TerrainFileError {
    /// Reading or writing the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The first four bytes are not `HFLD`.
    #[error("not a height-field file")]
    BadMagic,
    /// The version byte is not one this build can read.
    #[error("unsupported height-field version {0}")]
    UnsupportedVersion(u8),
    /// The header declares zero columns or zero rows.
    #[error("height field has no tiles ({width}x{depth})")]
    EmptyGrid {
        /// Declared tile columns.
        width: usize,
        /// Declared tile rows.
        depth: usize,
    },
    /// The file length disagrees with the declared grid size.
    #[error("expected {expected} bytes, found {found}")]
    SizeMismatch {
        /// Length implied by the header.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// A stored tile has adjacent corners more than one step apart.
    #[error("tile ({x},{y}) breaks the corner slope limit: {corners:?}")]
    IllegalTile {
        /// Tile column.
        x: usize,
        /// Tile row.
        y: usize,
        /// Offending corner heights.
        corners: [i8; 4],
    },
}

/// Serializes `field` into the byte layout above.
pub fn encode(field: &HeightField) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + field.tiles().len() * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.push(VERSION);
    bytes.extend_from_slice(&(field.width() as u32).to_le_bytes());
    bytes.extend_from_slice(&(field.depth() as u32).to_le_bytes());
    bytes.extend(
        field
            .tiles()
            .iter()
            .flat_map(|t| t.corners.map(|h| h.to_le_bytes()[0])),
    );
    bytes
}

/// Parses the byte layout above, rejecting tiles no edit could have produced.
pub fn decode(bytes: &[u8]) -> Result<HeightField, TerrainFileError> {
    if bytes.len() < HEADER_LEN {
        return Err(TerrainFileError::SizeMismatch {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(TerrainFileError::BadMagic);
    }
    if header[4] != VERSION {
        return Err(TerrainFileError::UnsupportedVersion(header[4]));
    }
    let read_u32 = |at: usize| {
        u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]) as usize
    };
    let (width, depth) = (read_u32(5), read_u32(9));
    if width == 0 || depth == 0 {
        return Err(TerrainFileError::EmptyGrid { width, depth });
    }

    let expected = width
        .checked_mul(depth)
        .and_then(|n| n.checked_mul(4))
        .unwrap_or(usize::MAX);
    if body.len() != expected {
        return Err(TerrainFileError::SizeMismatch {
            expected: HEADER_LEN.saturating_add(expected),
            found: bytes.len(),
        });
    }

    let tiles: Vec<Tile> = body
        .chunks_exact(4)
        .map(|c| Tile {
            corners: [c[0], c[1], c[2], c[3]].map(|b| i8::from_le_bytes([b])),
        })
        .collect();

    if let Some(i) = tiles.iter().position(|t| !t.is_legal()) {
        return Err(TerrainFileError::IllegalTile {
            x: i / depth,
            y: i % depth,
            corners: tiles[i].corners,
        });
    }

    Ok(HeightField::from_tiles(width, depth, tiles))
}

/// Writes `field` to `path`.
pub fn save(field: &HeightField, path: &Path) -> Result<(), TerrainFileError> {
    fs::write(path, encode(field))?;
    Ok(())
}

/// Reads a field from `path`.
pub fn load(path: &Path) -> Result<HeightField, TerrainFileError> {
    decode(&fs::read(path)?)
}

/// Reads a field from `path`, logging the outcome; `None` on any failure.
pub fn try_load(path: &Path) -> Option<HeightField> {
    match load(path) {
        Ok(field) => {
            info!(
                "Loaded {}x{} terrain from {}",
                field.width(),
                field.depth(),
                path.display()
            );
            Some(field)
        }
        Err(err) => {
            warn!("Could not load terrain from {}: {err}", path.display());
            None
        }
    }
}
