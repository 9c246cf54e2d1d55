//! Baked per-shape lighting.
//!
//! Each tile is split into two triangles around its reference corner; the
//! table gives the brightness of the front and back triangle. Entries are
//! picked from a fixed brightness ring so that slopes facing the same way get
//! the same shade, approximating a single light without any lighting math.

use super::shape::TileShape;

/// Shade of every triangle on a flat tile.
pub const NEUTRAL: f32 = 0.8;

/// Brightness ring sampled at rotation-dependent offsets.
const RING: [f32; 8] = [0.65, 0.60, 0.70, 0.75, 0.95, 1.0, 0.90, 0.85];

fn ring(offset: isize) -> f32 {
    RING[offset.rem_euclid(RING.len() as isize) as usize]
}

/// `(front, back)` brightness for a tile of `shape` anchored on `corner`.
pub fn shading(shape: TileShape, corner: usize) -> (f32, f32) {
    let k = (corner % 4) as isize;
    match shape {
        TileShape::Flat => (NEUTRAL, NEUTRAL),
        TileShape::OneUp => (ring(2 * k - 4), NEUTRAL),
        TileShape::OneDown => (ring(2 * k), NEUTRAL),
        TileShape::Parallel => (ring(2 * k + 1), ring(2 * k + 1)),
        TileShape::Steep => (ring(2 * k), ring(2 * k)),
        TileShape::Fold => (ring(2 * k - 4), ring(2 * k)),
    }
}
