use bevy::prelude::*;

use super::height_field::Tile;

/// Canonical corner-height pattern of a tile, up to rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum TileShape {
    /// `0000`
    Flat,
    /// `1000`: one corner above the other three.
    OneUp,
    /// `0111`: one corner below the other three.
    OneDown,
    /// `1100`: one edge raised.
    Parallel,
    /// `0121`: a full two-step slope between opposite corners.
    Steep,
    /// `1010`: two opposite corners raised.
    Fold,
}

impl TileShape {
    /// Short label for debug overlays.
    pub fn label(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::OneUp => "one-up",
            Self::OneDown => "one-down",
            Self::Parallel => "parallel",
            Self::Steep => "steep",
            Self::Fold => "fold",
        }
    }
}

/// Result of [`classify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Canonical shape.
    pub shape: TileShape,
    /// Base level of the shape.
    pub base: i8,
    /// Rotation anchor for shading and triangulation (0..3).
    pub reference: usize,
}

impl Classification {
    const fn new(shape: TileShape, base: i8, reference: usize) -> Self {
        Self {
            shape,
            base,
            reference,
        }
    }
}

/// Maps a legal tile to its shape, base level and reference corner.
///
/// Panics when the tile breaks the adjacency invariant upheld by
/// [`HeightField::move_corner`](super::HeightField::move_corner).
pub fn classify(tile: &Tile) -> Classification {
    let h = &tile.corners;
    let (max, min) = tile.span();
    let first = |v: i8| h.iter().position(|&c| c == v).unwrap_or_default();

    if min == max {
        return Classification::new(TileShape::Flat, h[0], 0);
    }

    if i16::from(max) - i16::from(min) == 2 {
        let i = first(min);
        assert_eq!(
            h[(i + 2) % 4],
            max,
            "two-step tile {h:?} is not an opposite-corner slope"
        );
        return Classification::new(TileShape::Steep, min + 1, i);
    }

    assert_eq!(
        i16::from(max) - i16::from(min),
        1,
        "tile {h:?} spans more than two steps"
    );

    match h.iter().filter(|&&c| c == min).count() {
        1 => Classification::new(TileShape::OneDown, max, first(min)),
        3 => Classification::new(TileShape::OneUp, min, first(max)),
        _ => {
            let i = first(min);
            if h[(i + 1) % 4] == min {
                Classification::new(TileShape::Parallel, min, i)
            } else if h[(i + 3) % 4] == min {
                Classification::new(TileShape::Parallel, min, (i + 3) % 4)
            } else {
                Classification::new(TileShape::Fold, min, (i + 1) % 4)
            }
        }
    }
}
