use std::fmt;

use bevy::prelude::*;

use crate::math;

/// Height used for every corner of the off-grid sentinel tile.
pub const SKIRT_FLOOR: i8 = -10;

/// Four corner heights of one tile, counter-clockwise from `+x+y`.
///
/// ```text
/// 1 ─── 0
/// │     │
/// 2 ─── 3
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    /// Heights indexed by corner (0 = +x+y, 1 = −x+y, 2 = −x−y, 3 = +x−y).
    pub corners: [i8; 4],
}

impl Tile {
    /// Tile standing in for any neighbour outside the grid.
    pub const SENTINEL: Tile = Tile {
        corners: [SKIRT_FLOOR; 4],
    };

    /// Height of corner `c`, taken modulo 4.
    pub fn height(&self, c: usize) -> i8 {
        self.corners[c % 4]
    }

    /// Highest and lowest corner.
    pub fn span(&self) -> (i8, i8) {
        let max = self.corners.iter().copied().max().unwrap_or_default();
        let min = self.corners.iter().copied().min().unwrap_or_default();
        (max, min)
    }

    /// Every pair of adjacent corners differs by at most one step.
    ///
    /// Implies that opposite corners differ by at most two, and that a
    /// two-step spread can only run between opposite corners.
    pub fn is_legal(&self) -> bool {
        (0..4).all(|c| (i16::from(self.height(c)) - i16::from(self.height(c + 1))).abs() <= 1)
    }
}

/// A single corner of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct CornerRef {
    /// Tile column.
    pub x: usize,
    /// Tile row.
    pub y: usize,
    /// Corner index 0..3.
    pub corner: usize,
}

/// Width × depth grid of tiles, each with independent corner heights.
///
/// Neighbouring tiles never share storage: a grid vertex may have up to four
/// different heights, one per tile meeting there, which is how cliffs form.
///
/// Not reflected: every write has to go through [`Self::move_corner`].
#[derive(Resource, Clone, Debug)]
pub struct HeightField {
    width: usize,
    depth: usize,
    tiles: Vec<Tile>,
    dirty: bool,
}

impl HeightField {
    /// Flat field with every corner at zero.
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            tiles: vec![Tile::default(); width * depth],
            dirty: true,
        }
    }

    /// Rebuilds a field from tiles stored x-major, then y.
    pub fn from_tiles(width: usize, depth: usize, tiles: Vec<Tile>) -> Self {
        assert_eq!(tiles.len(), width * depth, "tile count must match grid size");
        Self {
            width,
            depth,
            tiles,
            dirty: true,
        }
    }

    /// Number of tile columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tile rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// All tiles, x-major then y.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Every `(x, y)` in storage order.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let depth = self.depth;
        (0..self.width).flat_map(move |x| (0..depth).map(move |y| (x, y)))
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.depth,
            "tile ({x},{y}) outside {}x{} grid",
            self.width,
            self.depth
        );
        x * self.depth + y
    }

    /// Corner heights of tile `(x, y)`. Panics outside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Tile {
        self.tiles[self.index(x, y)]
    }

    /// Tile at `(x - 1, y)`, or [`Tile::SENTINEL`] on the left edge.
    pub fn left_neighbor(&self, x: usize, y: usize) -> Tile {
        x.checked_sub(1)
            .map_or(Tile::SENTINEL, |left| self.tile(left, y))
    }

    /// Tile at `(x, y - 1)`, or [`Tile::SENTINEL`] on the bottom edge.
    pub fn lower_neighbor(&self, x: usize, y: usize) -> Tile {
        y.checked_sub(1)
            .map_or(Tile::SENTINEL, |lower| self.tile(x, lower))
    }

    /// Raises (`amount > 0`) or lowers one corner of one tile.
    ///
    /// The two adjacent corners are dragged to within one step of the moved
    /// corner and the opposite corner to within two. Neighbouring tiles are
    /// left alone. A zero amount changes nothing and leaves the field clean.
    pub fn move_corner(&mut self, x: usize, y: usize, corner: usize, amount: i8) {
        if amount == 0 {
            return;
        }
        let idx = self.index(x, y);
        let tile = &mut self.tiles[idx];
        let rot = |k: usize| (corner + k) % 4;

        let moved = (i16::from(tile.corners[rot(0)]) + i16::from(amount))
            .clamp(i16::from(i8::MIN), i16::from(i8::MAX));
        tile.corners[rot(0)] = moved as i8;

        for (k, reach) in [(1, 1), (2, 2), (3, 1)] {
            let current = i16::from(tile.corners[rot(k)]);
            let bounded = if amount > 0 {
                current.max(moved - reach)
            } else {
                current.min(moved + reach)
            };
            tile.corners[rot(k)] = bounded.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8;
        }

        debug_assert!(
            tile.is_legal(),
            "corner edit left tile ({x},{y}) illegal: {:?}",
            tile.corners
        );
        self.dirty = true;
    }

    /// Returns whether the field changed since the last call, and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Tile corner whose quadrant contains `point` (grid space, tile units).
    pub fn corner_at(&self, point: Vec2) -> Option<CornerRef> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let (x, y) = (point.x.floor() as usize, point.y.floor() as usize);
        if x >= self.width || y >= self.depth {
            return None;
        }
        let corner = math::quadrant_corner(point.x.fract(), point.y.fract());
        Some(CornerRef { x, y, corner })
    }
}

impl fmt::Display for HeightField {
    /// Boxed text view of at most the 10×10 lower-left tiles, top row first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width.min(10);
        let rows = self.depth.min(10);
        let rule = format!("+{}", "-------+".repeat(width));

        for y in (0..rows).rev() {
            writeln!(f, "{rule}")?;
            let line = |a: usize, b: usize| {
                (0..width)
                    .map(|x| {
                        let t = self.tile(x, y);
                        format!("{:<3} {:>3}", t.height(a), t.height(b))
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            };
            writeln!(f, "|{}|", line(1, 0))?;
            let labels = (0..width)
                .map(|x| format!("{:^7}", format!("({x},{y})")))
                .collect::<Vec<_>>()
                .join("|");
            writeln!(f, "|{labels}|")?;
            writeln!(f, "|{}|", line(2, 3))?;
        }
        write!(f, "{rule}")
    }
}
