use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::height_field::HeightField;
use crate::math;

/// Grid-vertex offset of each tile corner.
const CORNER_OFFSET: [(usize, usize); 4] = [(1, 1), (0, 1), (0, 0), (1, 0)];

/// Noise parameters for an optional starting landscape.
#[derive(Clone, Debug, Reflect)]
pub struct SculptSettings {
    /// Seed for the height noise generator.
    pub seed: u32,
    /// Number of octaves.
    pub octaves: usize,
    /// Spatial scale divisor, in tiles.
    pub scale: f64,
    /// Largest height, in steps, above or below zero.
    pub amplitude: i8,
}

impl Default for SculptSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 4,
            scale: 12.0,
            amplitude: 4,
        }
    }
}

/// Drives every tile corner toward a noise-derived height at its grid vertex.
///
/// Goes through [`HeightField::move_corner`], so neighbouring corners of a
/// tile may end up short of their target where the slope limit bites.
pub fn apply(field: &mut HeightField, s: &SculptSettings) {
    let fbm: Fbm<Perlin> = Fbm::new(s.seed).set_octaves(s.octaves);
    let amp = f32::from(s.amplitude.saturating_abs());
    let target = |gx: usize, gy: usize| {
        let n = fbm.get([gx as f64 / s.scale, gy as f64 / s.scale]);
        math::map_noise_to_range(n, -amp, amp)
            .round()
            .clamp(-amp, amp) as i16
    };

    for (x, y) in field.coords() {
        for (corner, (dx, dy)) in CORNER_OFFSET.into_iter().enumerate() {
            let current = i16::from(field.tile(x, y).height(corner));
            let delta = (target(x + dx, y + dy) - current).clamp(-127, 127) as i8;
            field.move_corner(x, y, corner, delta);
        }
    }
    debug!(
        "Sculpted {}x{} terrain (seed {}, amplitude {})",
        field.width(),
        field.depth(),
        s.seed,
        s.amplitude
    );
}
