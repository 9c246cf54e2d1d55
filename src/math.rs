//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec2` / `Vec3` inputs, making them straightforward to
//! unit-test.

use bevy::prelude::{Vec2, Vec3};

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Computes the face normal of a triangle defined by three vertices.
///
/// Uses the cross product of edges `(v1 - v0)` and `(v2 - v0)`.
/// Returns `Vec3::ZERO` if the triangle is degenerate (collinear points).
pub fn compute_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(edge2).normalize_or_zero()
}

/// Grid-space point `(x, y, height)` to world space.
///
/// Grid x runs along world +X, grid y along world −Z and height along +Y,
/// which keeps counter-clockwise corner order counter-clockwise when seen
/// from above.
pub fn grid_to_world(grid: Vec3, height_step: f32) -> Vec3 {
    Vec3::new(grid.x, grid.z * height_step, -grid.y)
}

/// Footprint of a world-space point on the grid plane (inverse of [`grid_to_world`]).
pub fn world_to_grid(world: Vec3) -> Vec2 {
    Vec2::new(world.x, -world.z)
}

/// Corner index of the tile quadrant containing a fractional in-tile position.
///
/// `fx`, `fy` are in `[0, 1)`; corners follow the tile order
/// 0 = +x+y, 1 = −x+y, 2 = −x−y, 3 = +x−y.
pub fn quadrant_corner(fx: f32, fy: f32) -> usize {
    match (fx >= 0.5, fy >= 0.5) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    }
}

/// Direction of a drag that has travelled `travel` pixels upward.
///
/// Returns `+1` once the travel reaches `threshold`, `-1` once it reaches
/// `-threshold`, and `0` in between.
pub fn drag_step(travel: f32, threshold: f32) -> i8 {
    if travel >= threshold {
        1
    } else if travel <= -threshold {
        -1
    } else {
        0
    }
}

/// Camera offset from its focus point for an orbit `yaw` and `pitch` (radians).
///
/// At `yaw = 0` the camera sits toward world −X/+Z, i.e. over the grid origin
/// corner, looking at the focus.
pub fn orbit_offset(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    let horizontal = distance * pitch.cos();
    let heading = yaw + std::f32::consts::FRAC_PI_4 * 3.0;
    Vec3::new(
        horizontal * heading.cos(),
        distance * pitch.sin(),
        horizontal * heading.sin(),
    )
}

/// Applies a scroll amount to an orthographic scale, clamped to `[min, max]`.
///
/// Scrolling up (`lines > 0`) zooms in.
pub fn zoom_scale(scale: f32, lines: f32, sensitivity: f32, min: f32, max: f32) -> f32 {
    (scale * (1.0 - lines * sensitivity).max(0.1)).clamp(min, max)
}

/// Opacity of the highlight glow at texture coordinate `(u, v)`.
///
/// Peaks at `(1, 1)` and falls off quadratically to zero at `radius`.
pub fn glow_alpha(u: f32, v: f32, radius: f32) -> f32 {
    let d = Vec2::new(1.0 - u, 1.0 - v).length() / radius;
    (1.0 - d).clamp(0.0, 1.0).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_min_maps_to_range_min() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn noise_max_maps_to_range_max() {
        assert_eq!(map_noise_to_range(1.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn noise_works_with_negative_range() {
        let result = map_noise_to_range(0.0, -4.0, 4.0);
        assert!(result.abs() < 1e-6);
    }

    // ── compute_normal ──────────────────────────────────────────────

    #[test]
    fn normal_of_xz_plane_triangle() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::Z);
        // Cross of X × Z = -Y
        assert!((n - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_returns_zero() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }

    // ── grid / world ────────────────────────────────────────────────

    #[test]
    fn grid_to_world_maps_axes() {
        let w = grid_to_world(Vec3::new(2.0, 3.0, 4.0), 0.5);
        assert_eq!(w, Vec3::new(2.0, 2.0, -3.0));
        assert_eq!(world_to_grid(w), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn counter_clockwise_corners_face_up() {
        // Corners 3, 0, 1 of a flat tile: the first top triangle.
        let a = grid_to_world(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let b = grid_to_world(Vec3::new(1.0, 1.0, 0.0), 1.0);
        let c = grid_to_world(Vec3::new(0.0, 1.0, 0.0), 1.0);
        assert!((compute_normal(a, b, c) - Vec3::Y).length() < 1e-6);
    }

    // ── quadrant_corner ─────────────────────────────────────────────

    #[test]
    fn quadrants_follow_corner_order() {
        assert_eq!(quadrant_corner(0.9, 0.9), 0);
        assert_eq!(quadrant_corner(0.1, 0.9), 1);
        assert_eq!(quadrant_corner(0.1, 0.1), 2);
        assert_eq!(quadrant_corner(0.9, 0.1), 3);
    }

    // ── drag_step ───────────────────────────────────────────────────

    #[test]
    fn drag_below_threshold_is_still() {
        assert_eq!(drag_step(5.0, 12.0), 0);
        assert_eq!(drag_step(-11.9, 12.0), 0);
    }

    #[test]
    fn drag_past_threshold_moves() {
        assert_eq!(drag_step(12.0, 12.0), 1);
        assert_eq!(drag_step(-30.0, 12.0), -1);
    }

    // ── camera helpers ──────────────────────────────────────────────

    #[test]
    fn orbit_offset_has_requested_length() {
        let off = orbit_offset(0.7, 0.6, 20.0);
        assert!((off.length() - 20.0).abs() < 1e-4);
        assert!(off.y > 0.0);
    }

    #[test]
    fn default_orbit_sits_over_origin_corner() {
        let off = orbit_offset(0.0, 0.6, 10.0);
        assert!(off.x < 0.0 && off.z > 0.0);
        assert!((off.x + off.z).abs() < 1e-4);
    }

    #[test]
    fn zoom_in_shrinks_scale() {
        assert!(zoom_scale(1.0, 1.0, 0.1, 0.1, 10.0) < 1.0);
        assert!(zoom_scale(1.0, -1.0, 0.1, 0.1, 10.0) > 1.0);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(zoom_scale(0.2, 50.0, 0.1, 0.1, 10.0), 0.1);
        assert_eq!(zoom_scale(9.0, -50.0, 0.1, 0.1, 10.0), 10.0);
    }

    // ── glow_alpha ──────────────────────────────────────────────────

    #[test]
    fn glow_peaks_at_far_corner() {
        assert_eq!(glow_alpha(1.0, 1.0, 0.7), 1.0);
        assert_eq!(glow_alpha(0.0, 0.0, 0.7), 0.0);
        assert!(glow_alpha(0.9, 0.9, 0.7) > glow_alpha(0.6, 0.9, 0.7));
    }
}
