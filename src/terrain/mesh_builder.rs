//! Vertex stream generation for the terrain surface and the corner highlight.
//!
//! Every tile contributes exactly [`VERTICES_PER_TILE`] vertices in a fixed
//! order: six for the top face, six for the skirt against the left
//! neighbour, six for the skirt against the lower neighbour. Vertex `n` of
//! tile `(x, y)` therefore always sits at `18 * (x * depth + y) + n`.

use bevy::asset::RenderAssetUsages;
use bevy::color::ColorToComponents;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::height_field::{CornerRef, HeightField, Tile};
use super::shading::shading;
use super::shape::classify;
use crate::math;

/// Vertices emitted per tile: top face plus two skirts, two triangles each.
pub const VERTICES_PER_TILE: usize = 18;

/// Vertices in the highlight overlay.
pub const HIGHLIGHT_VERTICES: usize = 6;

/// Per-corner offset inside the tile cell, also the corner's texture coordinate.
const U: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const V: [f32; 4] = [1.0, 1.0, 0.0, 0.0];

const GRASS: [f32; 4] = [0.0, 0.5, 0.0, 1.0];
const DIRT: [f32; 4] = [0.55, 0.38, 0.2, 1.0];
const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const X_SKIRT_SHADE: f32 = 0.7;
const Y_SKIRT_SHADE: f32 = 0.9;

/// Highlight texture coordinates, indexed by corner relative to the picked one.
///
/// The glow in the highlight texture sits at `(1, 1)`, so the picked corner
/// always receives it whichever corner that is.
const HIGHLIGHT_ATLAS: [[f32; 2]; 4] = [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Lift applied to the highlight overlay so it never z-fights the surface.
const HIGHLIGHT_LIFT: f32 = 0.02;

/// One vertex of the terrain stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainVertex {
    /// Grid-space position: tile x, tile y, corner height.
    pub position: Vec3,
    /// Local texture coordinate within the tile.
    pub uv: Vec2,
    /// Straight sRGB color with alpha.
    pub color: [f32; 4],
    /// Multiplicative lighting factor.
    pub shade: f32,
}

impl TerrainVertex {
    fn at_corner(cell_x: f32, cell_y: f32, tile: &Tile, c: usize, color: [f32; 4], shade: f32) -> Self {
        let c = c % 4;
        Self {
            position: Vec3::new(cell_x + U[c], cell_y + V[c], f32::from(tile.height(c))),
            uv: Vec2::new(U[c], V[c]),
            color,
            shade,
        }
    }

    /// Color with the shade folded into RGB, in linear space.
    fn lit_color(&self) -> [f32; 4] {
        let [r, g, b, a] = self.color;
        Color::srgba(r * self.shade, g * self.shade, b * self.shade, a)
            .to_linear()
            .to_f32_array()
    }
}

/// Total vertex count of the full-grid stream.
pub fn vertex_count(width: usize, depth: usize) -> usize {
    VERTICES_PER_TILE * width * depth
}

/// Corners of the two top triangles around `reference`, front triangle first.
fn top_corners(reference: usize) -> [usize; 6] {
    let r = reference + 4;
    [r - 1, r, r + 1, r + 1, r + 2, r + 3]
}

fn push_top(out: &mut Vec<TerrainVertex>, x: usize, y: usize, tile: &Tile) {
    let class = classify(tile);
    let (front, back) = shading(class.shape, class.reference);
    let (cx, cy) = (x as f32, y as f32);
    for (i, c) in top_corners(class.reference).into_iter().enumerate() {
        let shade = if i < 3 { front } else { back };
        out.push(TerrainVertex::at_corner(cx, cy, tile, c, GRASS, shade));
    }
}

fn push_skirts(out: &mut Vec<TerrainVertex>, field: &HeightField, x: usize, y: usize, tile: &Tile) {
    let (cx, cy) = (x as f32, y as f32);

    let left = field.left_neighbor(x, y);
    let here = |c| TerrainVertex::at_corner(cx, cy, tile, c, DIRT, X_SKIRT_SHADE);
    let there = |c| TerrainVertex::at_corner(cx - 1.0, cy, &left, c, DIRT, X_SKIRT_SHADE);
    out.extend([here(2), here(1), there(0), there(0), there(3), here(2)]);

    let lower = field.lower_neighbor(x, y);
    let here = |c| TerrainVertex::at_corner(cx, cy, tile, c, DIRT, Y_SKIRT_SHADE);
    let there = |c| TerrainVertex::at_corner(cx, cy - 1.0, &lower, c, DIRT, Y_SKIRT_SHADE);
    out.extend([here(3), here(2), there(1), there(1), there(0), here(3)]);
}

/// Full-grid vertex stream: top face and both skirts for every tile.
pub fn build_terrain(field: &HeightField) -> Vec<TerrainVertex> {
    let mut out = Vec::with_capacity(vertex_count(field.width(), field.depth()));
    for (x, y) in field.coords() {
        let tile = field.tile(x, y);
        push_top(&mut out, x, y, &tile);
        push_skirts(&mut out, field, x, y, &tile);
    }
    out
}

/// Six-vertex overlay covering the tile of `at`, oriented toward its corner.
pub fn build_highlight(field: &HeightField, at: CornerRef) -> [TerrainVertex; HIGHLIGHT_VERTICES] {
    let tile = field.tile(at.x, at.y);
    let class = classify(&tile);
    let (front, back) = shading(class.shape, class.reference);
    let corners = top_corners(class.reference);
    let (cx, cy) = (at.x as f32, at.y as f32);

    std::array::from_fn(|i| {
        let c = corners[i] % 4;
        let shade = if i < 3 { front } else { back };
        let mut v = TerrainVertex::at_corner(cx, cy, &tile, c, HIGHLIGHT, shade);
        v.uv = Vec2::from(HIGHLIGHT_ATLAS[(c + 4 - at.corner % 4) % 4]);
        v
    })
}

/// Uploadable triangle-list mesh for the full-grid stream.
///
/// Attribute layout: `POSITION` (`Float32x3`, world space), `NORMAL`
/// (`Float32x3`, flat per triangle), `UV_0` (`Float32x2`), `COLOR`
/// (`Float32x4`, linear RGB premultiplied by shade). Vertex order is kept.
pub fn terrain_mesh(vertices: &[TerrainVertex], height_step: f32) -> Mesh {
    to_mesh(vertices, height_step, 0.0)
}

/// Same layout as [`terrain_mesh`], lifted slightly above the surface.
pub fn highlight_mesh(vertices: &[TerrainVertex], height_step: f32) -> Mesh {
    to_mesh(vertices, height_step, HIGHLIGHT_LIFT)
}

fn to_mesh(vertices: &[TerrainVertex], height_step: f32, lift: f32) -> Mesh {
    let positions: Vec<Vec3> = vertices
        .iter()
        .map(|v| math::grid_to_world(v.position, height_step) + Vec3::Y * lift)
        .collect();

    let normals: Vec<[f32; 3]> = positions
        .chunks_exact(3)
        .flat_map(|tri| [math::compute_normal(tri[0], tri[1], tri[2]).to_array(); 3])
        .collect();
    let uvs: Vec<[f32; 2]> = vertices.iter().map(|v| v.uv.to_array()).collect();
    let colors: Vec<[f32; 4]> = vertices.iter().map(TerrainVertex::lit_color).collect();
    let positions: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::height_field::SKIRT_FLOOR;
    use crate::terrain::shape::TileShape;

    fn tile_slice<'a>(
        verts: &'a [TerrainVertex],
        field: &HeightField,
        x: usize,
        y: usize,
    ) -> &'a [TerrainVertex] {
        let start = VERTICES_PER_TILE * (x * field.depth() + y);
        &verts[start..start + VERTICES_PER_TILE]
    }

    // ── counts ──────────────────────────────────────────────────────

    #[test]
    fn vertex_count_matches_grid() {
        for (w, d) in [(1, 1), (5, 5), (4, 3), (7, 2)] {
            let field = HeightField::new(w, d);
            let verts = build_terrain(&field);
            assert_eq!(verts.len(), 18 * w * d);
            assert_eq!(verts.len(), vertex_count(w, d));
        }
    }

    #[test]
    fn vertex_count_is_independent_of_heights() {
        let mut field = HeightField::new(3, 3);
        field.move_corner(1, 1, 0, 2);
        field.move_corner(0, 2, 3, -2);
        assert_eq!(build_terrain(&field).len(), vertex_count(3, 3));
    }

    #[test]
    fn highlight_is_six_vertices() {
        let field = HeightField::new(2, 2);
        let at = CornerRef { x: 1, y: 0, corner: 3 };
        assert_eq!(build_highlight(&field, at).len(), 6);
    }

    // ── top face ────────────────────────────────────────────────────

    #[test]
    fn flat_top_uses_neutral_shade_and_grass() {
        let field = HeightField::new(1, 1);
        let verts = build_terrain(&field);
        for v in &verts[..6] {
            assert_eq!(v.shade, 0.8);
            assert_eq!(v.color, GRASS);
            assert_eq!(v.position.z, 0.0);
        }
    }

    #[test]
    fn top_triangles_wrap_around_reference() {
        let mut field = HeightField::new(2, 2);
        // (1,1,1,0): one-down anchored on corner 3.
        field.move_corner(1, 1, 0, 1);
        field.move_corner(1, 1, 1, 1);
        field.move_corner(1, 1, 2, 1);
        assert_eq!(field.tile(1, 1).corners, [1, 1, 1, 0]);

        let verts = build_terrain(&field);
        let top = &tile_slice(&verts, &field, 1, 1)[..6];
        // Corners 2,3,0 then 0,1,2.
        let expect = [(1.0, 1.0, 1.0), (2.0, 1.0, 0.0), (2.0, 2.0, 1.0), (2.0, 2.0, 1.0), (1.0, 2.0, 1.0), (1.0, 1.0, 1.0)];
        for (v, (x, y, h)) in top.iter().zip(expect) {
            assert_eq!(v.position, Vec3::new(x, y, h));
        }
        let (front, back) = shading(TileShape::OneDown, 3);
        assert!(top[..3].iter().all(|v| v.shade == front));
        assert!(top[3..].iter().all(|v| v.shade == back));
    }

    #[test]
    fn uv_matches_corner_offsets() {
        let field = HeightField::new(1, 1);
        let verts = build_terrain(&field);
        for v in &verts[..6] {
            assert_eq!(v.uv, Vec2::new(v.position.x, v.position.y));
        }
    }

    // ── skirts ──────────────────────────────────────────────────────

    #[test]
    fn boundary_skirts_reach_sentinel_floor() {
        let field = HeightField::new(2, 2);
        let verts = build_terrain(&field);
        let origin = tile_slice(&verts, &field, 0, 0);
        let floor = f32::from(SKIRT_FLOOR);

        let x_skirt = &origin[6..12];
        assert_eq!(x_skirt.iter().filter(|v| v.position.z == floor).count(), 3);
        let y_skirt = &origin[12..18];
        assert_eq!(y_skirt.iter().filter(|v| v.position.z == floor).count(), 3);
    }

    #[test]
    fn interior_skirts_read_neighbors() {
        let mut field = HeightField::new(2, 2);
        field.move_corner(0, 1, 0, 1);
        field.move_corner(1, 0, 1, 1);
        let verts = build_terrain(&field);
        let t = tile_slice(&verts, &field, 1, 1);

        // Left neighbour (0,1) corner 0 lands on the shared edge at x = 1.
        let x_skirt = &t[6..12];
        assert_eq!(x_skirt[2].position, Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(x_skirt[4].position, Vec3::new(1.0, 1.0, 0.0));
        assert!(x_skirt.iter().all(|v| v.shade == 0.7 && v.color == DIRT));

        // Lower neighbour (1,0) corner 1 lands on the shared edge at y = 1.
        let y_skirt = &t[12..18];
        assert_eq!(y_skirt[2].position, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(y_skirt[4].position, Vec3::new(2.0, 1.0, 0.0));
        assert!(y_skirt.iter().all(|v| v.shade == 0.9 && v.color == DIRT));
    }

    #[test]
    fn skirt_quads_are_closed() {
        let field = HeightField::new(3, 2);
        let verts = build_terrain(&field);
        for (x, y) in field.coords() {
            let t = tile_slice(&verts, &field, x, y);
            for skirt in [&t[6..12], &t[12..18]] {
                assert_eq!(skirt[0], skirt[5]);
                assert_eq!(skirt[2], skirt[3]);
            }
        }
    }

    // ── highlight ───────────────────────────────────────────────────

    #[test]
    fn highlight_glow_follows_picked_corner() {
        let mut field = HeightField::new(2, 2);
        field.move_corner(0, 1, 2, 1);
        for corner in 0..4 {
            let at = CornerRef { x: 0, y: 1, corner };
            for v in build_highlight(&field, at) {
                let local = Vec2::new(v.position.x, v.position.y - 1.0);
                let is_picked = local == Vec2::new(U[corner], V[corner]);
                assert_eq!(v.uv == Vec2::new(1.0, 1.0), is_picked, "corner {corner}: {v:?}");
            }
        }
    }

    #[test]
    fn highlight_matches_top_face_positions() {
        let mut field = HeightField::new(2, 2);
        field.move_corner(1, 0, 1, 2);
        let verts = build_terrain(&field);
        let top = &tile_slice(&verts, &field, 1, 0)[..6];
        let overlay = build_highlight(&field, CornerRef { x: 1, y: 0, corner: 1 });
        for (a, b) in top.iter().zip(overlay.iter()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.shade, b.shade);
            assert_eq!(b.color, HIGHLIGHT);
        }
    }

    // ── mesh conversion ─────────────────────────────────────────────

    #[test]
    fn mesh_keeps_vertex_count() {
        let field = HeightField::new(3, 2);
        let verts = build_terrain(&field);
        let mesh = terrain_mesh(&verts, 0.5);
        assert_eq!(mesh.count_vertices(), verts.len());
    }

    #[test]
    fn lit_color_scales_rgb_only() {
        let v = TerrainVertex {
            position: Vec3::ZERO,
            uv: Vec2::ZERO,
            color: [1.0, 1.0, 1.0, 0.5],
            shade: 0.0,
        };
        assert_eq!(v.lit_color(), [0.0, 0.0, 0.0, 0.5]);
    }
}
