use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::TerrainConfig;
use super::entities::{HighlightOverlay, MeshCache, TerrainSurface};
use super::height_field::HeightField;
use super::{persist, sculpt};
use crate::math;

const GLOW_SIZE: u32 = 64;
const GLOW_RADIUS: f32 = 0.7;

// ── Startup ─────────────────────────────────────────────────────────

/// Loads or creates the [`HeightField`] and spawns the surface and highlight
/// entities. Meshes are filled in by the first regeneration.
pub fn spawn_terrain(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    cfg: Res<TerrainConfig>,
) {
    let field = (!cfg.fresh)
        .then(|| persist::try_load(&cfg.save_path))
        .flatten()
        .unwrap_or_else(|| new_field(&cfg));

    let surface = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        cull_mode: None,
        ..default()
    });
    let highlight = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        base_color_texture: Some(images.add(glow_image())),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        TerrainSurface,
        Name::new(format!("Terrain({}x{})", field.width(), field.depth())),
        Mesh3d::default(),
        MeshMaterial3d(surface),
        Transform::default(),
    ));
    commands.spawn((
        HighlightOverlay,
        Name::new("Highlight"),
        Mesh3d::default(),
        MeshMaterial3d(highlight),
        Transform::default(),
        Visibility::Hidden,
    ));

    commands.insert_resource(MeshCache::Dirty);
    commands.insert_resource(field);
}

fn new_field(cfg: &TerrainConfig) -> HeightField {
    let mut field = HeightField::new(cfg.grid.width, cfg.grid.depth);
    if let Some(s) = &cfg.sculpt {
        sculpt::apply(&mut field, s);
    }
    info!("Created {}x{} terrain", field.width(), field.depth());
    field
}

/// White square whose alpha glows toward texture coordinate `(1, 1)`.
fn glow_image() -> Image {
    let n = GLOW_SIZE as f32;
    let data: Vec<u8> = (0..GLOW_SIZE)
        .flat_map(|py| (0..GLOW_SIZE).map(move |px| (px, py)))
        .flat_map(|(px, py)| {
            let u = (px as f32 + 0.5) / n;
            let v = (py as f32 + 0.5) / n;
            let a = math::glow_alpha(u, v, GLOW_RADIUS);
            [255, 255, 255, (a * 255.0).round() as u8]
        })
        .collect();

    Image::new(
        Extent3d {
            width: GLOW_SIZE,
            height: GLOW_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}
