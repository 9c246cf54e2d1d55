//! Tile terrain: height field, mesh generation, corner picking and editing.
//!
//! The height field is the single source of truth. Input systems mutate it,
//! then the surface mesh is regenerated and the highlight redrawn within the
//! same frame.

mod entities;
mod height_field;
mod mesh_builder;
mod persist;
mod sculpt;
mod shading;
mod shape;
mod startup_systems;
mod systems;

pub use height_field::HeightField;
pub use sculpt::SculptSettings;

use std::path::PathBuf;

use bevy::prelude::*;

use crate::GameState;

/// Nested configuration for the terrain subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Grid size and vertical scale.
    pub grid: GridSettings,
    /// Mouse editing settings.
    pub editing: EditSettings,
    /// Noise landscape applied to newly created fields.
    pub sculpt: Option<SculptSettings>,
    /// File the height field is loaded from and saved to.
    pub save_path: PathBuf,
    /// Ignore any saved field at startup.
    pub fresh: bool,
    /// Background clear color.
    pub clear_color: Color,
}

/// Grid dimensions used when no saved field is loaded.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Number of tile columns.
    pub width: usize,
    /// Number of tile rows.
    pub depth: usize,
    /// World-space height of one step.
    pub height_step: f32,
}

/// Mouse editing settings.
#[derive(Clone, Debug, Reflect)]
pub struct EditSettings {
    /// Vertical cursor travel, in pixels, per height step.
    pub drag_threshold: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                width: 16,
                depth: 16,
                height_step: 0.5,
            },
            editing: EditSettings {
                drag_threshold: 12.0,
            },
            sculpt: None,
            save_path: PathBuf::from("terrain.hfld"),
            fresh: false,
            clear_color: Color::srgb(0.5, 0.5, 0.35),
        }
    }
}

/// Terrain plugin: field setup at startup, editing and mesh upkeep at runtime.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainConfig>()
            .register_type::<entities::TerrainSurface>()
            .register_type::<entities::HighlightOverlay>()
            .register_type::<entities::PointedCorner>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<entities::PointedCorner>()
            .init_resource::<entities::DragState>()
            .add_systems(Startup, startup_systems::spawn_terrain)
            .add_systems(
                Update,
                (systems::pick_corner, systems::drag_corner)
                    .chain()
                    .run_if(in_state(GameState::Editing)),
            )
            .add_systems(
                Update,
                (systems::regenerate_mesh, systems::update_highlight)
                    .chain()
                    .after(systems::drag_corner),
            )
            .add_systems(OnExit(GameState::Editing), systems::release_pointer)
            .add_systems(Update, (systems::save_on_key, systems::log_height_field))
            .add_systems(Last, systems::save_on_exit);

        app.add_systems(
            Update,
            systems::draw_tile_labels.run_if(in_state(GameState::Debugging)),
        );
    }
}
