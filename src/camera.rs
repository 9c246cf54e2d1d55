//! Orthographic three-quarter editor camera.
//!
//! WASD/arrows pan the focus point, Q/E orbit by quarter turns and the
//! scroll wheel zooms. The camera always looks at [`CameraRig::focus`].

mod entities;
mod systems;

pub use entities::EditorCamera;

use bevy::prelude::*;

use crate::terrain::HeightField;

/// Per-plugin configuration for the editor camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Pan speed in viewport heights per second.
    pub pan_speed: f32,
    /// Elevation angle above the ground plane (radians).
    pub pitch: f32,
    /// Distance from the focus point along the view direction.
    pub distance: f32,
    /// Initial visible height of the viewport, in world units.
    pub viewport_height: f32,
    /// Zoom change per scroll line, as a fraction of the current scale.
    pub zoom_sensitivity: f32,
    /// Closest zoom, as an orthographic scale.
    pub min_scale: f32,
    /// Farthest zoom, as an orthographic scale.
    pub max_scale: f32,
    /// Fraction of the remaining quarter turn covered per frame.
    pub turn_lerp: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 0.6,
            pitch: 0.6155,
            distance: 60.0,
            viewport_height: 18.0,
            zoom_sensitivity: 0.1,
            min_scale: 0.2,
            max_scale: 5.0,
            turn_lerp: 0.2,
        }
    }
}

/// Orthographic camera with pan, quarter-turn orbit and zoom.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraConfig>()
            .register_type::<EditorCamera>()
            .register_type::<entities::CameraRig>()
            .insert_resource(self.0.clone())
            .init_resource::<entities::CameraRig>()
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                systems::center_on_terrain.run_if(resource_added::<HeightField>),
            )
            .add_systems(
                Update,
                systems::steer_camera.after(systems::center_on_terrain),
            );
    }
}
