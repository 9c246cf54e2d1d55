use bevy::ecs::system::SystemParam;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use super::CameraConfig;

/// Marker component for the editor camera entity.
#[derive(Component, Reflect)]
pub struct EditorCamera;

/// Orbit state the camera transform is derived from each frame.
#[derive(Resource, Default, Debug, Reflect)]
pub struct CameraRig {
    /// World-space point the camera looks at.
    pub focus: Vec3,
    /// Current orbit angle (radians).
    pub yaw: f32,
    /// Orbit angle being turned toward; always a multiple of a quarter turn.
    pub target_yaw: f32,
}

/// Bundled input parameters for [`super::systems::steer_camera`].
#[derive(SystemParam)]
pub struct CameraInput<'w, 's> {
    /// Keyboard state.
    pub keys: Res<'w, ButtonInput<KeyCode>>,
    /// Scroll wheel messages.
    pub scroll: MessageReader<'w, 's, MouseWheel>,
    /// Frame time.
    pub time: Res<'w, Time>,
    /// Camera configuration.
    pub cfg: Res<'w, CameraConfig>,
}
