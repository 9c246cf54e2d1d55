use std::f32::consts::FRAC_PI_2;

use bevy::camera::ScalingMode;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::MouseScrollUnit;
use bevy::prelude::*;

use super::CameraConfig;
use super::entities::{CameraInput, CameraRig, EditorCamera};
use crate::math;
use crate::terrain::HeightField;

/// Spawns the orthographic Camera3d with the [`EditorCamera`] marker.
///
/// Tonemapping is off so baked vertex shades reach the screen unchanged.
pub fn spawn_camera(mut commands: Commands, cfg: Res<CameraConfig>, rig: Res<CameraRig>) {
    commands.spawn((
        Name::new("EditorCamera"),
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: cfg.viewport_height,
            },
            ..OrthographicProjection::default_3d()
        }),
        Tonemapping::None,
        rig_transform(&rig, &cfg),
        EditorCamera,
    ));
}

/// Points the rig at the middle of a newly inserted height field.
pub fn center_on_terrain(field: Res<HeightField>, mut rig: ResMut<CameraRig>) {
    let middle = Vec3::new(field.width() as f32 / 2.0, field.depth() as f32 / 2.0, 0.0);
    rig.focus = math::grid_to_world(middle, 0.0);
}

/// WASD/arrow pan, Q/E quarter-turn orbit and scroll zoom.
pub fn steer_camera(
    mut input: CameraInput,
    mut rig: ResMut<CameraRig>,
    mut query: Query<(&mut Transform, &mut Projection), With<EditorCamera>>,
) {
    let Ok((mut transform, mut projection)) = query.single_mut() else {
        return;
    };
    let Projection::Orthographic(ortho) = &mut *projection else {
        return;
    };

    // Quarter turns
    if input.keys.just_pressed(KeyCode::KeyQ) {
        rig.target_yaw -= FRAC_PI_2;
    }
    if input.keys.just_pressed(KeyCode::KeyE) {
        rig.target_yaw += FRAC_PI_2;
    }
    let remaining = rig.target_yaw - rig.yaw;
    rig.yaw = if remaining.abs() < 1e-3 {
        rig.target_yaw
    } else {
        rig.yaw + remaining * input.cfg.turn_lerp
    };

    // Zoom
    for ev in input.scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        ortho.scale = math::zoom_scale(
            ortho.scale,
            lines,
            input.cfg.zoom_sensitivity,
            input.cfg.min_scale,
            input.cfg.max_scale,
        );
    }

    // Pan in the camera's forward/right plane (XZ only)
    let forward = transform.forward();
    let forward_xz = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = transform.right();
    let right_xz = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let axes = pan_axes(&input.keys);
    let direction = forward_xz * axes.y + right_xz * axes.x;
    if direction != Vec3::ZERO {
        let speed = input.cfg.pan_speed * input.cfg.viewport_height * ortho.scale;
        rig.focus += direction.normalize() * speed * input.time.delta_secs();
    }

    *transform = rig_transform(&rig, &input.cfg);
}

/// Held pan keys as `(right, forward)`, each in `-1..=1`.
///
/// Zero while Ctrl is held, so Ctrl+S saves without moving the camera.
fn pan_axes(keys: &ButtonInput<KeyCode>) -> Vec2 {
    if keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
        return Vec2::ZERO;
    }
    let axis = |pos: [KeyCode; 2], neg: [KeyCode; 2]| {
        match (keys.any_pressed(pos), keys.any_pressed(neg)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    };
    Vec2::new(
        axis(
            [KeyCode::KeyD, KeyCode::ArrowRight],
            [KeyCode::KeyA, KeyCode::ArrowLeft],
        ),
        axis(
            [KeyCode::KeyW, KeyCode::ArrowUp],
            [KeyCode::KeyS, KeyCode::ArrowDown],
        ),
    )
}

fn rig_transform(rig: &CameraRig, cfg: &CameraConfig) -> Transform {
    let eye = rig.focus + math::orbit_offset(rig.yaw, cfg.pitch, cfg.distance);
    Transform::from_translation(eye).looking_at(rig.focus, Vec3::Y)
}
