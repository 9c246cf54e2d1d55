use std::path::Path;

use bevy::app::AppExit;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use bevy::prelude::*;

use bevy_egui::egui;

use super::TerrainConfig;
use super::entities::{DragState, HighlightOverlay, MeshCache, PointedCorner, TerrainSurface};
use super::height_field::{CornerRef, HeightField, Tile};
use super::mesh_builder::{self, HIGHLIGHT_VERTICES, TerrainVertex};
use super::persist;
use super::shape::classify;
use crate::camera::EditorCamera;
use crate::math;

// ── Update: input ───────────────────────────────────────────────────

/// Ray casts from the cursor into the surface mesh and records the corner
/// under it. Frozen while a drag holds a corner.
pub fn pick_corner(
    mut ray_cast: MeshRayCast,
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    surface_q: Query<Entity, With<TerrainSurface>>,
    field: Res<HeightField>,
    drag: Res<DragState>,
    mut pointed: ResMut<PointedCorner>,
) {
    if drag.is_dragging() {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(surface) = surface_q.single() else {
        return;
    };

    let corner = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(cam_gt, cursor).ok())
        .and_then(|ray| {
            let only_surface = |e: Entity| e == surface;
            let settings = MeshRayCastSettings::default().with_filter(&only_surface);
            ray_cast
                .cast_ray(ray, &settings)
                .first()
                .map(|(_, hit)| hit.point)
        })
        .and_then(|point| field.corner_at(math::world_to_grid(point)));

    pointed.set_if_neq(PointedCorner(corner));
}

/// Left-drag up/down on the pointed corner raises/lowers it one step each
/// time the cursor travels `drag_threshold` pixels.
pub fn drag_corner(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    pointed: Res<PointedCorner>,
    mut drag: ResMut<DragState>,
    mut field: ResMut<HeightField>,
    cfg: Res<TerrainConfig>,
) {
    let cursor_y = windows
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .map(|c| c.y);

    if buttons.just_released(MouseButton::Left) {
        *drag = DragState::Idle;
        return;
    }
    if buttons.just_pressed(MouseButton::Left) {
        if let (Some(corner), Some(anchor_y)) = (pointed.0, cursor_y) {
            *drag = DragState::Dragging { corner, anchor_y };
        }
        return;
    }

    let DragState::Dragging { corner, anchor_y } = &mut *drag else {
        return;
    };
    let Some(y) = cursor_y else { return };
    // Window y grows downward.
    let step = math::drag_step(*anchor_y - y, cfg.editing.drag_threshold);
    if step != 0 {
        field.move_corner(corner.x, corner.y, corner.corner, step);
        *anchor_y = y;
    }
}

/// Drops any drag and pointer state when leaving edit mode.
pub fn release_pointer(mut drag: ResMut<DragState>, mut pointed: ResMut<PointedCorner>) {
    *drag = DragState::Idle;
    pointed.0 = None;
}

// ── Update: meshes ──────────────────────────────────────────────────

/// Rebuilds the surface mesh when the height field changed since last frame.
pub fn regenerate_mesh(
    mut field: ResMut<HeightField>,
    mut cache: ResMut<MeshCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surface_q: Query<&mut Mesh3d, With<TerrainSurface>>,
    cfg: Res<TerrainConfig>,
) {
    if field.bypass_change_detection().take_dirty() {
        cache.invalidate();
    }
    if !cache.needs_rebuild() {
        return;
    }
    let Ok(mut mesh3d) = surface_q.single_mut() else {
        return;
    };

    cache.mark_clean(mesh_builder::build_terrain(&field));
    let Some(vertices) = cache.vertices() else {
        return;
    };
    mesh3d.0 = meshes.add(mesh_builder::terrain_mesh(vertices, cfg.grid.height_step));
    debug!("Regenerated terrain mesh: {} vertices", vertices.len());
}

/// Rebuilds the highlight stream every frame; uploads only when it differs.
pub fn update_highlight(
    field: Res<HeightField>,
    pointed: Res<PointedCorner>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut overlay_q: Query<(&mut Mesh3d, &mut Visibility), With<HighlightOverlay>>,
    cfg: Res<TerrainConfig>,
    mut shown: Local<Option<[TerrainVertex; HIGHLIGHT_VERTICES]>>,
) {
    let Ok((mut mesh3d, mut visibility)) = overlay_q.single_mut() else {
        return;
    };
    let Some(at) = pointed.0 else {
        visibility.set_if_neq(Visibility::Hidden);
        *shown = None;
        return;
    };

    let vertices = mesh_builder::build_highlight(&field, at);
    visibility.set_if_neq(Visibility::Inherited);
    if shown.as_ref() != Some(&vertices) {
        mesh3d.0 = meshes.add(mesh_builder::highlight_mesh(&vertices, cfg.grid.height_step));
        *shown = Some(vertices);
    }
}

// ── Persistence & debug output ──────────────────────────────────────

fn save_field(field: &HeightField, path: &Path) {
    match persist::save(field, path) {
        Ok(()) => info!("Saved terrain to {}", path.display()),
        Err(err) => error!("Could not save terrain to {}: {err}", path.display()),
    }
}

/// Ctrl+S writes the height field to the configured path.
pub fn save_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    field: Res<HeightField>,
    cfg: Res<TerrainConfig>,
) {
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    if ctrl && keys.just_pressed(KeyCode::KeyS) {
        save_field(&field, &cfg.save_path);
    }
}

/// Writes the height field once the app is about to exit.
pub fn save_on_exit(
    mut exits: MessageReader<AppExit>,
    field: Option<Res<HeightField>>,
    cfg: Res<TerrainConfig>,
) {
    if exits.read().count() == 0 {
        return;
    }
    if let Some(field) = field {
        save_field(&field, &cfg.save_path);
    }
}

/// P logs the boxed text view of the height field.
pub fn log_height_field(keys: Res<ButtonInput<KeyCode>>, field: Res<HeightField>) {
    if keys.just_pressed(KeyCode::KeyP) {
        info!("Height field:\n{}", *field);
    }
}

/// Shape and base level of a tile, or `None` for a tile the classifier rejects.
fn tile_label(tile: &Tile) -> Option<String> {
    tile.is_legal().then(|| {
        let class = classify(tile);
        format!("{} {}", class.shape.label(), class.base)
    })
}

/// Draws each tile's shape and base level as a screen-projected egui label.
pub fn draw_tile_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    field: Res<HeightField>,
    pointed: Res<PointedCorner>,
    cfg: Res<TerrainConfig>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for (x, y) in field.coords() {
        let tile = field.tile(x, y);
        let Some(label) = tile_label(&tile) else {
            continue;
        };
        let mean = tile.corners.iter().map(|&h| f32::from(h)).sum::<f32>() / 4.0;
        let center = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, mean);
        let world = math::grid_to_world(center, cfg.grid.height_step);

        let Ok(viewport) = camera.world_to_viewport(cam_gt, world) else {
            continue;
        };
        let is_pointed = matches!(pointed.0, Some(CornerRef { x: px, y: py, .. }) if (px, py) == (x, y));
        let color = if is_pointed {
            egui::Color32::YELLOW
        } else {
            egui::Color32::WHITE
        };
        painter.text(
            egui::pos2(viewport.x, viewport.y),
            egui::Align2::CENTER_CENTER,
            label,
            egui::FontId::proportional(11.0),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── tile_label ──────────────────────────────────────────────────

    #[test]
    fn label_names_shape_and_base() {
        let label = tile_label(&Tile {
            corners: [1, 1, 1, 0],
        });
        assert_eq!(label.as_deref(), Some("one-down 1"));
    }

    #[test]
    fn illegal_tile_has_no_label() {
        assert_eq!(tile_label(&Tile { corners: [0, 3, 0, 0] }), None);
        assert_eq!(tile_label(&Tile { corners: [0, 2, 1, 1] }), None);
    }

    // ── regenerate_mesh ─────────────────────────────────────────────

    #[derive(Resource, Default)]
    struct FieldChanges(Vec<bool>);

    fn record_field_changes(field: Res<HeightField>, mut changes: ResMut<FieldChanges>) {
        changes.0.push(field.is_changed());
    }

    fn mesh_app(width: usize, depth: usize) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .insert_resource(TerrainConfig::default())
            .insert_resource(HeightField::new(width, depth))
            .insert_resource(MeshCache::Dirty)
            .init_resource::<FieldChanges>()
            .add_systems(
                Update,
                (regenerate_mesh, record_field_changes).chain(),
            );
        let surface = app.world_mut().spawn((TerrainSurface, Mesh3d::default())).id();
        (app, surface)
    }

    fn surface_mesh(app: &App, surface: Entity) -> Handle<Mesh> {
        app.world().get::<Mesh3d>(surface).unwrap().0.clone()
    }

    #[test]
    fn first_frame_builds_full_mesh() {
        let (mut app, surface) = mesh_app(3, 2);
        app.update();
        let handle = surface_mesh(&app, surface);
        assert_ne!(handle, Handle::default());
        let meshes = app.world().resource::<Assets<Mesh>>();
        assert_eq!(meshes.get(&handle).unwrap().count_vertices(), 18 * 3 * 2);
        assert!(!app.world().resource::<MeshCache>().needs_rebuild());
    }

    #[test]
    fn clean_frame_and_zero_edit_keep_mesh() {
        let (mut app, surface) = mesh_app(3, 2);
        app.update();
        let built = surface_mesh(&app, surface);

        app.update();
        assert_eq!(surface_mesh(&app, surface), built);

        app.world_mut()
            .resource_mut::<HeightField>()
            .move_corner(1, 1, 2, 0);
        app.update();
        assert_eq!(surface_mesh(&app, surface), built);
    }

    #[test]
    fn edit_replaces_mesh() {
        let (mut app, surface) = mesh_app(3, 2);
        app.update();
        let built = surface_mesh(&app, surface);

        app.world_mut()
            .resource_mut::<HeightField>()
            .move_corner(2, 0, 1, 1);
        app.update();
        let rebuilt = surface_mesh(&app, surface);
        assert_ne!(rebuilt, built);
        let meshes = app.world().resource::<Assets<Mesh>>();
        assert_eq!(meshes.get(&rebuilt).unwrap().count_vertices(), 18 * 3 * 2);
    }

    #[test]
    fn polling_dirty_flag_does_not_mark_field_changed() {
        let (mut app, _) = mesh_app(2, 2);
        app.update();
        app.update();
        app.update();
        let changes = &app.world().resource::<FieldChanges>().0;
        assert_eq!(changes, &[true, false, false]);
    }
}
