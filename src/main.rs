#![warn(missing_docs)]
//! Tile terrain editor.
//!
//! A square grid of tiles whose four corners each carry their own integer
//! height. Point at a corner and drag vertically to raise or lower it; the
//! rest of the tile follows so no slope gets steeper than one step per edge.

mod camera;
pub mod math;
mod terrain;

use bevy::app::AppExit;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

/// Application-wide editor state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Mouse picks and drags terrain corners.
    #[default]
    Editing,
    /// Inspector and tile labels shown (Tab to toggle).
    Debugging,
}

/// Command-line overrides for the terrain configuration.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(name = "tile-terrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tile columns of a newly created field.
    #[arg(long, default_value = "16")]
    width: usize,

    /// Tile rows of a newly created field.
    #[arg(long, default_value = "16")]
    depth: usize,

    /// File to load the field from and save it to.
    #[arg(long, default_value = "terrain.hfld")]
    save: std::path::PathBuf,

    /// Start from a new field even if the save file exists.
    #[arg(long)]
    fresh: bool,

    /// Seed for a noise-sculpted starting landscape.
    #[arg(long)]
    noise_seed: Option<u32>,

    /// Height range, in steps, of the noise-sculpted landscape.
    #[arg(long)]
    noise_amplitude: Option<i8>,
}

#[cfg(feature = "native")]
impl Cli {
    fn into_config(self) -> terrain::TerrainConfig {
        let defaults = terrain::TerrainConfig::default();
        let sculpt = (self.noise_seed.is_some() || self.noise_amplitude.is_some()).then(|| {
            let s = terrain::SculptSettings::default();
            terrain::SculptSettings {
                seed: self.noise_seed.unwrap_or(s.seed),
                amplitude: self.noise_amplitude.map_or(s.amplitude, i8::saturating_abs),
                ..s
            }
        });
        terrain::TerrainConfig {
            grid: terrain::GridSettings {
                width: self.width.max(1),
                depth: self.depth.max(1),
                ..defaults.grid
            },
            sculpt,
            save_path: self.save,
            fresh: self.fresh,
            ..defaults
        }
    }
}

fn terrain_config() -> terrain::TerrainConfig {
    #[cfg(feature = "native")]
    {
        use clap::Parser;
        Cli::parse().into_config()
    }
    #[cfg(not(feature = "native"))]
    {
        terrain::TerrainConfig::default()
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Tile Terrain".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>();

    #[cfg(feature = "native")]
    {
        use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
        app.add_plugins(RemotePlugin::default())
            .add_plugins(RemoteHttpPlugin::default());
    }

    app.add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(bevy_egui::EguiPlugin::default())
        .add_plugins(terrain::TerrainPlugin(terrain_config()))
        .add_plugins(camera::CameraPlugin(camera::CameraConfig::default()))
        .add_systems(Update, exit_on_esc)
        .add_systems(Update, toggle_inspector)
        .add_systems(Update, log_fps)
        .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Editing => GameState::Debugging,
            GameState::Debugging => GameState::Editing,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// I logs the smoothed frame rate.
fn log_fps(keys: Res<ButtonInput<KeyCode>>, diagnostics: Res<DiagnosticsStore>) {
    if keys.just_pressed(KeyCode::KeyI) {
        let fps = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|d| d.smoothed());
        info!("{}", fps_line(fps));
    }
}

fn fps_line(fps: Option<f64>) -> String {
    match fps {
        Some(fps) => format!("FPS: {fps:.1}"),
        None => "FPS: not measured yet".to_string(),
    }
}
