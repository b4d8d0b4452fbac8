use bevy::prelude::*;
use micromegas_tracing::prelude::{span_fn, span_scope};

use super::arena::world_to_screen;
use super::telemetry::GameSet;
use crate::resources::{ArenaConfig, Cursor};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Cursor>();
        app.add_systems(Startup, spawn_camera);
        app.add_systems(PreUpdate, track_cursor);
        app.add_systems(Update, fit_camera_to_arena.in_set(GameSet::Presentation));
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Scale the camera so the whole arena stays visible when the window size
/// differs from the arena size.
#[span_fn]
fn fit_camera_to_arena(
    config: Res<ArenaConfig>,
    windows: Query<&Window>,
    mut cameras: Query<&mut Projection, With<Camera2d>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok(mut projection) = cameras.single_mut() else {
        return;
    };

    let arena = config.screen_size();
    let scale = (arena.x / window.width()).max(arena.y / window.height());

    if let Projection::Orthographic(ref mut ortho) = *projection
        && ortho.scale != scale
    {
        ortho.scale = scale;
    }
}

/// Project the OS cursor into arena pixel space.
fn track_cursor(
    config: Res<ArenaConfig>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut cursor: ResMut<Cursor>,
) {
    let point = windows
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .and_then(|viewport| {
            let (camera, transform) = cameras.single().ok()?;
            camera.viewport_to_world_2d(transform, viewport).ok()
        })
        .map(|world| world_to_screen(world, config.screen_size()));
    if cursor.0 != point {
        cursor.0 = point;
    }
}
