//! Pixel-space movement shared by every actor.
//!
//! Actors move in arena pixel space (`ScreenPosition`) according to the
//! stride their pursuit strategy chose. Rendering reads `Transform`, which is
//! kept in sync here.

use bevy::prelude::*;
use micromegas_tracing::prelude::{span_fn, span_scope};

use crate::ai::Stride;
use crate::app_state::AppState;
use crate::components::ScreenPosition;
use crate::plugins::arena::screen_to_world;
use crate::plugins::telemetry::GameSet;
use crate::resources::ArenaConfig;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            sync_transform_to_screen
                .in_set(GameSet::Presentation)
                .run_if(in_state(AppState::InGame)),
        );
    }
}

/// Apply a stride to a position and report whether it moved. A step onto
/// the current position is not movement; engaging holds still.
pub fn apply_stride(pos: &mut ScreenPosition, stride: Stride) -> bool {
    match stride {
        Stride::Step(next) if next != pos.0 => {
            pos.0 = next;
            true
        }
        Stride::Step(_) | Stride::Engage | Stride::Hold => false,
    }
}

/// Mirror pixel-space positions onto world transforms, keeping depth.
#[span_fn]
fn sync_transform_to_screen(
    config: Res<ArenaConfig>,
    mut query: Query<(&ScreenPosition, &mut Transform), Changed<ScreenPosition>>,
) {
    let screen = config.screen_size();
    for (pos, mut transform) in &mut query {
        let world = screen_to_world(pos.0, screen);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
