//! Enemy spawning, pursuit of the warrior, and removal after death.

use bevy::prelude::*;
use micromegas_tracing::prelude::{imetric, span_fn, span_scope};
use rand::Rng;

use crate::actor::{ActorState, ENEMY_PROFILE, LastTick};
use crate::ai::chase::DirectChase;
use crate::ai::{Pursuit, Stride};
use crate::app_state::AppState;
use crate::components::*;
use crate::plugins::arena::{ArenaGrid, screen_to_world};
use crate::plugins::movement::apply_stride;
use crate::plugins::sprites::SpriteSheetLibrary;
use crate::plugins::telemetry::GameSet;
use crate::resources::{ArenaConfig, GameStats, SpawnConfig, SpawnRng};

const ENEMY_COLOR: Color = Color::srgb(0.8, 0.2, 0.2);

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnConfig>();
        app.add_systems(
            Update,
            (
                enemy_step.in_set(GameSet::Enemies),
                spawn_enemies.in_set(GameSet::Combat),
                despawn_removed_enemies.in_set(GameSet::Cleanup),
            )
                .run_if(in_state(AppState::InGame)),
        );
    }
}

/// Roll once for a new enemy. On success returns a uniformly random point
/// in the arena, edges included. Blocked cells are not avoided.
pub fn roll_spawn(rng: &mut impl Rng, spawn_rate: f64, config: &ArenaConfig) -> Option<Vec2> {
    if !rng.gen_bool(spawn_rate.clamp(0.0, 1.0)) {
        return None;
    }
    Some(Vec2::new(
        rng.gen_range(0..=config.screen_width) as f32,
        rng.gen_range(0..=config.screen_height) as f32,
    ))
}

#[span_fn]
fn spawn_enemies(
    mut commands: Commands,
    config: Res<ArenaConfig>,
    spawn: Res<SpawnConfig>,
    mut rng: ResMut<SpawnRng>,
    library: Res<SpriteSheetLibrary>,
    mut stats: ResMut<GameStats>,
) {
    let Some(pos) = roll_spawn(&mut rng.0, spawn.spawn_rate, &config) else {
        return;
    };
    let world = screen_to_world(pos, config.screen_size());
    commands.spawn((
        Enemy,
        Role::Enemy,
        ActorState::for_role(Role::Enemy),
        LastTick::default(),
        MoveSpeed(spawn.enemy_speed),
        ScreenPosition(pos),
        ArenaEntity,
        library.sprite_for(Role::Enemy, ENEMY_COLOR),
        Transform::from_xyz(world.x, world.y, 5.0),
    ));
    stats.enemies_spawned += 1;
    imetric!("enemies_spawned", "count", u64::from(stats.enemies_spawned));
}

/// Every enemy closes in on the warrior in a straight line and stops once in
/// reach. Enemies busy with an exclusive action stay put.
#[allow(clippy::type_complexity)]
#[span_fn]
fn enemy_step(
    grid: Option<Res<ArenaGrid>>,
    library: Res<SpriteSheetLibrary>,
    warrior: Query<&ScreenPosition, (With<Warrior>, Without<Enemy>)>,
    mut enemies: Query<
        (
            &mut ScreenPosition,
            &MoveSpeed,
            &mut ActorState,
            &mut LastTick,
        ),
        With<Enemy>,
    >,
) {
    let Some(grid) = grid else { return };
    let Ok(quarry) = warrior.single() else {
        return;
    };
    let chase = DirectChase {
        quarry: quarry.0,
        reach: ENEMY_PROFILE.reach,
    };
    let animations = library.animations(Role::Enemy);

    for (mut pos, speed, mut state, mut last) in &mut enemies {
        let stride = if state.can_move() {
            chase.stride(pos.0, speed.0, &grid)
        } else {
            Stride::Hold
        };
        let moved = apply_stride(&mut pos, stride);
        last.0 = state.update(moved, &ENEMY_PROFILE, animations);
    }
}

fn despawn_removed_enemies(mut commands: Commands, query: Query<(Entity, &ActorState), With<Enemy>>) {
    for (entity, state) in &query {
        if state.is_removed() {
            commands.entity(entity).despawn();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
