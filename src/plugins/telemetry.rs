//! Frame-level telemetry and the per-tick system ordering.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, info, span_scope};

use crate::components::Enemy;
use crate::events::{EnemyKilled, WarriorFell, WarriorHurt};

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, frame_telemetry);
        app.add_observer(record_kill);
        app.add_observer(record_hurt);
        app.add_observer(record_fall);
    }
}

/// Phases of one tick, run in this order: read input, move and animate the
/// warrior, then the enemies, resolve combat and spawns, drop finished
/// actors, and finally update what is drawn.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Warrior,
    Enemies,
    Combat,
    Cleanup,
    Presentation,
}

impl GameSet {
    pub fn configure(app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSet::Input,
                GameSet::Warrior,
                GameSet::Enemies,
                GameSet::Combat,
                GameSet::Cleanup,
                GameSet::Presentation,
            )
                .chain(),
        );
    }
}

fn frame_telemetry(time: Res<Time>, enemies: Query<(), With<Enemy>>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
    imetric!("live_enemies", "count", enemies.iter().count() as u64);
}

fn record_kill(_event: On<EnemyKilled>) {
    imetric!("enemy_killed", "count", 1);
}

fn record_hurt(event: On<WarriorHurt>) {
    info!("warrior hurt: health={}", event.event().health);
    imetric!("warrior_health", "count", event.event().health as u64);
}

fn record_fall(_event: On<WarriorFell>) {
    info!("warrior fell");
}
