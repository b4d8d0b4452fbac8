pub mod actor;
pub mod ai;
pub mod app_state;
pub mod components;
pub mod events;
pub mod plugins;
pub mod resources;
pub mod tracing_bridge;

use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope};

use app_state::AppState;
use plugins::arena::ArenaPlugin;
use plugins::camera::CameraPlugin;
use plugins::combat::CombatPlugin;
use plugins::enemies::EnemyPlugin;
use plugins::game_over::GameOverPlugin;
use plugins::hud::HudPlugin;
use plugins::menu::MenuPlugin;
use plugins::movement::MovementPlugin;
use plugins::sprites::SpriteSheetPlugin;
use plugins::telemetry::{GameSet, TelemetryPlugin};
use plugins::warrior::WarriorPlugin;
use resources::{Cursor, GameStats, Score, SpawnRng, UiAssets};

pub struct WarriorArenaPlugin;

impl Plugin for WarriorArenaPlugin {
    fn build(&self, app: &mut App) {
        // State machine (StatesPlugin comes from DefaultPlugins)
        app.init_state::<AppState>();

        app.add_plugins(GameplayPlugin);
        app.add_plugins(CameraPlugin);
        app.add_plugins(HudPlugin);
        app.add_plugins(MenuPlugin);
        app.add_plugins(GameOverPlugin);
        app.add_plugins(TelemetryPlugin);

        // Asset loading
        app.add_loading_state(
            LoadingState::new(AppState::Loading)
                .continue_to_state(AppState::MainMenu)
                .load_collection::<UiAssets>(),
        );
    }
}

/// The simulation without any windowing, UI or asset loading: the arena,
/// both actor roles, combat and per-round session state. Expects `AppState`
/// and mouse input to be registered already.
pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        GameSet::configure(app);
        app.init_resource::<Cursor>();

        app.add_plugins(SpriteSheetPlugin);
        app.add_plugins(ArenaPlugin);
        app.add_plugins(MovementPlugin);
        app.add_plugins(WarriorPlugin);
        app.add_plugins(EnemyPlugin);
        app.add_plugins(CombatPlugin);

        // Per-round resources: inserted fresh on each game start, kept
        // through GameOver for the stats screen, removed when it closes.
        app.add_systems(OnEnter(AppState::InGame), init_game_session);
        app.add_systems(OnExit(AppState::GameOver), cleanup_game_session);
    }
}

/// Runs on each `OnEnter(AppState::InGame)`, so a new round always starts
/// clean. A `SpawnRng` already present (seeded by a test) is kept.
#[span_fn]
fn init_game_session(mut commands: Commands, rng: Option<Res<SpawnRng>>) {
    commands.insert_resource(Score(0));
    commands.insert_resource(GameStats::default());
    if rng.is_none() {
        commands.insert_resource(SpawnRng::from_entropy());
    }
    info!("round started");
}

#[span_fn]
fn cleanup_game_session(mut commands: Commands) {
    commands.remove_resource::<Score>();
    commands.remove_resource::<GameStats>();
}
