//! The warrior: spawning, mouse input, and its per-tick step.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope};

use crate::actor::{Action, ActorState, LastTick, WARRIOR_PROFILE};
use crate::ai::click_path::ClickPath;
use crate::ai::{Pursuit, Stride};
use crate::app_state::AppState;
use crate::components::*;
use crate::events::WarriorFell;
use crate::plugins::arena::{ArenaGrid, load_arena, screen_to_world};
use crate::plugins::movement::apply_stride;
use crate::plugins::sprites::{SpriteSheetLibrary, load_character_sheets};
use crate::plugins::telemetry::GameSet;
use crate::resources::{ArenaConfig, Cursor};

const WARRIOR_COLOR: Color = Color::srgb(0.3, 0.5, 0.9);
const MARKER_COLOR: Color = Color::srgb(0.9, 0.9, 0.3);

pub struct WarriorPlugin;

impl Plugin for WarriorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::InGame),
            spawn_warrior.after(load_arena).after(load_character_sheets),
        );
        app.add_systems(
            Update,
            (
                warrior_input.in_set(GameSet::Input),
                warrior_step.in_set(GameSet::Warrior),
                warrior_fallen.in_set(GameSet::Cleanup),
            )
                .run_if(in_state(AppState::InGame)),
        );
        // Headless apps have no gizmo pipeline.
        if app.is_plugin_added::<bevy::gizmos::GizmoPlugin>() {
            app.add_systems(
                Update,
                draw_walk_marker
                    .in_set(GameSet::Presentation)
                    .run_if(in_state(AppState::InGame)),
            );
        }
    }
}

/// Spawn the warrior at the arena center, idle and at full health.
#[span_fn]
pub fn spawn_warrior(
    mut commands: Commands,
    config: Res<ArenaConfig>,
    library: Res<SpriteSheetLibrary>,
) {
    let start = config.center();
    let world = screen_to_world(start, config.screen_size());
    commands.spawn((
        Warrior,
        Role::Warrior,
        ActorState::for_role(Role::Warrior),
        LastTick::default(),
        Health(WARRIOR_PROFILE.max_health),
        MoveSpeed(WARRIOR_PROFILE.speed),
        MoveTarget(start),
        ScreenPosition(start),
        ArenaEntity,
        library.sprite_for(Role::Warrior, WARRIOR_COLOR),
        Transform::from_xyz(world.x, world.y, 10.0),
    ));
}

/// Holding the left button sets the walk target; a right click queues an
/// attack.
#[span_fn]
fn warrior_input(
    mouse: Res<ButtonInput<MouseButton>>,
    cursor: Res<Cursor>,
    mut query: Query<(&mut MoveTarget, &mut ActorState), With<Warrior>>,
) {
    let Some(point) = cursor.0 else {
        return;
    };
    let Ok((mut target, mut state)) = query.single_mut() else {
        return;
    };
    if mouse.pressed(MouseButton::Left) && target.0 != point {
        target.0 = point;
    }
    if mouse.just_pressed(MouseButton::Right) && state.request_attack() {
        info!("warrior attack queued at ({:.0}, {:.0})", point.x, point.y);
    }
}

/// Walk one stride toward the target when free, then advance the state
/// machine.
#[allow(clippy::type_complexity)]
#[span_fn]
fn warrior_step(
    grid: Option<Res<ArenaGrid>>,
    library: Res<SpriteSheetLibrary>,
    mut query: Query<
        (
            &mut ScreenPosition,
            &MoveTarget,
            &MoveSpeed,
            &mut ActorState,
            &mut LastTick,
        ),
        With<Warrior>,
    >,
) {
    let Some(grid) = grid else { return };
    let Ok((mut pos, target, speed, mut state, mut last)) = query.single_mut() else {
        return;
    };

    let stride = if state.can_move() {
        ClickPath { target: target.0 }.stride(pos.0, speed.0, &grid)
    } else {
        Stride::Hold
    };
    let moved = apply_stride(&mut pos, stride);
    last.0 = state.update(
        moved,
        &WARRIOR_PROFILE,
        library.animations(Role::Warrior),
    );
}

/// The death animation has finished: end the round.
#[span_fn]
fn warrior_fallen(
    mut commands: Commands,
    query: Query<&LastTick, With<Warrior>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Ok(last) = query.single() else {
        return;
    };
    if last.0.removed {
        info!("warrior death animation finished");
        commands.trigger(WarriorFell);
        next_state.set(AppState::GameOver);
    }
}

/// Line and end circle for the current walk, in pixel space. Only drawn
/// while the warrior is actually walking.
pub fn walk_marker(pos: Vec2, target: Vec2, action: Action) -> Option<(Vec2, Vec2)> {
    (action == Action::Walking && pos != target).then_some((pos, target))
}

fn draw_walk_marker(
    mut gizmos: Gizmos,
    config: Res<ArenaConfig>,
    query: Query<(&ScreenPosition, &MoveTarget, &ActorState), With<Warrior>>,
) {
    let screen = config.screen_size();
    for (pos, target, state) in &query {
        let Some((from, to)) = walk_marker(pos.0, target.0, state.action()) else {
            continue;
        };
        let to = screen_to_world(to, screen);
        gizmos.line_2d(screen_to_world(from, screen), to, MARKER_COLOR);
        gizmos.circle_2d(to, 6.0, MARKER_COLOR);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::arena::ArenaPlugin;
    use crate::plugins::movement::MovementPlugin;
    use crate::plugins::sprites::SpriteSheetPlugin;
    use bevy::state::app::StatesPlugin;

    fn warrior_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.init_state::<AppState>();
        GameSet::configure(&mut app);
        app.insert_resource(ArenaConfig::open(800, 600, 20));
        app.init_resource::<ButtonInput<MouseButton>>();
        app.init_resource::<Cursor>();
        app.add_plugins((SpriteSheetPlugin, ArenaPlugin, MovementPlugin, WarriorPlugin));
        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::InGame);
        for _ in 0..3 {
            app.update();
        }
        app
    }

    fn warrior_state(app: &mut App) -> (Vec2, Action, Health) {
        let mut query = app
            .world_mut()
            .query_filtered::<(&ScreenPosition, &ActorState, &Health), With<Warrior>>();
        let (pos, state, health) = query.single(app.world()).unwrap();
        (pos.0, state.action(), *health)
    }

    #[test]
    fn spawns_idle_at_center_with_full_health() {
        let mut app = warrior_app();
        let (pos, action, health) = warrior_state(&mut app);
        assert_eq!(pos, Vec2::new(400.0, 300.0));
        assert_eq!(action, Action::Idle);
        assert_eq!(health, Health(3));
    }

    #[test]
    fn held_left_button_walks_to_cursor() {
        let mut app = warrior_app();
        app.world_mut().resource_mut::<Cursor>().0 = Some(Vec2::new(400.0, 200.0));
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);

        app.update();
        let (pos, action, _) = warrior_state(&mut app);
        assert!(pos.distance(Vec2::new(400.0, 200.0)) < 100.0);
        assert_eq!(action, Action::Walking);

        for _ in 0..150 {
            app.update();
        }
        let (pos, action, _) = warrior_state(&mut app);
        assert_eq!(pos, Vec2::new(400.0, 200.0));
        assert_eq!(action, Action::Idle);
    }

    #[test]
    fn right_click_attacks_in_place() {
        let mut app = warrior_app();
        app.world_mut().resource_mut::<Cursor>().0 = Some(Vec2::new(500.0, 300.0));
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Right);

        app.update();
        let (pos, action, _) = warrior_state(&mut app);
        assert_eq!(action, Action::Attacking);
        assert_eq!(pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn finished_death_ends_the_round() {
        let mut app = warrior_app();
        let mut query = app
            .world_mut()
            .query_filtered::<&mut ActorState, With<Warrior>>();
        query.single_mut(app.world_mut()).unwrap().kill();

        let mut reached = false;
        for _ in 0..80 {
            app.update();
            if *app.world().resource::<State<AppState>>().get() == AppState::GameOver {
                reached = true;
                break;
            }
        }
        assert!(reached, "round never ended");

        app.update();
        let mut warriors = app.world_mut().query_filtered::<(), With<Warrior>>();
        assert_eq!(warriors.iter(app.world()).count(), 0);
    }

    #[test]
    fn marker_only_while_walking() {
        let pos = Vec2::new(10.0, 10.0);
        let target = Vec2::new(50.0, 10.0);
        assert_eq!(walk_marker(pos, target, Action::Walking), Some((pos, target)));
        assert_eq!(walk_marker(pos, target, Action::Idle), None);
        assert_eq!(walk_marker(target, target, Action::Walking), None);
    }
}
