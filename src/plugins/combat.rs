//! Strikes in both directions: the warrior's area swing and enemy contact
//! hits.

use std::ops::DerefMut;

use bevy::prelude::*;
use micromegas_tracing::prelude::{imetric, info, span_fn, span_scope};

use crate::actor::{Action, ActorState, ENEMY_PROFILE, LastTick, WARRIOR_PROFILE};
use crate::ai::chase::DirectChase;
use crate::app_state::AppState;
use crate::components::{Enemy, Health, ScreenPosition, Warrior};
use crate::events::{EnemyKilled, WarriorHurt};
use crate::plugins::telemetry::GameSet;
use crate::resources::{Cursor, GameStats, Score};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (warrior_strikes, enemy_strikes)
                .chain()
                .in_set(GameSet::Combat)
                .run_if(in_state(AppState::InGame)),
        );
    }
}

// ---------------------------------------------------------------------------
// Facing
// ---------------------------------------------------------------------------

/// Eight overlapping wedges around the warrior, in pixel space (y down, so
/// positive angles point down the screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Right,
    Down,
    Left,
    Up,
    DownRight,
    DownLeft,
    UpLeft,
    UpRight,
}

/// `(heading, from, to)` in degrees; `from > to` wraps through 0. The ranges
/// are laid out so that every angle in `[0, 360)` falls in some wedge.
const WEDGES: [(Heading, f32, f32); 8] = [
    (Heading::Right, 315.0, 45.0),
    (Heading::Down, 45.0, 135.0),
    (Heading::Left, 135.0, 225.0),
    (Heading::Up, 225.0, 315.0),
    (Heading::DownRight, 0.0, 90.0),
    (Heading::DownLeft, 90.0, 180.0),
    (Heading::UpLeft, 180.0, 270.0),
    (Heading::UpRight, 270.0, 360.0),
];

/// Angle from `from` to `to` in degrees, normalized to `[0, 360)`.
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    let degrees = delta.y.atan2(delta.x).to_degrees();
    if degrees < 0.0 { degrees + 360.0 } else { degrees }
}

/// First wedge containing the angle.
pub fn heading_of(angle: f32) -> Option<Heading> {
    WEDGES
        .iter()
        .find(|(_, from, to)| {
            if from <= to {
                angle >= *from && angle < *to
            } else {
                angle >= *from || angle < *to
            }
        })
        .map(|(heading, _, _)| *heading)
}

/// Whether the warrior is facing toward the cursor. The wedges cover the
/// full circle, so a swing always connects in some direction.
pub fn is_facing(warrior: Vec2, cursor: Vec2) -> bool {
    heading_of(angle_to(warrior, cursor)).is_some()
}

// ---------------------------------------------------------------------------
// Strike resolution
// ---------------------------------------------------------------------------

/// Resolve one warrior swing. Every living enemy within `range` of the
/// warrior is sent into its death animation. Returns the number killed.
pub fn resolve_warrior_strike<S>(
    warrior: Vec2,
    cursor: Vec2,
    range: f32,
    enemies: impl IntoIterator<Item = (Vec2, S)>,
) -> u32
where
    S: DerefMut<Target = ActorState>,
{
    if !is_facing(warrior, cursor) {
        return 0;
    }
    let mut killed = 0;
    for (pos, mut state) in enemies {
        if state.is_dying() || state.is_removed() || warrior.distance(pos) > range {
            continue;
        }
        state.kill();
        killed += 1;
    }
    killed
}

/// One enemy in contact tries to strike the warrior. While its cooldown is
/// still running, the contact tick only winds it down. Once spent, the
/// strike needs both sides alive and resets the cooldown whether or not the
/// hurt lands. Returns true when the warrior lost health.
pub fn enemy_strike(enemy: &mut ActorState, warrior: &mut ActorState, health: &mut Health) -> bool {
    if enemy.is_dying() || enemy.is_removed() {
        return false;
    }
    if enemy.cooldown() > 0 {
        enemy.wind_down();
        return false;
    }
    if warrior.is_dying() || warrior.action() == Action::Hurting {
        return false;
    }
    let landed = warrior.try_hurt(health, &WARRIOR_PROFILE);
    enemy.request_attack();
    enemy.set_cooldown(ENEMY_PROFILE.strike_cooldown);
    landed
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// A warrior that entered `Attacking` this tick swings once.
#[span_fn]
fn warrior_strikes(
    mut commands: Commands,
    cursor: Res<Cursor>,
    warrior: Query<(&ScreenPosition, &LastTick), With<Warrior>>,
    mut enemies: Query<(&ScreenPosition, &mut ActorState), (With<Enemy>, Without<Warrior>)>,
    mut score: ResMut<Score>,
    mut stats: ResMut<GameStats>,
) {
    let Ok((pos, last)) = warrior.single() else {
        return;
    };
    if last.0.entered != Some(Action::Attacking) {
        return;
    }

    let aim = cursor.0.unwrap_or(pos.0);
    let killed = resolve_warrior_strike(
        pos.0,
        aim,
        WARRIOR_PROFILE.reach,
        enemies.iter_mut().map(|(p, state)| (p.0, state)),
    );
    if killed == 0 {
        return;
    }
    score.0 += u64::from(killed);
    stats.enemies_slain += killed;
    imetric!("enemies_per_swing", "count", u64::from(killed));
    info!("warrior swing killed {} (score {})", killed, score.0);
    for _ in 0..killed {
        commands.trigger(EnemyKilled);
    }
}

/// Enemies in contact with the warrior hit when their cooldown allows.
#[span_fn]
fn enemy_strikes(
    mut commands: Commands,
    mut warrior: Query<(&ScreenPosition, &mut ActorState, &mut Health), With<Warrior>>,
    mut enemies: Query<(&ScreenPosition, &mut ActorState), (With<Enemy>, Without<Warrior>)>,
    mut stats: ResMut<GameStats>,
) {
    let Ok((warrior_pos, mut warrior_state, mut health)) = warrior.single_mut() else {
        return;
    };
    let contact = DirectChase {
        quarry: warrior_pos.0,
        reach: ENEMY_PROFILE.reach,
    };
    for (pos, mut state) in &mut enemies {
        if !contact.in_reach(pos.0) {
            continue;
        }
        if enemy_strike(&mut state, &mut warrior_state, &mut health) {
            stats.hurts_taken += 1;
            commands.trigger(WarriorHurt { health: health.0 });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{AnimationSet, Tick};
    use crate::components::Role;
    use bevy::state::app::StatesPlugin;

    fn idle_enemy() -> ActorState {
        let mut state = ActorState::for_role(Role::Enemy);
        state.set_cooldown(0);
        state
    }

    #[test]
    fn wedges_cover_the_circle() {
        for step in 0..720 {
            let angle = step as f32 * 0.5;
            assert!(heading_of(angle).is_some(), "angle {}", angle);
        }
        assert_eq!(heading_of(10.0), Some(Heading::Right));
        assert_eq!(heading_of(350.0), Some(Heading::Right));
        assert_eq!(heading_of(90.0), Some(Heading::Down));
        assert_eq!(heading_of(270.0), Some(Heading::Up));
    }

    #[test]
    fn angle_is_measured_in_pixel_space() {
        let origin = Vec2::new(100.0, 100.0);
        assert_eq!(angle_to(origin, Vec2::new(200.0, 100.0)), 0.0);
        assert!((angle_to(origin, Vec2::new(100.0, 200.0)) - 90.0).abs() < 1e-4);
        assert!((angle_to(origin, Vec2::new(100.0, 0.0)) - 270.0).abs() < 1e-4);
        assert!(is_facing(origin, origin));
    }

    #[test]
    fn swing_kills_everything_in_range() {
        let mut enemies = vec![
            (Vec2::new(150.0, 100.0), idle_enemy()),
            (Vec2::new(100.0, 200.0), idle_enemy()),
            (Vec2::new(250.0, 100.0), idle_enemy()),
        ];
        let killed = resolve_warrior_strike(
            Vec2::new(100.0, 100.0),
            Vec2::new(400.0, 100.0),
            100.0,
            enemies.iter_mut().map(|(pos, state)| (*pos, state)),
        );

        assert_eq!(killed, 2);
        assert!(enemies[0].1.is_dying());
        assert!(enemies[1].1.is_dying());
        assert!(!enemies[2].1.is_dying());
    }

    #[test]
    fn dying_enemies_are_not_counted_twice() {
        let mut state = idle_enemy();
        state.kill();
        let killed = resolve_warrior_strike(Vec2::ZERO, Vec2::X, 100.0, [(Vec2::ZERO, &mut state)]);
        assert_eq!(killed, 0);
    }

    #[test]
    fn enemy_strike_costs_health_and_resets_cooldown() {
        let mut enemy = idle_enemy();
        let mut warrior = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);

        assert!(enemy_strike(&mut enemy, &mut warrior, &mut health));
        assert_eq!(health, Health(2));
        assert_eq!(enemy.cooldown(), ENEMY_PROFILE.strike_cooldown);
        assert_eq!(warrior.cooldown(), WARRIOR_PROFILE.hurt_cooldown);

        // Cooldown not yet spent: the contact tick only winds it down.
        assert!(!enemy_strike(&mut enemy, &mut warrior, &mut health));
        assert_eq!(health, Health(2));
        assert_eq!(enemy.cooldown(), ENEMY_PROFILE.strike_cooldown - 1);
    }

    #[test]
    fn strike_cooldown_holds_away_from_the_warrior() {
        let mut enemy = ActorState::for_role(Role::Enemy);
        for _ in 0..100 {
            enemy.update(true, &ENEMY_PROFILE, &AnimationSet::SINGLE_FRAME);
        }
        assert_eq!(enemy.cooldown(), ENEMY_PROFILE.initial_cooldown);

        let mut warrior = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        for _ in 0..ENEMY_PROFILE.initial_cooldown {
            assert!(!enemy_strike(&mut enemy, &mut warrior, &mut health));
        }
        assert!(enemy_strike(&mut enemy, &mut warrior, &mut health));
        assert_eq!(health, Health(2));
    }

    #[test]
    fn enemy_strike_refused_while_warrior_recovers() {
        let mut first = idle_enemy();
        let mut second = idle_enemy();
        let mut warrior = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);

        assert!(enemy_strike(&mut first, &mut warrior, &mut health));
        // The second enemy swings during the warrior's hurt cooldown.
        assert!(!enemy_strike(&mut second, &mut warrior, &mut health));
        assert_eq!(health, Health(2));
        assert_eq!(second.cooldown(), ENEMY_PROFILE.strike_cooldown);
    }

    #[test]
    fn dying_enemy_cannot_strike() {
        let mut enemy = idle_enemy();
        enemy.kill();
        let mut warrior = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        assert!(!enemy_strike(&mut enemy, &mut warrior, &mut health));
        assert_eq!(health, Health(3));
    }

    fn combat_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.init_state::<AppState>();
        GameSet::configure(&mut app);
        app.insert_resource(Score(0));
        app.insert_resource(GameStats::default());
        app.init_resource::<Cursor>();
        app.add_plugins(CombatPlugin);
        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::InGame);
        for _ in 0..3 {
            app.update();
        }
        app
    }

    #[test]
    fn swing_scores_and_contact_hurts() {
        let mut app = combat_app();
        app.world_mut().resource_mut::<Cursor>().0 = Some(Vec2::new(500.0, 300.0));

        let mut warrior_state = ActorState::for_role(Role::Warrior);
        warrior_state.request_attack();
        let tick = warrior_state.update(false, &WARRIOR_PROFILE, &AnimationSet::SINGLE_FRAME);
        assert_eq!(tick.entered, Some(Action::Attacking));
        app.world_mut().spawn((
            Warrior,
            ScreenPosition(Vec2::new(400.0, 300.0)),
            warrior_state,
            LastTick(tick),
            Health(3),
        ));
        let victim = app
            .world_mut()
            .spawn((Enemy, ScreenPosition(Vec2::new(450.0, 300.0)), idle_enemy()))
            .id();
        let biter = app
            .world_mut()
            .spawn((Enemy, ScreenPosition(Vec2::new(410.0, 300.0)), idle_enemy()))
            .id();

        app.update();

        // Both enemies were in swing range, so neither may strike back.
        assert_eq!(app.world().resource::<Score>().0, 2);
        assert_eq!(app.world().resource::<GameStats>().enemies_slain, 2);
        assert!(app.world().get::<ActorState>(victim).unwrap().is_dying());
        assert!(app.world().get::<ActorState>(biter).unwrap().is_dying());
        assert_eq!(app.world().resource::<GameStats>().hurts_taken, 0);

        // A fresh enemy in contact lands a hit.
        let mut warrior = app
            .world_mut()
            .query_filtered::<&mut LastTick, With<Warrior>>();
        warrior.single_mut(app.world_mut()).unwrap().0 = Tick::default();
        app.world_mut()
            .spawn((Enemy, ScreenPosition(Vec2::new(400.0, 320.0)), idle_enemy()));
        app.update();

        let mut health = app.world_mut().query_filtered::<&Health, With<Warrior>>();
        assert_eq!(*health.single(app.world()).unwrap(), Health(2));
        assert_eq!(app.world().resource::<GameStats>().hurts_taken, 1);
    }
}
