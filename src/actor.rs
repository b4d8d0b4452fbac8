//! The action state machine shared by the warrior and every enemy.
//!
//! Each tick an actor settles on exactly one action by fixed priority:
//! `Dying > Hurting > Attacking > Walking > Idle`. Attacking, hurting and
//! dying are exclusive: the actor is busy until the animation has played
//! through, and a busy actor accepts no new attack. Hurt and death requests
//! still preempt by priority.
//!
//! The machine knows nothing about ECS queries or rendering; systems feed it
//! the per-tick movement result and read back the frame to draw.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::components::{Health, Role};
use crate::plugins::sprites::AnimationRange;

// ---------------------------------------------------------------------------
// Actions and animation sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Idle,
    Walking,
    Attacking,
    Hurting,
    Dying,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Idle,
        Action::Walking,
        Action::Attacking,
        Action::Hurting,
        Action::Dying,
    ];

    /// Attack, hurt and death animations must finish before the actor is free.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Action::Attacking | Action::Hurting | Action::Dying)
    }

    /// Animation name in sprite sheet metadata.
    pub fn key(&self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Walking => "walk",
            Action::Attacking => "attack",
            Action::Hurting => "hurt",
            Action::Dying => "die",
        }
    }
}

/// Frame ranges for every action one role can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSet {
    pub idle: AnimationRange,
    pub walk: AnimationRange,
    pub attack: AnimationRange,
    pub hurt: AnimationRange,
    pub die: AnimationRange,
}

impl AnimationSet {
    /// Every action shows frame 0. Used when a sheet is unavailable.
    pub const SINGLE_FRAME: AnimationSet = AnimationSet {
        idle: AnimationRange { start: 0, count: 1 },
        walk: AnimationRange { start: 0, count: 1 },
        attack: AnimationRange { start: 0, count: 1 },
        hurt: AnimationRange { start: 0, count: 1 },
        die: AnimationRange { start: 0, count: 1 },
    };

    /// Collect the five action ranges from sheet metadata. Every action must
    /// be present with at least one frame.
    pub fn from_ranges(ranges: &HashMap<String, AnimationRange>) -> Result<Self, String> {
        let get = |action: Action| {
            let key = action.key();
            match ranges.get(key) {
                Some(range) if range.count > 0 => Ok(*range),
                Some(_) => Err(format!("Animation '{}' has no frames", key)),
                None => Err(format!("Missing animation '{}'", key)),
            }
        };
        Ok(Self {
            idle: get(Action::Idle)?,
            walk: get(Action::Walking)?,
            attack: get(Action::Attacking)?,
            hurt: get(Action::Hurting)?,
            die: get(Action::Dying)?,
        })
    }

    pub fn range(&self, action: Action) -> AnimationRange {
        match action {
            Action::Idle => self.idle,
            Action::Walking => self.walk,
            Action::Attacking => self.attack,
            Action::Hurting => self.hurt,
            Action::Dying => self.die,
        }
    }
}

// ---------------------------------------------------------------------------
// Role tuning
// ---------------------------------------------------------------------------

/// Ticks each frame of an action stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelays {
    pub idle: u32,
    pub walk: u32,
    pub attack: u32,
    pub hurt: u32,
    pub die: u32,
}

impl FrameDelays {
    pub fn get(&self, action: Action) -> u32 {
        match action {
            Action::Idle => self.idle,
            Action::Walking => self.walk,
            Action::Attacking => self.attack,
            Action::Hurting => self.hurt,
            Action::Dying => self.die,
        }
    }
}

/// Fixed tuning for one actor role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    pub delays: FrameDelays,
    /// Frame advances of the death animation before the actor is removed.
    pub death_cycles: u32,
    /// Ticks after a hurt during which no further hurt lands.
    pub hurt_cooldown: u32,
    /// Ticks between two strikes.
    pub strike_cooldown: u32,
    /// Cooldown an actor is created with.
    pub initial_cooldown: u32,
    /// The cooldown only winds down on ticks spent in contact with the
    /// warrior, not on every update.
    pub contact_cooldown: bool,
    /// Pixels per tick.
    pub speed: f32,
    /// Warrior: attack range. Enemy: distance at which it stops to attack.
    pub reach: f32,
    pub max_health: u32,
}

pub const WARRIOR_PROFILE: RoleProfile = RoleProfile {
    delays: FrameDelays {
        idle: 10,
        walk: 5,
        attack: 10,
        hurt: 10,
        die: 10,
    },
    death_cycles: 6,
    hurt_cooldown: 100,
    strike_cooldown: 0,
    initial_cooldown: 0,
    contact_cooldown: false,
    speed: 2.0,
    reach: 100.0,
    max_health: 3,
};

pub const ENEMY_PROFILE: RoleProfile = RoleProfile {
    delays: FrameDelays {
        idle: 5,
        walk: 5,
        attack: 5,
        hurt: 5,
        die: 5,
    },
    death_cycles: 2,
    hurt_cooldown: 0,
    strike_cooldown: 200,
    initial_cooldown: 50,
    contact_cooldown: true,
    speed: 1.0,
    reach: 25.0,
    max_health: 1,
};

impl Role {
    pub fn profile(&self) -> &'static RoleProfile {
        match self {
            Role::Warrior => &WARRIOR_PROFILE,
            Role::Enemy => &ENEMY_PROFILE,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Requests waiting for the next `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    attack: bool,
    hurt: bool,
    die: bool,
}

impl Pending {
    fn any(&self) -> bool {
        self.attack || self.hurt || self.die
    }
}

/// What happened during one `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// The action started this tick, if it changed.
    pub entered: Option<Action>,
    /// The death animation just finished; despawn the actor.
    pub removed: bool,
}

/// The most recent `update` report, kept for systems later in the tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastTick(pub Tick);

#[derive(Component, Debug, Clone, PartialEq)]
pub struct ActorState {
    action: Action,
    frame_index: usize,
    frame_counter: u32,
    cooldown: u32,
    busy: bool,
    pending: Pending,
    death_advances: u32,
    removed: bool,
}

impl ActorState {
    pub fn new(initial_cooldown: u32) -> Self {
        Self {
            action: Action::Idle,
            frame_index: 0,
            frame_counter: 0,
            cooldown: initial_cooldown,
            busy: false,
            pending: Pending::default(),
            death_advances: 0,
            removed: false,
        }
    }

    pub fn for_role(role: Role) -> Self {
        Self::new(role.profile().initial_cooldown)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn set_cooldown(&mut self, ticks: u32) {
        self.cooldown = ticks;
    }

    /// Count the cooldown down by one tick.
    pub fn wind_down(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Dying now or about to start dying.
    pub fn is_dying(&self) -> bool {
        self.action == Action::Dying || self.pending.die
    }

    /// Free to walk this tick: nothing exclusive running or queued.
    pub fn can_move(&self) -> bool {
        !self.busy && !self.pending.any() && !self.removed
    }

    /// Queue an attack for the next update. Refused while busy or while
    /// another exclusive action is queued.
    pub fn request_attack(&mut self) -> bool {
        if self.busy || self.pending.any() || self.removed {
            return false;
        }
        self.pending.attack = true;
        true
    }

    /// Take one point of damage. Refused during the hurt cooldown and while
    /// already hurting or dying. Running out of health queues death too, so
    /// the next update goes straight to `Dying`.
    pub fn try_hurt(&mut self, health: &mut Health, profile: &RoleProfile) -> bool {
        if self.cooldown > 0
            || self.is_dying()
            || self.pending.hurt
            || self.action == Action::Hurting
            || self.removed
        {
            return false;
        }
        health.0 = health.0.saturating_sub(1);
        self.cooldown = profile.hurt_cooldown;
        self.pending.hurt = true;
        if health.0 == 0 {
            self.pending.die = true;
        }
        true
    }

    /// Queue the death animation.
    pub fn kill(&mut self) {
        if !self.removed {
            self.pending.die = true;
        }
    }

    /// Advance one tick. `moving` reports whether the actor changed position
    /// this tick.
    pub fn update(&mut self, moving: bool, profile: &RoleProfile, animations: &AnimationSet) -> Tick {
        if !profile.contact_cooldown {
            self.wind_down();
        }
        if self.removed {
            return Tick::default();
        }

        let next = self.select(moving);
        let mut tick = Tick::default();
        if next != self.action {
            self.enter(next);
            tick.entered = Some(next);
            return tick;
        }

        self.frame_counter += 1;
        if self.frame_counter < profile.delays.get(self.action).max(1) {
            return tick;
        }
        self.frame_counter = 0;

        let count = animations.range(self.action).count.max(1);
        match self.action {
            Action::Dying => {
                // Hold the last frame; the death animation plays once.
                self.frame_index = (self.frame_index + 1).min(count - 1);
                self.death_advances += 1;
                if self.death_advances >= profile.death_cycles {
                    self.removed = true;
                    tick.removed = true;
                }
            }
            Action::Attacking | Action::Hurting => {
                self.frame_index = (self.frame_index + 1) % count;
                if self.frame_index == 0 {
                    self.busy = false;
                    self.enter(Action::Idle);
                }
            }
            Action::Idle | Action::Walking => {
                self.frame_index = (self.frame_index + 1) % count;
            }
        }
        tick
    }

    /// Sprite atlas index for the current frame.
    pub fn atlas_index(&self, animations: &AnimationSet) -> usize {
        let range = animations.range(self.action);
        range.start + self.frame_index.min(range.count.saturating_sub(1))
    }

    fn select(&self, moving: bool) -> Action {
        if self.action == Action::Dying || self.pending.die {
            Action::Dying
        } else if self.pending.hurt || (self.busy && self.action == Action::Hurting) {
            Action::Hurting
        } else if self.pending.attack || (self.busy && self.action == Action::Attacking) {
            Action::Attacking
        } else if moving {
            Action::Walking
        } else {
            Action::Idle
        }
    }

    fn enter(&mut self, action: Action) {
        self.action = action;
        self.frame_index = 0;
        self.frame_counter = 0;
        self.busy = action.is_exclusive();
        match action {
            // Whatever was queued below death is dropped.
            Action::Dying => self.pending = Pending::default(),
            Action::Hurting => {
                self.pending.hurt = false;
                self.pending.attack = false;
            }
            Action::Attacking => self.pending.attack = false,
            Action::Idle | Action::Walking => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: AnimationSet = AnimationSet {
        idle: AnimationRange { start: 0, count: 4 },
        walk: AnimationRange { start: 4, count: 6 },
        attack: AnimationRange { start: 10, count: 3 },
        hurt: AnimationRange { start: 13, count: 2 },
        die: AnimationRange { start: 15, count: 4 },
    };

    fn run(state: &mut ActorState, ticks: u32, moving: bool) {
        for _ in 0..ticks {
            state.update(moving, &WARRIOR_PROFILE, &SHEET);
        }
    }

    #[test]
    fn starts_idle_and_not_busy() {
        let state = ActorState::for_role(Role::Warrior);
        assert_eq!(state.action(), Action::Idle);
        assert!(!state.busy());
        assert_eq!(state.cooldown(), 0);
        assert_eq!(ActorState::for_role(Role::Enemy).cooldown(), 50);
    }

    #[test]
    fn walking_while_moving_then_idle() {
        let mut state = ActorState::for_role(Role::Warrior);
        let tick = state.update(true, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(tick.entered, Some(Action::Walking));
        assert_eq!(state.action(), Action::Walking);
        let tick = state.update(false, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(tick.entered, Some(Action::Idle));
    }

    #[test]
    fn frames_advance_at_action_delay_and_wrap() {
        let mut state = ActorState::for_role(Role::Warrior);
        state.update(true, &WARRIOR_PROFILE, &SHEET); // enter walk
        run(&mut state, 4, true);
        assert_eq!(state.frame_index(), 0);
        run(&mut state, 1, true);
        assert_eq!(state.frame_index(), 1);
        // Six walk frames at 5 ticks each: back to frame 1 after 30 more.
        run(&mut state, 30, true);
        assert_eq!(state.frame_index(), 1);
        assert_eq!(state.atlas_index(&SHEET), 5);
    }

    #[test]
    fn attack_is_busy_until_played_through() {
        let mut state = ActorState::for_role(Role::Warrior);
        assert!(state.request_attack());
        assert!(!state.can_move());
        let tick = state.update(false, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(tick.entered, Some(Action::Attacking));
        assert!(state.busy());
        assert!(!state.request_attack(), "busy actors refuse a second attack");

        // Three frames at 10 ticks each.
        run(&mut state, 29, false);
        assert_eq!(state.action(), Action::Attacking);
        assert!(state.busy());
        run(&mut state, 1, false);
        assert_eq!(state.action(), Action::Idle);
        assert!(!state.busy());
        assert!(state.request_attack());
    }

    #[test]
    fn attack_wins_over_walking() {
        let mut state = ActorState::for_role(Role::Warrior);
        state.request_attack();
        state.update(true, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(state.action(), Action::Attacking);
    }

    #[test]
    fn hurt_wins_over_walking_same_tick() {
        let mut state = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
        state.update(true, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(state.action(), Action::Hurting);
        assert!(state.busy());
        assert_eq!(health, Health(2));
    }

    #[test]
    fn hurt_preempts_running_attack() {
        let mut state = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        state.request_attack();
        run(&mut state, 3, false);
        assert_eq!(state.action(), Action::Attacking);
        assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
        run(&mut state, 1, false);
        assert_eq!(state.action(), Action::Hurting);
    }

    #[test]
    fn hurt_cooldown_blocks_repeat() {
        let mut state = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
        run(&mut state, 50, false);
        assert!(!state.try_hurt(&mut health, &WARRIOR_PROFILE));
        assert_eq!(health, Health(2));
        run(&mut state, 50, false);
        assert_eq!(state.cooldown(), 0);
        assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
        assert_eq!(health, Health(1));
    }

    #[test]
    fn three_hurts_kill() {
        let mut state = ActorState::for_role(Role::Warrior);
        let mut health = Health(3);
        for _ in 0..3 {
            assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
            run(&mut state, WARRIOR_PROFILE.hurt_cooldown, false);
        }
        assert_eq!(health, Health(0));
        assert_eq!(state.action(), Action::Dying);
        assert!(!state.try_hurt(&mut health, &WARRIOR_PROFILE));
    }

    #[test]
    fn last_hurt_chains_into_dying_then_removal() {
        let mut state = ActorState::for_role(Role::Warrior);
        let mut health = Health(1);
        assert!(state.try_hurt(&mut health, &WARRIOR_PROFILE));
        assert_eq!(health, Health(0));

        let tick = state.update(true, &WARRIOR_PROFILE, &SHEET);
        assert_eq!(tick.entered, Some(Action::Dying));
        assert!(state.busy());

        let lifetime = WARRIOR_PROFILE.death_cycles * WARRIOR_PROFILE.delays.die;
        run(&mut state, lifetime - 1, true);
        assert!(!state.is_removed());
        assert_eq!(state.action(), Action::Dying);
        let tick = state.update(true, &WARRIOR_PROFILE, &SHEET);
        assert!(tick.removed);
        assert!(state.is_removed());
        // Death animation holds its last frame.
        assert_eq!(state.atlas_index(&SHEET), 18);
    }

    #[test]
    fn kill_overrides_pending_attack() {
        let mut state = ActorState::for_role(Role::Enemy);
        state.request_attack();
        state.kill();
        state.update(false, &ENEMY_PROFILE, &SHEET);
        assert_eq!(state.action(), Action::Dying);
        assert!(!state.request_attack());
        assert!(!state.can_move());
    }

    #[test]
    fn removed_actor_stays_removed() {
        let mut state = ActorState::for_role(Role::Enemy);
        state.kill();
        for _ in 0..100 {
            state.update(false, &ENEMY_PROFILE, &SHEET);
        }
        assert!(state.is_removed());
        let tick = state.update(true, &ENEMY_PROFILE, &SHEET);
        assert_eq!(tick, Tick::default());
        assert_eq!(state.action(), Action::Dying);
    }

    #[test]
    fn animation_set_requires_every_action() {
        let mut ranges = HashMap::new();
        for (i, action) in Action::ALL.iter().enumerate() {
            ranges.insert(action.key().to_string(), AnimationRange { start: i * 4, count: 4 });
        }
        let set = AnimationSet::from_ranges(&ranges).unwrap();
        assert_eq!(set.range(Action::Hurting), AnimationRange { start: 12, count: 4 });

        ranges.remove("hurt");
        assert!(AnimationSet::from_ranges(&ranges).unwrap_err().contains("hurt"));

        ranges.insert("hurt".to_string(), AnimationRange { start: 0, count: 0 });
        assert!(AnimationSet::from_ranges(&ranges).unwrap_err().contains("no frames"));
    }
}
