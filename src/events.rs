//! Combat events triggered by gameplay systems and observed by telemetry.

use bevy::prelude::*;

#[derive(Event, Debug)]
pub struct EnemyKilled;

#[derive(Event, Debug)]
pub struct WarriorHurt {
    pub health: u32,
}

/// The warrior's death animation has finished; the round is over.
#[derive(Event, Debug)]
pub struct WarriorFell;
