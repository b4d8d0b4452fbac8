//! Enemy pursuit: straight-line approach toward the warrior, no pathfinding.

use bevy::math::Vec2;

use super::{Pursuit, Stride, step_toward};
use crate::plugins::arena::ArenaGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectChase {
    pub quarry: Vec2,
    /// Distance at which the chaser stops and attacks.
    pub reach: f32,
}

impl DirectChase {
    pub fn in_reach(&self, from: Vec2) -> bool {
        from.distance(self.quarry) <= self.reach
    }
}

impl Pursuit for DirectChase {
    fn stride(&self, from: Vec2, speed: f32, _grid: &ArenaGrid) -> Stride {
        if self.in_reach(from) {
            Stride::Engage
        } else {
            Stride::Step(step_toward(from, self.quarry, speed))
        }
    }
}
