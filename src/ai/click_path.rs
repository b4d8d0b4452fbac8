//! Warrior pursuit: walk to the last clicked point along the grid.
//!
//! The whole route is recomputed every tick and only its first step is
//! consumed, so the warrior reacts immediately to a new click.

use bevy::math::Vec2;

use super::{Pursuit, Stride, find_path, step_toward};
use crate::plugins::arena::ArenaGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPath {
    pub target: Vec2,
}

impl Pursuit for ClickPath {
    fn stride(&self, from: Vec2, speed: f32, grid: &ArenaGrid) -> Stride {
        if from == self.target {
            return Stride::Hold;
        }

        let start = grid.cell_of(from);
        let goal = grid.cell_of(self.target);
        let Some(path) = find_path(grid, start, goal) else {
            return Stride::Hold;
        };

        // Inside the goal cell the route is empty; finish on the exact point.
        let waypoint = path
            .first()
            .map(|cell| grid.cell_center(*cell))
            .unwrap_or(self.target);
        Stride::Step(step_toward(from, waypoint, speed))
    }
}
