//! Pathfinding and target acquisition. Each actor role has its own pursuit
//! strategy; both feed the shared actor state machine.

pub mod chase;
pub mod click_path;

use bevy::math::Vec2;
use micromegas_tracing::prelude::*;

use crate::components::GridCoord;
use crate::plugins::arena::ArenaGrid;

/// Cells from (excluding) the start to (including) the goal.
pub type Path = Vec<GridCoord>;

/// Shortest 4-connected path between two cells, or `None` when the goal is
/// blocked, off the grid, or unreachable. Start and goal need no validation.
#[span_fn]
pub fn find_path(grid: &ArenaGrid, start: GridCoord, goal: GridCoord) -> Option<Path> {
    if !grid.is_open(goal) {
        return None;
    }

    let (steps, _cost) = pathfinding::prelude::astar(
        &start,
        |cell| grid.open_neighbors(*cell).map(|n| (n, 1u32)),
        |cell| manhattan(cell, &goal),
        |cell| *cell == goal,
    )?;

    Some(steps.into_iter().skip(1).collect())
}

/// Manhattan distance heuristic.
pub fn manhattan(a: &GridCoord, b: &GridCoord) -> u32 {
    (a.col - b.col).unsigned_abs() + (a.row - b.row).unsigned_abs()
}

/// Move `from` toward `to` by at most `speed`, landing exactly on `to` when
/// it is within reach.
pub fn step_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let offset = to - from;
    let dist = offset.length();
    if dist <= speed {
        to
    } else {
        from + offset / dist * speed
    }
}

/// What a pursuit strategy wants the actor to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stride {
    /// Move to this pixel position.
    Step(Vec2),
    /// Close enough to the quarry; attack instead of moving.
    Engage,
    /// Nothing to do (arrived, or no route).
    Hold,
}

/// Target acquisition strategy for one actor role.
pub trait Pursuit {
    fn stride(&self, from: Vec2, speed: f32, grid: &ArenaGrid) -> Stride;
}
