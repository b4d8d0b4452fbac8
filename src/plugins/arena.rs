//! Arena grid, coordinate conversion, and arena rendering.
//!
//! Parses an ASCII layout into a passability grid used by the pathfinder.
//! The background image and blocked cells are spawned as sprites for the
//! duration of a round.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_scope};

use crate::app_state::AppState;
use crate::components::{ArenaEntity, GridCoord};
use crate::resources::{ArenaConfig, UiAssets};

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaConfig>();
        app.add_systems(OnEnter(AppState::InGame), load_arena);
        app.add_systems(OnExit(AppState::InGame), cleanup_arena);
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const BLOCKED_COLOR: Color = Color::srgb(0.12, 0.1, 0.08);
const FLOOR_COLOR: Color = Color::srgb(0.2, 0.25, 0.15);

// ---------------------------------------------------------------------------
// Arena grid resource
// ---------------------------------------------------------------------------

/// Fixed-size passability map. Built once per round and read-only after.
#[derive(Resource, Debug, Clone)]
pub struct ArenaGrid {
    pub width: usize,
    pub height: usize,
    pub cell_size: u32,
    blocked: Vec<bool>,
}

impl ArenaGrid {
    /// A grid with every cell open.
    pub fn open(width: usize, height: usize, cell_size: u32) -> Self {
        Self {
            width,
            height,
            cell_size,
            blocked: vec![false; width * height],
        }
    }

    /// Same grid with the given cells blocked. Out-of-range cells are ignored.
    pub fn with_blocked(mut self, cells: impl IntoIterator<Item = GridCoord>) -> Self {
        for cell in cells {
            if let Some(i) = self.index(cell) {
                self.blocked[i] = true;
            }
        }
        self
    }

    /// Parse an ASCII layout (`#` blocked, `.` or space open) into a grid of
    /// the given size. Short rows and missing rows are padded with open cells;
    /// rows or columns beyond the grid are an error.
    pub fn parse(text: &str, width: usize, height: usize, cell_size: u32) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("Arena has zero size".to_string());
        }

        let mut grid = Self::open(width, height, cell_size);
        for (row, line) in text.lines().enumerate() {
            if row >= height {
                return Err(format!("Layout has more than {} rows", height));
            }
            for (col, ch) in line.chars().enumerate() {
                if col >= width {
                    return Err(format!("Row {} is wider than {} cells", row, width));
                }
                grid.blocked[row * width + col] = match ch {
                    '#' => true,
                    '.' | ' ' => false,
                    _ => {
                        return Err(format!(
                            "Unknown cell character '{}' at ({}, {})",
                            ch, col, row
                        ));
                    }
                };
            }
        }
        Ok(grid)
    }

    /// Build the grid described by the config, reading its layout file if any.
    pub fn from_config(config: &ArenaConfig) -> Result<Self, String> {
        let (width, height) = (config.grid_width(), config.grid_height());
        match &config.layout_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read layout {}: {}", path, e))?;
                Self::parse(&text, width, height, config.cell_size)
                    .map_err(|e| format!("Failed to parse layout {}: {}", path, e))
            }
            None => Ok(Self::open(width, height, config.cell_size)),
        }
    }

    pub fn in_bounds(&self, cell: GridCoord) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as usize) < self.width
            && (cell.row as usize) < self.height
    }

    /// Open and inside the grid. Out-of-range cells count as blocked.
    pub fn is_open(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some_and(|i| !self.blocked[i])
    }

    /// Walkable orthogonal neighbors of a cell.
    pub fn open_neighbors(&self, cell: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        cell.neighbors().into_iter().filter(|n| self.is_open(*n))
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| GridCoord::new((i % self.width) as i32, (i / self.width) as i32))
    }

    /// Cell containing a pixel-space point.
    pub fn cell_of(&self, pixel: Vec2) -> GridCoord {
        let size = self.cell_size as f32;
        GridCoord::new(
            (pixel.x / size).floor() as i32,
            (pixel.y / size).floor() as i32,
        )
    }

    /// Pixel-space center of a cell.
    pub fn cell_center(&self, cell: GridCoord) -> Vec2 {
        let size = self.cell_size as i32;
        Vec2::new(
            (cell.col * size + size / 2) as f32,
            (cell.row * size + size / 2) as f32,
        )
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.row as usize * self.width + cell.col as usize)
    }
}

// ---------------------------------------------------------------------------
// Coordinate conversion
// ---------------------------------------------------------------------------

/// Convert a pixel-space point (origin top-left, y down) to world
/// coordinates (origin at the arena center, y up).
pub fn screen_to_world(pos: Vec2, screen: Vec2) -> Vec2 {
    Vec2::new(pos.x - screen.x / 2.0, screen.y / 2.0 - pos.y)
}

/// Inverse of [`screen_to_world`].
pub fn world_to_screen(world: Vec2, screen: Vec2) -> Vec2 {
    Vec2::new(world.x + screen.x / 2.0, screen.y / 2.0 - world.y)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Build the grid for a new round and spawn its background and obstacles.
pub fn load_arena(mut commands: Commands, config: Res<ArenaConfig>, ui: Option<Res<UiAssets>>) {
    span_scope!("arena_load");
    let grid = ArenaGrid::from_config(&config).unwrap_or_else(|e| panic!("{}", e));
    let screen = config.screen_size();

    let background = match ui {
        Some(ui) => Sprite {
            image: ui.background.clone(),
            custom_size: Some(screen),
            ..default()
        },
        None => Sprite::from_color(FLOOR_COLOR, screen),
    };
    commands.spawn((ArenaEntity, background, Transform::from_xyz(0.0, 0.0, -1.0)));

    let cell = grid.cell_size as f32;
    for blocked in grid.blocked_cells() {
        let world = screen_to_world(grid.cell_center(blocked), screen);
        commands.spawn((
            ArenaEntity,
            blocked,
            Sprite::from_color(BLOCKED_COLOR, Vec2::splat(cell)),
            Transform::from_xyz(world.x, world.y, 0.0),
        ));
    }

    info!(
        "arena loaded: {}x{} cells, {} blocked",
        grid.width,
        grid.height,
        grid.blocked_cells().count()
    );
    commands.insert_resource(grid);
}

/// Despawn everything that belongs to the finished round.
fn cleanup_arena(mut commands: Commands, query: Query<Entity, With<ArenaEntity>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<ArenaGrid>();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
