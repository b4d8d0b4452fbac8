use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Resource, Debug)]
pub struct Score(pub u64);

/// Cursor position in arena pixel space, or `None` outside the window.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Cursor(pub Option<Vec2>);

// ---------------------------------------------------------------------------
// Arena config
// ---------------------------------------------------------------------------

/// Screen and grid dimensions. The grid is `screen / cell_size` cells in
/// each direction; the remainder of a partial cell is not addressable.
#[derive(Resource, Debug, Clone)]
pub struct ArenaConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub cell_size: u32,
    /// ASCII layout with `#` for blocked cells. `None` means all open.
    pub layout_file: Option<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            cell_size: 20,
            layout_file: Some("assets/maps/arena.txt".to_string()),
        }
    }
}

impl ArenaConfig {
    /// An arena with no layout file; every cell is open.
    pub fn open(screen_width: u32, screen_height: u32, cell_size: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            cell_size,
            layout_file: None,
        }
    }

    pub fn grid_width(&self) -> usize {
        (self.screen_width / self.cell_size) as usize
    }

    pub fn grid_height(&self) -> usize {
        (self.screen_height / self.cell_size) as usize
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width as f32, self.screen_height as f32)
    }

    /// Screen center, where the warrior starts.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.screen_width / 2) as f32,
            (self.screen_height / 2) as f32,
        )
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Clone)]
pub struct SpawnConfig {
    /// Chance per tick that a new enemy appears.
    pub spawn_rate: f64,
    /// Pixels per tick.
    pub enemy_speed: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 0.01,
            enemy_speed: 1.0,
        }
    }
}

/// Random source for enemy spawns. Seeded from entropy for play and from a
/// fixed seed in tests.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// ---------------------------------------------------------------------------
// Game stats
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Default)]
pub struct GameStats {
    pub enemies_spawned: u32,
    pub enemies_slain: u32,
    pub hurts_taken: u32,
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Images loaded during `AppState::Loading`.
#[derive(AssetCollection, Resource)]
pub struct UiAssets {
    #[asset(path = "ui/background.png")]
    pub background: Handle<Image>,
    #[asset(path = "ui/heart.png")]
    pub heart: Handle<Image>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
