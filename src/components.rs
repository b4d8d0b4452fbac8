use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Grid and spatial
// ---------------------------------------------------------------------------

/// Cell address on the arena grid. Distinct from pixel coordinates.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The four orthogonal neighbors, in right/left/down/up order.
    pub fn neighbors(&self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.col + 1, self.row),
            GridCoord::new(self.col - 1, self.row),
            GridCoord::new(self.col, self.row + 1),
            GridCoord::new(self.col, self.row - 1),
        ]
    }
}

/// Continuous position in arena pixel space: origin top-left, y down.
/// Rendering converts this to world space every frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Deref, DerefMut)]
pub struct ScreenPosition(pub Vec2);

/// Pixels per tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);

/// Where the warrior was last told to walk, in pixel space.
#[derive(Component, Debug, Clone, Copy, PartialEq, Deref, DerefMut)]
pub struct MoveTarget(pub Vec2);

/// Remaining hit points.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health(pub u32);

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Warrior;

#[derive(Component, Debug)]
pub struct Enemy;

/// Which animation set and tuning an actor uses.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Warrior,
    Enemy,
}

impl Role {
    /// Key into the sprite sheet library.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Role::Warrior => "warrior",
            Role::Enemy => "enemy",
        }
    }
}

/// Marker for entities that live only while a round is in progress.
#[derive(Component, Debug)]
pub struct ArenaEntity;
