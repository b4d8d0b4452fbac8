pub mod arena;
pub mod camera;
pub mod combat;
pub mod enemies;
pub mod game_over;
pub mod hud;
pub mod menu;
pub mod movement;
pub mod sprites;
pub mod telemetry;
pub mod warrior;
