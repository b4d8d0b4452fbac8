//! Sprite sheet loading and per-actor frame selection.
//!
//! Each role has a PNG sprite sheet and a JSON metadata sidecar describing
//! which atlas frames belong to each action. The actor state machine decides
//! the frame; this plugin only maps it onto the texture atlas.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope, warn};
use std::collections::HashMap;

use crate::actor::{ActorState, AnimationSet};
use crate::app_state::AppState;
use crate::components::Role;
use crate::plugins::telemetry::GameSet;

/// On-screen size of one actor frame, in pixels.
pub const ACTOR_SIZE: Vec2 = Vec2::new(120.0, 150.0);

/// Plugin that registers sprite loading and frame sync systems.
pub struct SpriteSheetPlugin;

impl Plugin for SpriteSheetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpriteSheetLibrary>()
            .add_systems(OnEnter(AppState::InGame), load_character_sheets)
            .add_systems(
                Update,
                sync_actor_frames
                    .in_set(GameSet::Presentation)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

// ---------------------------------------------------------------------------
// JSON metadata
// ---------------------------------------------------------------------------

/// Deserialized from the JSON sidecar next to each sprite sheet PNG.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SpriteSheetMeta {
    pub frame_size: [u32; 2],
    pub columns: u32,
    pub rows: u32,
    pub animations: HashMap<String, AnimationRange>,
}

/// A contiguous range of frames in the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct AnimationRange {
    pub start: usize,
    pub count: usize,
}

impl SpriteSheetMeta {
    pub fn parse(json: &str) -> Result<Self, String> {
        let meta: SpriteSheetMeta = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let frames = (meta.columns * meta.rows) as usize;
        if let Some((name, range)) = meta
            .animations
            .iter()
            .find(|(_, r)| r.start + r.count > frames)
        {
            return Err(format!(
                "Animation '{}' ({}..{}) runs past the {} frames in the sheet",
                name,
                range.start,
                range.start + range.count,
                frames
            ));
        }
        Ok(meta)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Loaded sprite sheets, keyed by role sheet name.
#[derive(Resource, Default)]
pub struct SpriteSheetLibrary {
    pub sheets: HashMap<String, CharacterSheet>,
}

/// All data needed to draw and animate one role.
#[derive(Debug, Clone)]
pub struct CharacterSheet {
    pub image: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
    pub animations: AnimationSet,
}

impl SpriteSheetLibrary {
    /// Load a sprite sheet from a PNG path under `assets/`.
    ///
    /// Expects a JSON sidecar at the same path with `.json` extension that
    /// names a frame range for every action.
    pub fn load(
        &mut self,
        name: &str,
        png_path: &str,
        asset_server: &AssetServer,
        layouts: &mut Assets<TextureAtlasLayout>,
    ) -> Result<(), String> {
        let json_path = std::path::Path::new("assets")
            .join(png_path)
            .with_extension("json");
        let json_str = std::fs::read_to_string(&json_path)
            .map_err(|e| format!("Failed to read {}: {}", json_path.display(), e))?;
        let meta = SpriteSheetMeta::parse(&json_str)
            .map_err(|e| format!("Failed to parse {}: {}", json_path.display(), e))?;
        let animations = AnimationSet::from_ranges(&meta.animations)
            .map_err(|e| format!("Incomplete sheet {}: {}", json_path.display(), e))?;

        let layout = TextureAtlasLayout::from_grid(
            UVec2::new(meta.frame_size[0], meta.frame_size[1]),
            meta.columns,
            meta.rows,
            None,
            None,
        );

        self.sheets.insert(
            name.to_string(),
            CharacterSheet {
                image: asset_server.load(png_path.to_string()),
                layout: layouts.add(layout),
                animations,
            },
        );
        Ok(())
    }

    /// Animation set for a role, or single-frame animations when its sheet
    /// failed to load.
    pub fn animations(&self, role: Role) -> &AnimationSet {
        self.sheets
            .get(role.sheet_name())
            .map(|sheet| &sheet.animations)
            .unwrap_or(&AnimationSet::SINGLE_FRAME)
    }

    /// Sprite for a freshly spawned actor. Falls back to a plain colored box.
    pub fn sprite_for(&self, role: Role, fallback: Color) -> Sprite {
        match self.sheets.get(role.sheet_name()) {
            Some(sheet) => Sprite {
                image: sheet.image.clone(),
                texture_atlas: Some(TextureAtlas {
                    layout: sheet.layout.clone(),
                    index: sheet.animations.idle.start,
                }),
                custom_size: Some(ACTOR_SIZE),
                ..default()
            },
            None => Sprite::from_color(fallback, ACTOR_SIZE * 0.3),
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Load every role's sheet once. Missing art is not fatal.
pub fn load_character_sheets(
    mut library: ResMut<SpriteSheetLibrary>,
    asset_server: Option<Res<AssetServer>>,
    layouts: Option<ResMut<Assets<TextureAtlasLayout>>>,
) {
    let (Some(asset_server), Some(mut layouts)) = (asset_server, layouts) else {
        return;
    };
    for role in [Role::Warrior, Role::Enemy] {
        let name = role.sheet_name();
        if library.sheets.contains_key(name) {
            continue;
        }
        let png = format!("sprites/{}.png", name);
        match library.load(name, &png, &asset_server, &mut layouts) {
            Ok(()) => info!("sprite sheet loaded: {}", name),
            Err(e) => warn!("sprite sheet unavailable, using placeholder: {}", e),
        }
    }
}

/// Point each actor's atlas at the frame its state machine selected.
#[span_fn]
fn sync_actor_frames(
    library: Res<SpriteSheetLibrary>,
    mut query: Query<(&Role, &ActorState, &mut Sprite)>,
) {
    for (role, state, mut sprite) in &mut query {
        let index = state.atlas_index(library.animations(*role));
        if let Some(atlas) = &mut sprite.texture_atlas
            && atlas.index != index
        {
            atlas.index = index;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
