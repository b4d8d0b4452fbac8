//! HUD overlay: hearts for the warrior's health and the score.

use bevy::prelude::*;
use micromegas_tracing::prelude::{span_fn, span_scope};

use crate::actor::WARRIOR_PROFILE;
use crate::app_state::AppState;
use crate::components::{Health, Warrior};
use crate::plugins::telemetry::GameSet;
use crate::resources::{Score, UiAssets};

const HEART_SIZE: f32 = 32.0;
const HEART_COLOR: Color = Color::srgb(0.85, 0.1, 0.15);

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_hud);
        app.add_systems(OnExit(AppState::InGame), despawn_hud);
        app.add_systems(
            Update,
            update_hud
                .in_set(GameSet::Presentation)
                .run_if(in_state(AppState::InGame)),
        );
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct ScoreText;

/// One heart per point of health, left to right.
#[derive(Component)]
pub struct Heart(pub u32);

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

#[span_fn]
fn spawn_hud(mut commands: Commands, ui: Option<Res<UiAssets>>) {
    let heart_node = Node {
        width: Val::Px(HEART_SIZE),
        height: Val::Px(HEART_SIZE),
        ..default()
    };
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Auto,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(12.0)),
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                left: Val::Px(0.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    column_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|row| {
                    for i in 0..WARRIOR_PROFILE.max_health {
                        let mut heart = row.spawn((Heart(i), heart_node.clone()));
                        match &ui {
                            Some(ui) => heart.insert(ImageNode::new(ui.heart.clone())),
                            None => heart.insert(BackgroundColor(HEART_COLOR)),
                        };
                    }
                });
            parent.spawn((
                ScoreText,
                Text::new("Score: 0"),
                TextColor(Color::WHITE),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
            ));
        });
}

#[span_fn]
fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

#[span_fn]
fn update_hud(
    score: Res<Score>,
    warrior: Query<&Health, With<Warrior>>,
    mut score_text: Query<&mut Text, With<ScoreText>>,
    mut hearts: Query<(&Heart, &mut Node)>,
) {
    if let Ok(mut text) = score_text.single_mut() {
        let line = format!("Score: {}", score.0);
        if **text != line {
            **text = line;
        }
    }

    // Keep the last hearts on screen while the warrior is being removed.
    let Ok(health) = warrior.single() else {
        return;
    };
    for (heart, mut node) in &mut hearts {
        let display = if heart.0 < health.0 {
            Display::Flex
        } else {
            Display::None
        };
        if node.display != display {
            node.display = display;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
