//! Game Over screen: final score, then back to the main menu for a replay.

use bevy::prelude::*;

use crate::app_state::AppState;
use crate::plugins::menu::{StartButton, spawn_start_button, start_requested};
use crate::resources::{GameStats, Score};

pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::GameOver), spawn_game_over);
        app.add_systems(OnExit(AppState::GameOver), despawn_game_over);
        app.add_systems(
            Update,
            game_over_input.run_if(in_state(AppState::GameOver)),
        );
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Component)]
pub struct GameOverRoot;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn spawn_game_over(
    mut commands: Commands,
    score: Option<Res<Score>>,
    stats: Option<Res<GameStats>>,
) {
    let lines = [
        format!("Final Score: {}", score.map_or(0, |s| s.0)),
        format!(
            "Enemies Slain: {}",
            stats.as_ref().map_or(0, |s| s.enemies_slain)
        ),
        format!("Hits Taken: {}", stats.as_ref().map_or(0, |s| s.hurts_taken)),
    ];

    commands
        .spawn((
            GameOverRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.05, 0.02, 0.02)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Game Over"),
                TextColor(Color::srgb(0.9, 0.15, 0.1)),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
            ));

            for line in lines {
                parent.spawn((
                    Text::new(line),
                    TextColor(Color::WHITE),
                    TextFont {
                        font_size: 22.0,
                        ..default()
                    },
                ));
            }

            spawn_start_button(parent);
        });
}

fn despawn_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

fn game_over_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<StartButton>)>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if start_requested(&keyboard, &buttons) {
        next_state.set(AppState::MainMenu);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
