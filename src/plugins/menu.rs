//! Main menu UI: title screen with a start button.

use bevy::prelude::*;

use crate::app_state::AppState;
use crate::resources::UiAssets;

const BUTTON_COLOR: Color = Color::srgb(0.8, 0.1, 0.1);

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::MainMenu), spawn_menu);
        app.add_systems(OnExit(AppState::MainMenu), despawn_menu);
        app.add_systems(
            Update,
            menu_input.run_if(in_state(AppState::MainMenu)),
        );
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Component)]
pub struct MenuRoot;

/// The red "Start Game" button, shared by the menu and game over screens.
#[derive(Component)]
pub struct StartButton;

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

pub fn spawn_start_button(parent: &mut ChildSpawnerCommands) {
    parent
        .spawn((
            StartButton,
            Button,
            Node {
                width: Val::Px(200.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new("Start Game"),
                TextColor(Color::WHITE),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
            ));
        });
}

/// Enter, or a click on a start button.
pub fn start_requested<'a>(
    keyboard: &ButtonInput<KeyCode>,
    buttons: impl IntoIterator<Item = &'a Interaction>,
) -> bool {
    keyboard.just_pressed(KeyCode::Enter)
        || buttons
            .into_iter()
            .any(|interaction| *interaction == Interaction::Pressed)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn spawn_menu(mut commands: Commands, ui: Option<Res<UiAssets>>) {
    let mut root = commands.spawn((
        MenuRoot,
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(20.0),
            ..default()
        },
    ));
    match &ui {
        Some(ui) => root.insert(ImageNode::new(ui.background.clone())),
        None => root.insert(BackgroundColor(Color::srgb(0.05, 0.06, 0.04))),
    };
    root.with_children(|parent| {
        parent.spawn((
            Text::new("Warrior Arena"),
            TextColor(Color::srgb(1.0, 0.85, 0.0)),
            TextFont {
                font_size: 64.0,
                ..default()
            },
        ));
        parent.spawn((
            Text::new("Left click to walk, right click to strike"),
            TextColor(Color::srgb(0.7, 0.7, 0.8)),
            TextFont {
                font_size: 18.0,
                ..default()
            },
        ));
        spawn_start_button(parent);
    });
}

fn despawn_menu(mut commands: Commands, query: Query<Entity, With<MenuRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

fn menu_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<StartButton>)>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if start_requested(&keyboard, &buttons) {
        next_state.set(AppState::InGame);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn setup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.init_state::<AppState>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_plugins(MenuPlugin);
        app
    }

    fn transition_to_main_menu(app: &mut App) {
        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::MainMenu);
        for _ in 0..5 {
            app.update();
        }
    }

    fn current_state(app: &App) -> AppState {
        *app.world().resource::<State<AppState>>().get()
    }

    #[test]
    fn menu_spawns_with_start_button() {
        let mut app = setup_app();
        transition_to_main_menu(&mut app);

        let count = app
            .world_mut()
            .query::<&MenuRoot>()
            .iter(app.world())
            .count();
        assert_eq!(count, 1);
        let buttons = app
            .world_mut()
            .query::<&StartButton>()
            .iter(app.world())
            .count();
        assert_eq!(buttons, 1);
    }

    #[test]
    fn menu_despawns_on_exit() {
        let mut app = setup_app();
        transition_to_main_menu(&mut app);

        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::InGame);
        for _ in 0..5 {
            app.update();
        }

        let count = app
            .world_mut()
            .query::<&MenuRoot>()
            .iter(app.world())
            .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn enter_starts_game() {
        let mut app = setup_app();
        transition_to_main_menu(&mut app);

        let mut input = ButtonInput::<KeyCode>::default();
        input.press(KeyCode::Enter);
        app.insert_resource(input);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(current_state(&app), AppState::InGame);
    }

    #[test]
    fn clicking_start_button_starts_game() {
        let mut app = setup_app();
        transition_to_main_menu(&mut app);
        assert_eq!(current_state(&app), AppState::MainMenu);

        let button = app
            .world_mut()
            .query_filtered::<Entity, With<StartButton>>()
            .single(app.world())
            .unwrap();
        app.world_mut().entity_mut(button).insert(Interaction::Pressed);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(current_state(&app), AppState::InGame);
    }

    #[test]
    fn start_requested_ignores_hover() {
        let keyboard = ButtonInput::<KeyCode>::default();
        assert!(!start_requested(&keyboard, &[Interaction::Hovered, Interaction::None]));
        assert!(start_requested(&keyboard, &[Interaction::Pressed]));
    }
}
