//! The main menu (seen on the title screen).
//!
//! Type a name, then press Enter or click Start.

use bevy::{
    ecs::spawn::SpawnWith,
    input::{
        ButtonState,
        keyboard::{Key, KeyboardInput},
    },
    prelude::*,
};

use crate::{
    images::ImageAssets,
    menus::{Menu, PlayerName},
    screens::Screen,
    theme::{palette::*, widget},
};

/// Longest name the entry box accepts, in characters.
const MAX_NAME_LEN: usize = 12;

/// How long the cursor stays on (and off).
const CURSOR_BLINK_SECS: f32 = 0.5;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::Main), (reset_name_entry, spawn_main_menu).chain());
    app.add_systems(
        Update,
        (
            edit_name,
            blink_cursor,
            update_name_text,
            update_start_button,
        )
            .chain()
            .run_if(in_state(Menu::Main)),
    );
}

/// The name being typed on the main menu.
#[derive(Resource, Debug)]
struct NameEntry {
    text: String,
    cursor_visible: bool,
    blink: Timer,
}

impl NameEntry {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor_visible: true,
            blink: Timer::from_seconds(CURSOR_BLINK_SECS, TimerMode::Repeating),
        }
    }

    /// Append a printable character if there is room. Returns whether it was added.
    fn push(&mut self, c: char) -> bool {
        if c.is_control() || self.text.chars().count() >= MAX_NAME_LEN {
            return false;
        }
        self.text.push(c);
        true
    }

    fn backspace(&mut self) {
        self.text.pop();
    }

    fn validated(&self) -> Option<PlayerName> {
        PlayerName::validated(&self.text)
    }

    /// The name with the cursor drawn after it.
    fn display(&self) -> String {
        let cursor = if self.cursor_visible { '|' } else { ' ' };
        format!("{}{}", self.text, cursor)
    }
}

#[derive(Component)]
struct NameText;

#[derive(Component)]
struct StartButton;

/// Start from the last name used, if any.
fn reset_name_entry(mut commands: Commands, player_name: Res<PlayerName>) {
    commands.insert_resource(NameEntry::new(player_name.0.clone()));
}

fn spawn_main_menu(mut commands: Commands, images: Res<ImageAssets>) {
    let background = images.menu_background.clone();

    commands.spawn((
        widget::ui_root("Main Menu"),
        // Shows through when the background image is missing
        BackgroundColor(MENU_BACKGROUND),
        GlobalZIndex(2),
        DespawnOnExit(Menu::Main),
        Children::spawn(SpawnWith(move |parent: &mut ChildSpawner| {
            parent.spawn((
                Name::new("Menu Background"),
                ImageNode::new(background),
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                ZIndex(-1),
            ));

            parent.spawn(widget::header("Bubble Shooter: cats"));
            parent.spawn(widget::label("Enter your name:"));

            parent.spawn((
                Name::new("Name Field"),
                Node {
                    width: Val::Px(320.0),
                    height: Val::Px(56.0),
                    align_items: AlignItems::Center,
                    padding: UiRect::horizontal(Val::Px(12.0)),
                    border: UiRect::all(Val::Px(3.0)),
                    ..default()
                },
                BackgroundColor(INPUT_BACKGROUND),
                BorderColor::all(INPUT_BORDER),
                BorderRadius::all(Val::Px(8.0)),
                children![(
                    Name::new("Name Text"),
                    Text::new("|"),
                    TextFont::from_font_size(28.0),
                    TextColor(LABEL_TEXT),
                    NameText,
                )],
            ));

            parent.spawn((
                Name::new("Hint"),
                Text::new("Press Enter to start"),
                TextFont::from_font_size(18.0),
                TextColor(HINT_TEXT),
            ));

            parent
                .spawn(widget::button("Start", start_on_click))
                .insert((StartButton, Visibility::Hidden));

            #[cfg(not(target_family = "wasm"))]
            parent.spawn(widget::button("Exit", exit_app));
        })),
    ));
}

fn edit_name(
    mut keyboard_input: MessageReader<KeyboardInput>,
    mut entry: ResMut<NameEntry>,
    mut player_name: ResMut<PlayerName>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    for input in keyboard_input.read() {
        if input.state != ButtonState::Pressed {
            continue;
        }

        match &input.logical_key {
            Key::Character(chars) => {
                for c in chars.chars() {
                    entry.push(c);
                }
            }
            Key::Space => {
                entry.push(' ');
            }
            Key::Backspace => entry.backspace(),
            Key::Enter => {
                if let Some(name) = entry.validated() {
                    start_match(name, &mut player_name, &mut next_screen);
                    return;
                }
            }
            _ => {}
        }
    }
}

fn blink_cursor(time: Res<Time>, mut entry: ResMut<NameEntry>) {
    if entry.blink.tick(time.delta()).just_finished() {
        entry.cursor_visible = !entry.cursor_visible;
    }
}

fn update_name_text(entry: Res<NameEntry>, mut text: Single<&mut Text, With<NameText>>) {
    if entry.is_changed() {
        text.0 = entry.display();
    }
}

fn update_start_button(
    entry: Res<NameEntry>,
    mut button: Single<&mut Visibility, With<StartButton>>,
) {
    button.set_if_neq(if entry.validated().is_some() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
}

fn start_on_click(
    _: On<Pointer<Click>>,
    entry: Res<NameEntry>,
    mut player_name: ResMut<PlayerName>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(name) = entry.validated() {
        start_match(name, &mut player_name, &mut next_screen);
    }
}

fn start_match(
    name: PlayerName,
    player_name: &mut PlayerName,
    next_screen: &mut NextState<Screen>,
) {
    info!("Starting match for {}", name.0);
    *player_name = name;
    next_screen.set(Screen::Gameplay);
}

#[cfg(not(target_family = "wasm"))]
fn exit_app(_: On<Pointer<Click>>, mut app_exit: MessageWriter<AppExit>) {
    app_exit.write(AppExit::Success);
}
