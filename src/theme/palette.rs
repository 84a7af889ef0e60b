use bevy::prelude::*;

/// Dark text for the cream menu background
pub const LABEL_TEXT: Color = Color::srgb(0.1, 0.1, 0.1);

/// Title text
pub const HEADER_TEXT: Color = Color::srgb(0.15, 0.15, 0.2);

/// Hint under the name field
pub const HINT_TEXT: Color = Color::srgb(0.45, 0.45, 0.5);

/// Cream behind the main menu
pub const MENU_BACKGROUND: Color = Color::srgb(0.96, 0.92, 0.84);

/// Name entry box
pub const INPUT_BACKGROUND: Color = Color::WHITE;
/// Name entry border
pub const INPUT_BORDER: Color = Color::srgb(0.275, 0.400, 0.750);

/// White text for buttons
pub const BUTTON_TEXT: Color = Color::srgb(0.925, 0.925, 0.925);
/// #4666bf
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.275, 0.400, 0.750);
/// #6299d1
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.384, 0.600, 0.820);
/// #3d4999
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.239, 0.286, 0.600);
