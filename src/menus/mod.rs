//! The game's menus and transitions between them.

mod main;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Menu>();
    app.init_resource::<PlayerName>();

    app.add_plugins(main::plugin);
}

#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Menu {
    #[default]
    None,
    Main,
}

/// The name shown in the HUD, chosen on the main menu.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerName(pub String);

impl PlayerName {
    /// Trim the raw input and reject names that end up empty.
    pub fn validated(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_trims_whitespace() {
        assert_eq!(
            PlayerName::validated("  Mittens "),
            Some(PlayerName("Mittens".to_string()))
        );
    }

    #[test]
    fn test_validated_rejects_blank_names() {
        assert_eq!(PlayerName::validated(""), None);
        assert_eq!(PlayerName::validated("   "), None);
    }
}
