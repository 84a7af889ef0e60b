//! Cat sprites and background images.
//!
//! Every image is optional. A file that fails to load is drawn with a flat
//! fallback instead: a coloured circle for a cat, a plain colour for a
//! background.

use std::collections::HashMap;

use bevy::{asset::LoadState, prelude::*};

use crate::game::BubbleColor;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ImageAssets>();
}

/// Handles for every image the game draws.
#[derive(Resource, Debug)]
pub struct ImageAssets {
    cats: HashMap<BubbleColor, Handle<Image>>,
    pub menu_background: Handle<Image>,
    pub game_background: Handle<Image>,
    pub game_over_background: Handle<Image>,
}

impl FromWorld for ImageAssets {
    fn from_world(world: &mut World) -> Self {
        let asset_server = world.resource::<AssetServer>();
        let cats = BubbleColor::ALL
            .into_iter()
            .map(|color| (color, asset_server.load(cat_path(color))))
            .collect();

        Self {
            cats,
            menu_background: asset_server.load("images/backgrounds/menu.png"),
            game_background: asset_server.load("images/backgrounds/game.png"),
            game_over_background: asset_server.load("images/backgrounds/game_over.png"),
        }
    }
}

impl ImageAssets {
    /// The cat sprite for a bubble color.
    pub fn cat(&self, color: BubbleColor) -> Option<&Handle<Image>> {
        self.cats.get(&color)
    }
}

fn cat_path(color: BubbleColor) -> String {
    format!("images/cats/{}.png", color.name())
}

/// Whether an image can be drawn. Images still loading count as drawable;
/// only a failed load switches to the fallback.
pub fn is_drawable(asset_server: &AssetServer, handle: &Handle<Image>) -> bool {
    !matches!(asset_server.load_state(handle.id()), LoadState::Failed(_))
}
