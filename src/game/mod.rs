//! The main game module for the bubble shooter.
//!
//! This module contains all the gameplay logic including:
//! - Bubble pieces and their pop animation
//! - The geometric bubble grid (adjacency, free slots)
//! - Cluster detection
//! - Shooter and projectile flight
//! - The per-tick match controller
//! - Drawing the match

mod bubble;
mod cluster;
mod config;
mod debug;
mod grid;
mod projectile;
mod shooter;
mod state;
mod view;

use bevy::prelude::*;

pub use bubble::BubbleColor;
pub use config::MatchConfig;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        config::plugin,
        bubble::plugin,
        state::plugin,
        view::plugin,
        debug::plugin,
    ));

    app.configure_sets(
        Update,
        (state::MatchSystems::RecordInput, state::MatchSystems::Draw).chain(),
    );
}
