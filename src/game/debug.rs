//! Debug visualization for the bubble grid.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - Playfield walls and ceiling
//! - Every free slot a shot could attach to
//! - Adjacency links between same-colored neighbours

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    config::MatchConfig,
    state::MatchState,
    view::playfield_to_world,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugGridVisible>();

    // Toggle debug with 'D' key
    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    // Draw debug grid when visible
    app.add_systems(
        Update,
        draw_debug_grid.run_if(
            in_state(Screen::Gameplay)
                .and(resource_exists::<MatchState>)
                .and(debug_visible),
        ),
    );
}

/// Resource to track if debug visualization is visible.
#[derive(Resource, Default)]
pub struct DebugGridVisible(pub bool);

fn debug_visible(debug: Res<DebugGridVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugGridVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug grid: {}", state);
}

/// Draw the debug grid using Bevy's Gizmos.
fn draw_debug_grid(mut gizmos: Gizmos, state: Res<MatchState>) {
    let config = &state.config;
    let grid = &state.grid;

    draw_walls(&mut gizmos, config);

    // Candidate attach slots
    for slot in grid.free_slots(config) {
        gizmos.circle_2d(
            Isometry2d::from_translation(playfield_to_world(slot, config)),
            config.radius,
            css::LIMEGREEN.with_alpha(0.35),
        );
    }

    // Same-colored adjacency, drawn once per pair
    for bubble in grid.resting() {
        for neighbor in grid.neighbors_of(bubble.id, config) {
            if neighbor < bubble.id {
                continue;
            }
            if let Some(other) = grid.get(neighbor) {
                gizmos.line_2d(
                    playfield_to_world(bubble.position, config),
                    playfield_to_world(other.position, config),
                    css::AQUA.with_alpha(0.8),
                );
            }
        }
    }

    // Where the current shot would rest if it stopped now
    if let Some(slot) = grid.nearest_free_slot(state.shooter.position, config) {
        gizmos.circle_2d(
            Isometry2d::from_translation(playfield_to_world(slot, config)),
            config.radius * 0.5,
            css::GOLD,
        );
    }
}

/// Draw the walls and the ceiling the shot attaches to.
fn draw_walls(gizmos: &mut Gizmos, config: &MatchConfig) {
    let wall_color = css::ORANGE.with_alpha(0.8);
    let top = config.hud_height;
    let bottom = config.height;

    // Left wall
    gizmos.line_2d(
        playfield_to_world(Vec2::new(0.0, top), config),
        playfield_to_world(Vec2::new(0.0, bottom), config),
        wall_color,
    );

    // Right wall
    gizmos.line_2d(
        playfield_to_world(Vec2::new(config.width, top), config),
        playfield_to_world(Vec2::new(config.width, bottom), config),
        wall_color,
    );

    // Top wall
    gizmos.line_2d(
        playfield_to_world(Vec2::new(0.0, top), config),
        playfield_to_world(Vec2::new(config.width, top), config),
        wall_color,
    );
}
