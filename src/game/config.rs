//! Match configuration - every tunable constant of a match in one resource.
//!
//! Defaults reproduce the classic layout. An optional JSON override can be
//! dropped into the user's config directory; any field left out keeps its
//! default value.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<MatchConfig>();
    app.insert_resource(MatchConfig::load());
}

/// Tunable constants for a match.
///
/// All positions are in playfield coordinates: origin at the top-left corner,
/// y growing downward.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct MatchConfig {
    /// Playfield width in pixels.
    pub width: f32,
    /// Playfield height in pixels.
    pub height: f32,
    /// Radius of every bubble.
    pub radius: f32,
    /// Height of the score strip at the top; nothing rests above it.
    pub hud_height: f32,
    /// Distance of the lose line from the bottom edge.
    pub lose_line_margin: f32,
    /// Distance of the launch point from the bottom edge.
    pub launch_margin: f32,
    /// Rows filled when a match starts.
    pub initial_rows: u32,
    /// Bubbles per row when a match starts.
    pub initial_columns: u32,
    /// Horizontal distance between bubble centres in the starting layout.
    pub column_spacing: f32,
    /// Vertical distance between bubble centres in the starting layout.
    pub row_spacing: f32,
    /// Offset of the first bubble from the left edge and from the HUD.
    pub grid_margin: f32,
    /// Distance the shot travels per tick.
    pub shot_speed: f32,
    /// Fixed simulation rate.
    pub tick_hz: f64,
    /// Slack added to `2 * radius` when deciding adjacency.
    pub adjacency_epsilon: f32,
    /// Scale lost per tick by a popping bubble.
    pub pop_step: f32,
    /// Smallest cluster that pops.
    pub min_cluster: usize,
    /// Score per popped bubble.
    pub points_per_bubble: u32,
    /// Smallest upward component a launch direction may have.
    pub min_upward: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 640.0,
            radius: 22.0,
            hud_height: 50.0,
            lose_line_margin: 120.0,
            launch_margin: 40.0,
            initial_rows: 5,
            initial_columns: 8,
            column_spacing: 48.0,
            // 2 * radius keeps the starting rows from overlapping
            row_spacing: 44.0,
            grid_margin: 36.0,
            shot_speed: 7.0,
            tick_hz: 60.0,
            adjacency_epsilon: 5.0,
            pop_step: 0.1,
            min_cluster: 2,
            points_per_bubble: 10,
            min_upward: 0.1,
        }
    }
}

impl MatchConfig {
    /// Centre-to-centre distance at which two bubbles touch.
    pub fn contact_distance(&self) -> f32 {
        self.radius * 2.0
    }

    /// Centre-to-centre distance under which two bubbles count as neighbours.
    pub fn adjacency_distance(&self) -> f32 {
        self.contact_distance() + self.adjacency_epsilon
    }

    /// Where every new shot waits for input.
    pub fn launch_position(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - self.launch_margin)
    }

    /// Lowest y a bubble centre may have while still touching the ceiling.
    pub fn ceiling_y(&self) -> f32 {
        self.hud_height + self.radius
    }

    /// Any resting bubble whose lower edge reaches this y ends the match.
    pub fn lose_line_y(&self) -> f32 {
        self.height - self.lose_line_margin
    }

    /// Left-most x a bubble centre may take.
    pub fn min_x(&self) -> f32 {
        self.radius
    }

    /// Right-most x a bubble centre may take.
    pub fn max_x(&self) -> f32 {
        self.width - self.radius
    }

    /// Get the file path for an optional config override.
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cat_bubbles").join("match.json"))
    }

    /// Load the config, applying the user's override file if there is one.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!("Loaded match config override from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse match config {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read match config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
