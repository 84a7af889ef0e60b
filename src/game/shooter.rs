//! The shooter - the single bubble the player controls.
//!
//! A shooter waits at the launch point until the player aims, then flies in a
//! straight line until it hits the grid or the ceiling.

use bevy::prelude::*;
use rand::Rng;

use super::{bubble::BubbleColor, config::MatchConfig};

/// Where the shooter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum ShotPhase {
    /// Waiting at the launch point for an aim input.
    #[default]
    Idle,
    /// In flight with a constant-speed velocity.
    Flying { velocity: Vec2 },
}

/// The in-flight (or loaded) bubble.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Shooter {
    pub position: Vec2,
    pub color: BubbleColor,
    pub phase: ShotPhase,
}

impl Shooter {
    /// A fresh shooter at the launch point with a random color.
    pub fn spawn(config: &MatchConfig, rng: &mut impl Rng) -> Self {
        Self::with_color(config, BubbleColor::random(rng))
    }

    /// A fresh shooter at the launch point with the given color.
    pub fn with_color(config: &MatchConfig, color: BubbleColor) -> Self {
        Self {
            position: config.launch_position(),
            color,
            phase: ShotPhase::Idle,
        }
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.phase, ShotPhase::Flying { .. })
    }

    /// Launch toward `target`.
    ///
    /// Only an idle shooter can be launched. The direction always points at
    /// least `min_upward` up so every shot reaches a bubble or the ceiling.
    /// Returns whether the shot was launched.
    pub fn aim(&mut self, target: Vec2, config: &MatchConfig) -> bool {
        if self.is_flying() {
            return false;
        }

        let Some(direction) = launch_direction(self.position, target, config.min_upward) else {
            return false;
        };

        self.phase = ShotPhase::Flying {
            velocity: direction * config.shot_speed,
        };
        true
    }
}

/// Normalized direction from `from` to `target`, clamped to point upward.
///
/// Playfield y grows downward, so "up" is negative y. Returns `None` when the
/// target sits on the launch point.
fn launch_direction(from: Vec2, target: Vec2, min_upward: f32) -> Option<Vec2> {
    let mut direction = (target - from).try_normalize()?;

    // Ensure we're aiming upward (not down)
    if direction.y > -min_upward {
        direction.y = -min_upward;
        direction = direction.normalize_or_zero();
    }

    (direction != Vec2::ZERO).then_some(direction)
}
