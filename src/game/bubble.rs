//! Cat bubbles - the pieces of the game.
//!
//! A bubble is a coloured circle that either rests in the grid or flies as
//! the shot. Popped bubbles shrink for a few ticks before they are removed.

use bevy::prelude::*;
use rand::Rng;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.register_type::<PopState>();
    app.register_type::<BubbleId>();
}

/// The cat coats a bubble can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum BubbleColor {
    #[default]
    White,
    Black,
    Orange,
    Gray,
}

impl BubbleColor {
    /// Get all possible bubble colors.
    pub const ALL: [BubbleColor; 4] = [
        BubbleColor::White,
        BubbleColor::Black,
        BubbleColor::Orange,
        BubbleColor::Gray,
    ];

    /// Get the actual color for rendering.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::White => Color::srgb(0.97, 0.96, 0.93),
            BubbleColor::Black => Color::srgb(0.15, 0.15, 0.17),
            BubbleColor::Orange => Color::srgb(0.93, 0.55, 0.2),
            BubbleColor::Gray => Color::srgb(0.6, 0.6, 0.63),
        }
    }

    /// Lowercase name, as used in asset file names.
    pub fn name(self) -> &'static str {
        match self {
            BubbleColor::White => "white",
            BubbleColor::Black => "black",
            BubbleColor::Orange => "orange",
            BubbleColor::Gray => "gray",
        }
    }

    /// Pick a color uniformly from the palette.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Stable identifier of a bubble in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct BubbleId(pub u32);

/// Animation state of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Default)]
pub enum PopState {
    /// Resting (or flying) at full size.
    #[default]
    Idle,
    /// Shrinking away; `scale` runs from 1.0 down to 0.0.
    Popping { scale: f32 },
}

/// Scales this close to zero count as fully shrunk.
const SCALE_EPSILON: f32 = 1e-4;

/// A bubble in the grid.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Bubble {
    pub id: BubbleId,
    pub position: Vec2,
    pub color: BubbleColor,
    pub state: PopState,
}

impl Bubble {
    pub fn new(id: BubbleId, position: Vec2, color: BubbleColor) -> Self {
        Self {
            id,
            position,
            color,
            state: PopState::Idle,
        }
    }

    /// A resting bubble takes part in collisions, adjacency and the lose check.
    pub fn is_resting(&self) -> bool {
        matches!(self.state, PopState::Idle)
    }

    /// Current draw scale.
    pub fn scale(&self) -> f32 {
        match self.state {
            PopState::Idle => 1.0,
            PopState::Popping { scale } => scale,
        }
    }

    /// Start the pop animation. Popping an already popping bubble is a no-op.
    pub fn pop(&mut self) {
        if self.is_resting() {
            self.state = PopState::Popping { scale: 1.0 };
        }
    }

    /// Advance the pop animation by one tick.
    ///
    /// Returns `true` once the bubble has shrunk away and should be removed.
    /// Idle bubbles never report removal.
    pub fn advance(&mut self, step: f32) -> bool {
        let PopState::Popping { scale } = &mut self.state else {
            return false;
        };

        *scale -= step;
        if *scale <= SCALE_EPSILON {
            *scale = 0.0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn bubble() -> Bubble {
        Bubble::new(BubbleId(0), Vec2::new(50.0, 80.0), BubbleColor::Orange)
    }

    #[test]
    fn test_idle_bubble_never_removed() {
        let mut b = bubble();
        for _ in 0..20 {
            assert!(!b.advance(0.1));
        }
        assert_eq!(b.scale(), 1.0);
    }

    #[test]
    fn test_pop_removes_after_ten_steps() {
        let mut b = bubble();
        b.pop();
        assert_eq!(b.scale(), 1.0);

        for step in 1..10 {
            assert!(!b.advance(0.1), "removed early at step {step}");
            assert!((0.0..=1.0).contains(&b.scale()));
        }
        assert!(b.advance(0.1));
        assert_eq!(b.scale(), 0.0);
    }

    #[test]
    fn test_pop_twice_keeps_progress() {
        let mut b = bubble();
        b.pop();
        b.advance(0.1);
        b.pop();
        assert!((b.scale() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_random_color_covers_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(BubbleColor::random(&mut rng));
        }
        assert_eq!(seen.len(), BubbleColor::ALL.len());
    }
}
