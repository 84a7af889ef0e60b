//! The bubble grid that holds every resting bubble.
//!
//! There are no rows or columns here: adjacency is purely geometric. Two
//! bubbles are neighbours when their centres are closer than
//! `2 * radius + epsilon`, and a new bubble may rest on any of the eight
//! slots around an existing one as long as it overlaps nothing.

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::{Bubble, BubbleColor, BubbleId},
    config::MatchConfig,
};

/// All bubbles of a match, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct BubbleGrid {
    bubbles: Vec<Bubble>,
    next_id: u32,
}

impl BubbleGrid {
    /// Create a new empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the starting rows with random colors.
    pub fn with_initial_rows(config: &MatchConfig, rng: &mut impl Rng) -> Self {
        let mut grid = Self::new();
        for row in 0..config.initial_rows {
            for col in 0..config.initial_columns {
                let position = Vec2::new(
                    config.grid_margin + col as f32 * config.column_spacing,
                    config.hud_height + config.grid_margin + row as f32 * config.row_spacing,
                );
                grid.insert(position, BubbleColor::random(rng));
            }
        }
        grid
    }

    /// Add a resting bubble and return its id.
    pub fn insert(&mut self, position: Vec2, color: BubbleColor) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.bubbles.push(Bubble::new(id, position, color));
        id
    }

    /// Get a bubble by id.
    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Get a bubble by id, mutably.
    pub fn get_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    /// Get the number of bubbles in the grid, popping ones included.
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    /// Iterate over all bubbles, popping ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    /// Iterate over bubbles that are not popping.
    pub fn resting(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter().filter(|b| b.is_resting())
    }

    /// Advance every pop animation and drop the bubbles that finished.
    ///
    /// Returns how many bubbles were removed.
    pub fn advance_pops(&mut self, step: f32) -> usize {
        let before = self.bubbles.len();
        self.bubbles.retain_mut(|b| !b.advance(step));
        before - self.bubbles.len()
    }

    /// Resting bubbles of the same color within adjacency distance of `id`.
    ///
    /// The query bubble itself is never part of the result. Filtering on color
    /// here keeps every cluster monochrome.
    pub fn neighbors_of(&self, id: BubbleId, config: &MatchConfig) -> Vec<BubbleId> {
        let Some(bubble) = self.get(id) else {
            return Vec::new();
        };
        let reach = config.adjacency_distance();

        self.resting()
            .filter(|other| {
                other.id != id
                    && other.color == bubble.color
                    && other.position.distance(bubble.position) < reach
            })
            .map(|other| other.id)
            .collect()
    }

    /// Whether a bubble centred at `position` would overlap any bubble.
    pub fn overlaps(&self, position: Vec2, config: &MatchConfig) -> bool {
        let contact = config.contact_distance();
        self.bubbles
            .iter()
            .any(|b| b.position.distance(position) < contact)
    }

    /// Whether `position` is a legal resting place inside the playfield.
    fn in_playfield(position: Vec2, config: &MatchConfig) -> bool {
        position.x >= config.min_x()
            && position.x <= config.max_x()
            && position.y >= config.ceiling_y()
    }

    /// Every empty slot next to a resting bubble.
    ///
    /// Candidates sit at the eight `{-2r, 0, +2r}` offsets around each resting
    /// bubble; those outside the playfield or overlapping a bubble are dropped.
    pub fn free_slots(&self, config: &MatchConfig) -> Vec<Vec2> {
        let step = config.contact_distance();
        let mut slots: Vec<Vec2> = Vec::new();

        for bubble in self.resting() {
            for dx in [-step, 0.0, step] {
                for dy in [-step, 0.0, step] {
                    if dx == 0.0 && dy == 0.0 {
                        continue;
                    }
                    let candidate = bubble.position + Vec2::new(dx, dy);
                    if !Self::in_playfield(candidate, config) || self.overlaps(candidate, config) {
                        continue;
                    }
                    if !slots.contains(&candidate) {
                        slots.push(candidate);
                    }
                }
            }
        }

        slots
    }

    /// The free slot closest to `point`, or `None` when the grid offers none.
    pub fn nearest_free_slot(&self, point: Vec2, config: &MatchConfig) -> Option<Vec2> {
        self.free_slots(config).into_iter().min_by(|a, b| {
            a.distance_squared(point)
                .total_cmp(&b.distance_squared(point))
        })
    }

    /// Whether any resting bubble's lower edge has reached the lose line.
    pub fn crosses_lose_line(&self, config: &MatchConfig) -> bool {
        let lose_line = config.lose_line_y();
        self.resting()
            .any(|b| b.position.y + config.radius >= lose_line)
    }
}
