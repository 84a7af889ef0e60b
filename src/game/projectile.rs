//! Projectile flight - moving the shot and resolving where it ends up.
//!
//! The shot travels in a straight line, bouncing off the side walls, until it
//! touches a resting bubble or the ceiling. Touching a matching cluster pops
//! it; anything else attaches the shot to the grid.

use bevy::prelude::*;

use super::{
    bubble::{BubbleColor, BubbleId},
    cluster::find_cluster,
    config::MatchConfig,
    grid::BubbleGrid,
    shooter::{ShotPhase, Shooter},
};

/// What the shot touched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// A resting bubble within contact distance.
    Bubble(BubbleId),
    /// The top of the playfield.
    Ceiling,
}

/// How a finished shot changed the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ShotResolution {
    /// The touched cluster started popping.
    Popped {
        bubbles: Vec<BubbleId>,
        color: BubbleColor,
    },
    /// The shot became a resting bubble.
    Attached { id: BubbleId, position: Vec2 },
    /// The grid has no room left near the shot.
    NoSlot,
}

/// Move a flying shooter one tick and report what it touched.
///
/// Idle shooters are left alone.
pub fn step_flight(
    shooter: &mut Shooter,
    grid: &BubbleGrid,
    config: &MatchConfig,
) -> Option<Contact> {
    let ShotPhase::Flying { velocity } = &mut shooter.phase else {
        return None;
    };

    shooter.position += *velocity;

    // Left wall bounce
    if shooter.position.x <= config.min_x() {
        shooter.position.x = config.min_x();
        velocity.x = velocity.x.abs();
    }

    // Right wall bounce
    if shooter.position.x >= config.max_x() {
        shooter.position.x = config.max_x();
        velocity.x = -velocity.x.abs();
    }

    if let Some(hit) = nearest_contact(shooter.position, grid, config) {
        return Some(Contact::Bubble(hit));
    }

    if shooter.position.y <= config.ceiling_y() {
        return Some(Contact::Ceiling);
    }

    None
}

/// The resting bubble the shot touches, nearest centre first.
fn nearest_contact(position: Vec2, grid: &BubbleGrid, config: &MatchConfig) -> Option<BubbleId> {
    let contact = config.contact_distance();

    grid.resting()
        .map(|b| (b.id, b.position.distance(position)))
        .filter(|(_, distance)| *distance < contact)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Apply the outcome of a contact to the grid.
///
/// A bubble contact pops the touched cluster when it is large enough and
/// matches the shot's color. Every other case attaches the shot at the free
/// slot nearest to where it stopped.
pub fn resolve_contact(
    shooter: &Shooter,
    contact: Contact,
    grid: &mut BubbleGrid,
    config: &MatchConfig,
) -> ShotResolution {
    if let Contact::Bubble(hit) = contact
        && let Some(hit_color) = grid.get(hit).map(|b| b.color)
    {
        let cluster = find_cluster(hit, grid, config);
        if cluster.len() >= config.min_cluster && shooter.color == hit_color {
            for id in &cluster {
                if let Some(bubble) = grid.get_mut(*id) {
                    bubble.pop();
                }
            }
            return ShotResolution::Popped {
                bubbles: cluster,
                color: hit_color,
            };
        }
    }

    attach(shooter, grid, config)
}

/// Rest the shot at the free slot nearest to its current position.
fn attach(shooter: &Shooter, grid: &mut BubbleGrid, config: &MatchConfig) -> ShotResolution {
    let position = match grid.nearest_free_slot(shooter.position, config) {
        Some(slot) => slot,
        // Nothing to lean on: the shot sticks to the ceiling where it is
        None if grid.resting().next().is_none() => Vec2::new(
            shooter.position.x.clamp(config.min_x(), config.max_x()),
            config.ceiling_y(),
        ),
        None => return ShotResolution::NoSlot,
    };

    if grid.overlaps(position, config) {
        return ShotResolution::NoSlot;
    }

    let id = grid.insert(position, shooter.color);
    ShotResolution::Attached { id, position }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flying(position: Vec2, velocity: Vec2, color: BubbleColor) -> Shooter {
        Shooter {
            position,
            color,
            phase: ShotPhase::Flying { velocity },
        }
    }

    #[test]
    fn test_idle_shooter_does_not_move() {
        let config = MatchConfig::default();
        let grid = BubbleGrid::new();
        let mut shooter = Shooter::with_color(&config, BubbleColor::White);

        assert_eq!(step_flight(&mut shooter, &grid, &config), None);
        assert_eq!(shooter.position, config.launch_position());
    }

    #[test]
    fn test_wall_bounce_inverts_horizontal_velocity() {
        let config = MatchConfig::default();
        let grid = BubbleGrid::new();
        let mut shooter = flying(
            Vec2::new(config.min_x() + 3.0, 400.0),
            Vec2::new(-5.0, -5.0),
            BubbleColor::White,
        );

        assert_eq!(step_flight(&mut shooter, &grid, &config), None);
        assert_eq!(shooter.position.x, config.min_x());
        assert_eq!(shooter.phase, ShotPhase::Flying { velocity: Vec2::new(5.0, -5.0) });

        let mut shooter = flying(
            Vec2::new(config.max_x() - 3.0, 400.0),
            Vec2::new(5.0, -5.0),
            BubbleColor::White,
        );
        step_flight(&mut shooter, &grid, &config);
        assert_eq!(shooter.phase, ShotPhase::Flying { velocity: Vec2::new(-5.0, -5.0) });
    }

    #[test]
    fn test_ceiling_contact() {
        let config = MatchConfig::default();
        let grid = BubbleGrid::new();
        let mut shooter = flying(
            Vec2::new(200.0, config.ceiling_y() + 3.0),
            Vec2::new(0.0, -7.0),
            BubbleColor::White,
        );

        assert_eq!(step_flight(&mut shooter, &grid, &config), Some(Contact::Ceiling));
    }

    #[test]
    fn test_nearest_bubble_wins_contact() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        // Both are in reach; the first in grid order is the farther one
        grid.insert(Vec2::new(180.0, 200.0), BubbleColor::White);
        let near = grid.insert(Vec2::new(220.0, 200.0), BubbleColor::Black);
        let mut shooter = flying(
            Vec2::new(205.0, 240.0),
            Vec2::new(0.0, -7.0),
            BubbleColor::Gray,
        );

        assert_eq!(
            step_flight(&mut shooter, &grid, &config),
            Some(Contact::Bubble(near))
        );
    }

    #[test]
    fn test_popping_bubbles_are_not_hit() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        let id = grid.insert(Vec2::new(200.0, 200.0), BubbleColor::White);
        grid.get_mut(id).unwrap().pop();
        let mut shooter = flying(
            Vec2::new(200.0, 230.0),
            Vec2::new(0.0, -7.0),
            BubbleColor::White,
        );

        assert_eq!(step_flight(&mut shooter, &grid, &config), None);
    }

    #[test]
    fn test_matching_pair_pops() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        let a = grid.insert(Vec2::new(100.0, 100.0), BubbleColor::Orange);
        let b = grid.insert(Vec2::new(148.0, 100.0), BubbleColor::Orange);
        let shooter = Shooter {
            position: Vec2::new(148.0, 140.0),
            color: BubbleColor::Orange,
            phase: ShotPhase::Idle,
        };

        let resolution = resolve_contact(&shooter, Contact::Bubble(b), &mut grid, &config);
        let ShotResolution::Popped { mut bubbles, color } = resolution else {
            panic!("expected a pop, got {resolution:?}");
        };
        bubbles.sort();
        assert_eq!(bubbles, vec![a, b]);
        assert_eq!(color, BubbleColor::Orange);
        assert!(grid.iter().all(|b| !b.is_resting()));
    }

    #[test]
    fn test_matching_single_attaches() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        let lone = grid.insert(Vec2::new(200.0, 100.0), BubbleColor::Orange);
        let shooter = Shooter {
            position: Vec2::new(200.0, 140.0),
            color: BubbleColor::Orange,
            phase: ShotPhase::Idle,
        };

        let resolution = resolve_contact(&shooter, Contact::Bubble(lone), &mut grid, &config);
        assert_eq!(
            resolution,
            ShotResolution::Attached {
                id: BubbleId(1),
                position: Vec2::new(200.0, 144.0),
            }
        );
        assert!(grid.get(lone).unwrap().is_resting());
    }

    #[test]
    fn test_ceiling_on_empty_grid_sticks_in_place() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        let shooter = Shooter {
            position: Vec2::new(150.0, config.ceiling_y() - 2.0),
            color: BubbleColor::Gray,
            phase: ShotPhase::Idle,
        };

        let resolution = resolve_contact(&shooter, Contact::Ceiling, &mut grid, &config);
        assert_eq!(
            resolution,
            ShotResolution::Attached {
                id: BubbleId(0),
                position: Vec2::new(150.0, config.ceiling_y()),
            }
        );
    }

    #[test]
    fn test_ceiling_hit_attaches_next_to_resting_bubbles() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(36.0, 86.0), BubbleColor::White);
        let mut shooter = flying(
            Vec2::new(300.0, config.launch_position().y),
            Vec2::new(0.0, -config.shot_speed),
            BubbleColor::Black,
        );

        let mut contact = None;
        for _ in 0..200 {
            contact = step_flight(&mut shooter, &grid, &config);
            if contact.is_some() {
                break;
            }
        }
        assert_eq!(contact, Some(Contact::Ceiling));

        let resolution = resolve_contact(&shooter, Contact::Ceiling, &mut grid, &config);
        assert_eq!(
            resolution,
            ShotResolution::Attached {
                id: BubbleId(1),
                position: Vec2::new(80.0, 86.0),
            }
        );
        assert_eq!(grid.len(), 2);
        let [first, second] = [grid.get(BubbleId(0)).unwrap(), grid.get(BubbleId(1)).unwrap()];
        assert!(first.position.distance(second.position) >= config.contact_distance());
    }

    #[test]
    fn test_blocked_ceiling_reports_no_slot() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        // Only a popping bubble left, sitting right where the shot would stick
        let id = grid.insert(Vec2::new(150.0, config.ceiling_y()), BubbleColor::White);
        grid.get_mut(id).unwrap().pop();
        let shooter = Shooter {
            position: Vec2::new(150.0, config.ceiling_y() - 2.0),
            color: BubbleColor::Black,
            phase: ShotPhase::Idle,
        };

        assert_eq!(
            resolve_contact(&shooter, Contact::Ceiling, &mut grid, &config),
            ShotResolution::NoSlot
        );
        assert_eq!(grid.len(), 1);
    }
}
