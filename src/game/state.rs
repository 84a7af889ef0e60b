//! Match state - score, shots, and the lose condition.
//!
//! [`MatchState`] owns everything a match needs and advances it one fixed
//! tick at a time with [`MatchState::tick`]. It never touches the window,
//! audio or renderer directly: it consumes [`MatchInput`]s and answers with
//! [`MatchEvent`]s and [`DrawRequest`]s, so it runs headless in tests.
//!
//! Lose: any resting bubble's lower edge reaches the lose line.

use bevy::{prelude::*, window::PrimaryWindow};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    config::MatchConfig,
    grid::BubbleGrid,
    projectile::{ShotResolution, resolve_contact, step_flight},
    shooter::Shooter,
    view::{DrawKey, DrawRequest, TextTone, world_to_playfield},
};
use crate::{audio::SoundCue, menus::PlayerName, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<MatchInputQueue>();

    app.add_systems(OnEnter(Screen::Gameplay), start_match);
    app.add_systems(OnExit(Screen::Gameplay), end_match);

    app.add_systems(
        Update,
        record_match_input
            .in_set(MatchSystems::RecordInput)
            .run_if(in_state(Screen::Gameplay).and(resource_exists::<MatchState>)),
    );

    app.add_systems(
        FixedUpdate,
        run_match_tick.run_if(in_state(Screen::Gameplay).and(resource_exists::<MatchState>)),
    );
}

/// System sets for match systems that run every frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSystems {
    /// Turn window input into [`MatchInput`]s.
    RecordInput,
    /// Turn [`DrawRequest`]s into entities.
    Draw,
}

/// Input the match reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchInput {
    /// Pointer pressed at a playfield position.
    Aim(Vec2),
    /// Leave the game right away.
    Quit,
}

/// Something that happened during a tick.
///
/// Sounds, leaving and quitting are acted on by the app; the rest are only
/// logged there.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    /// A sound should start or stop.
    Sound(SoundCue),
    /// The shooter left the launch point.
    Launched { target: Vec2 },
    /// A cluster started popping.
    Popped { count: usize, points: u32 },
    /// The shot came to rest in the grid.
    Attached { position: Vec2 },
    /// The match just ended.
    GameOver { score: u32 },
    /// The player dismissed the game over screen.
    ReturnToMenu,
    /// The player asked to close the game.
    Quit,
}

/// Inputs recorded since the last tick.
#[derive(Resource, Debug, Default)]
pub struct MatchInputQueue(pub Vec<MatchInput>);

/// Everything one match owns.
#[derive(Resource, Debug)]
pub struct MatchState {
    pub config: MatchConfig,
    pub player_name: String,
    pub score: u32,
    pub game_over: bool,
    pub grid: BubbleGrid,
    pub shooter: Shooter,
    rng: StdRng,
}

impl MatchState {
    /// Start a match with the classic starting rows.
    pub fn new(config: MatchConfig, player_name: impl Into<String>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = BubbleGrid::with_initial_rows(&config, &mut rng);
        let shooter = Shooter::spawn(&config, &mut rng);
        Self::from_parts(config, player_name, grid, shooter, rng)
    }

    /// Start a match from a prepared grid and shooter.
    pub fn from_parts(
        config: MatchConfig,
        player_name: impl Into<String>,
        grid: BubbleGrid,
        shooter: Shooter,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            player_name: player_name.into(),
            score: 0,
            game_over: false,
            grid,
            shooter,
            rng,
        }
    }

    /// Advance the match by one fixed tick.
    ///
    /// Order: inputs, shot flight, pop animations, lose check.
    pub fn tick(&mut self, inputs: impl IntoIterator<Item = MatchInput>) -> Vec<MatchEvent> {
        let mut events = Vec::new();

        for input in inputs {
            match input {
                MatchInput::Quit => {
                    events.push(MatchEvent::Quit);
                    return events;
                }
                MatchInput::Aim(_) if self.game_over => {
                    info!("Leaving match of {} with score {}", self.player_name, self.score);
                    events.push(MatchEvent::Sound(SoundCue::StopGameOver));
                    events.push(MatchEvent::Sound(SoundCue::PlayBackgroundMusic));
                    events.push(MatchEvent::ReturnToMenu);
                    return events;
                }
                MatchInput::Aim(target) => {
                    if self.shooter.aim(target, &self.config) {
                        debug!("Launched {:?} shot toward {:?}", self.shooter.color, target);
                        events.push(MatchEvent::Launched { target });
                    }
                }
            }
        }

        if !self.game_over {
            self.advance_shot(&mut events);
        }

        self.grid.advance_pops(self.config.pop_step);

        if !self.game_over && self.grid.crosses_lose_line(&self.config) {
            self.finish(&mut events);
        }

        events
    }

    /// Fly the shot one step and settle it if it touched something.
    fn advance_shot(&mut self, events: &mut Vec<MatchEvent>) {
        let Some(contact) = step_flight(&mut self.shooter, &self.grid, &self.config) else {
            return;
        };

        match resolve_contact(&self.shooter, contact, &mut self.grid, &self.config) {
            ShotResolution::Popped { bubbles, color } => {
                let points = bubbles.len() as u32 * self.config.points_per_bubble;
                self.score += points;
                info!(
                    "Cluster popped: {} {:?} bubbles, +{} points (total: {})",
                    bubbles.len(),
                    color,
                    points,
                    self.score
                );
                events.push(MatchEvent::Sound(SoundCue::PlayPop));
                events.push(MatchEvent::Popped {
                    count: bubbles.len(),
                    points,
                });
            }
            ShotResolution::Attached { id, position } => {
                debug!("Bubble {:?} attached at {:?}", id, position);
                events.push(MatchEvent::Attached { position });
            }
            ShotResolution::NoSlot => {
                warn!(
                    "No free slot near {:?} with {} bubbles on the grid, ending match",
                    self.shooter.position,
                    self.grid.len()
                );
                self.finish(events);
            }
        }

        self.shooter = Shooter::spawn(&self.config, &mut self.rng);
    }

    /// Enter the terminal game over state. Only the first call has an effect.
    fn finish(&mut self, events: &mut Vec<MatchEvent>) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        info!("GAME OVER for {}! Final score: {}", self.player_name, self.score);

        events.push(MatchEvent::Sound(SoundCue::StopBackgroundMusic));
        events.push(MatchEvent::Sound(SoundCue::PlayGameOver));
        events.push(MatchEvent::GameOver { score: self.score });
    }

    /// Everything that should be on screen right now, back to front.
    pub fn draw_requests(&self) -> Vec<DrawRequest> {
        let config = &self.config;
        let mut requests = Vec::with_capacity(self.grid.len() + 6);
        requests.push(DrawRequest::Background);

        requests.push(DrawRequest::Text {
            key: DrawKey::Hud,
            text: format!("{} | Score: {}", self.player_name, self.score),
            position: Vec2::new(10.0, 15.0),
            tone: TextTone::Normal,
        });

        for bubble in self.grid.iter() {
            requests.push(DrawRequest::Sprite {
                key: DrawKey::Bubble(bubble.id),
                position: bubble.position,
                radius: config.radius,
                scale: bubble.scale(),
                color: bubble.color,
            });
        }

        requests.push(DrawRequest::Sprite {
            key: DrawKey::Shooter,
            position: self.shooter.position,
            radius: config.radius,
            scale: 1.0,
            color: self.shooter.color,
        });

        let lose_line = config.lose_line_y();
        requests.push(DrawRequest::Line {
            from: Vec2::new(0.0, lose_line),
            to: Vec2::new(config.width, lose_line),
        });

        if self.game_over {
            requests.push(DrawRequest::Overlay);
            requests.push(DrawRequest::Text {
                key: DrawKey::Banner,
                text: "GAME OVER\nClick to return to the menu".to_string(),
                position: Vec2::new(config.width / 2.0, config.height / 2.0),
                tone: TextTone::Alert,
            });
        }

        requests
    }
}

/// Create a fresh match when entering gameplay.
fn start_match(
    mut commands: Commands,
    config: Res<MatchConfig>,
    player_name: Res<PlayerName>,
    mut queue: ResMut<MatchInputQueue>,
    mut fixed_time: ResMut<Time<Fixed>>,
) {
    fixed_time.set_timestep_hz(config.tick_hz);
    queue.0.clear();

    let seed = rand::rng().random();
    let state = MatchState::new(config.clone(), player_name.0.clone(), seed);
    info!(
        "Match started for {} with {} bubbles",
        state.player_name,
        state.grid.len()
    );
    commands.insert_resource(state);
}

/// Drop the match when leaving gameplay.
fn end_match(mut commands: Commands, mut queue: ResMut<MatchInputQueue>) {
    queue.0.clear();
    commands.remove_resource::<MatchState>();
}

/// Record clicks (as playfield positions) and the quit key.
fn record_match_input(
    mouse_input: Res<ButtonInput<MouseButton>>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    state: Res<MatchState>,
    mut queue: ResMut<MatchInputQueue>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyQ) {
        queue.0.push(MatchInput::Quit);
    }

    if !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    // Get cursor position in world coordinates
    let Some(cursor_pos) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    else {
        return;
    };

    queue
        .0
        .push(MatchInput::Aim(world_to_playfield(cursor_pos, &state.config)));
}

/// Run one fixed tick and hand its events to the rest of the app.
fn run_match_tick(
    mut state: ResMut<MatchState>,
    mut queue: ResMut<MatchInputQueue>,
    mut sound_cues: MessageWriter<SoundCue>,
    mut next_screen: ResMut<NextState<Screen>>,
    mut app_exit: MessageWriter<AppExit>,
) {
    let inputs = std::mem::take(&mut queue.0);

    for event in state.tick(inputs) {
        match event {
            MatchEvent::Sound(cue) => {
                sound_cues.write(cue);
            }
            MatchEvent::ReturnToMenu => next_screen.set(Screen::Title),
            MatchEvent::Quit => {
                app_exit.write(AppExit::Success);
            }
            MatchEvent::Launched { target } => debug!("Shot launched toward {:?}", target),
            MatchEvent::Popped { count, points } => {
                debug!("{} bubbles popped for {} points", count, points);
            }
            MatchEvent::Attached { position } => debug!("Shot came to rest at {:?}", position),
            MatchEvent::GameOver { score } => debug!("Match ended with score {}", score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        bubble::{BubbleColor, PopState},
        shooter::ShotPhase,
    };

    fn state_with(grid: BubbleGrid, shooter_color: BubbleColor) -> MatchState {
        let config = MatchConfig::default();
        let shooter = Shooter::with_color(&config, shooter_color);
        MatchState::from_parts(config, "Tester", grid, shooter, StdRng::seed_from_u64(5))
    }

    /// Tick until the current shot resolves, collecting every event.
    fn fire(state: &mut MatchState, target: Vec2) -> Vec<MatchEvent> {
        let mut events = state.tick([MatchInput::Aim(target)]);
        for _ in 0..500 {
            if !state.shooter.is_flying() {
                return events;
            }
            events.extend(state.tick([]));
        }
        panic!("shot never resolved");
    }

    #[test]
    fn test_matching_pair_pops_for_twenty() {
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(186.0, 86.0), BubbleColor::Orange);
        let target = grid.insert(Vec2::new(234.0, 86.0), BubbleColor::Orange);
        let target_pos = grid.get(target).unwrap().position;
        let mut state = state_with(grid, BubbleColor::Orange);

        let events = fire(&mut state, target_pos);

        assert_eq!(state.score, 20);
        assert!(events.contains(&MatchEvent::Popped { count: 2, points: 20 }));
        assert!(events.contains(&MatchEvent::Sound(SoundCue::PlayPop)));
        assert_eq!(state.grid.len(), 2);
        assert!(
            state
                .grid
                .iter()
                .all(|b| matches!(b.state, PopState::Popping { .. }))
        );

        // The popped bubbles shrink away
        for _ in 0..10 {
            state.tick([]);
        }
        assert_eq!(state.grid.len(), 0);
        assert_eq!(state.shooter.position, state.config.launch_position());
    }

    #[test]
    fn test_other_color_attaches_without_score() {
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(210.0, 86.0), BubbleColor::White);
        let mut state = state_with(grid, BubbleColor::Black);

        let events = fire(&mut state, Vec2::new(210.0, 86.0));

        assert_eq!(state.score, 0);
        assert!(events.contains(&MatchEvent::Attached {
            position: Vec2::new(210.0, 130.0)
        }));
        assert_eq!(state.grid.len(), 2);

        let attached = state.grid.iter().last().unwrap();
        assert_eq!(attached.color, BubbleColor::Black);
        assert!(attached.is_resting());
        for other in state.grid.iter().filter(|b| b.id != attached.id) {
            assert!(other.position.distance(attached.position) >= state.config.contact_distance());
        }
    }

    #[test]
    fn test_lose_line_ends_match_once() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        grid.insert(
            Vec2::new(100.0, config.lose_line_y() - config.radius),
            BubbleColor::Gray,
        );
        let mut state = state_with(grid, BubbleColor::White);

        let events = state.tick([]);
        assert!(state.game_over);
        assert!(events.contains(&MatchEvent::GameOver { score: 0 }));
        assert!(events.contains(&MatchEvent::Sound(SoundCue::PlayGameOver)));
        assert!(events.contains(&MatchEvent::Sound(SoundCue::StopBackgroundMusic)));

        let events = state.tick([]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_aim_after_game_over_only_returns_to_menu() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(100.0, config.lose_line_y()), BubbleColor::Gray);
        let mut state = state_with(grid, BubbleColor::White);
        state.tick([]);
        assert!(state.game_over);

        let events = state.tick([MatchInput::Aim(Vec2::new(210.0, 100.0))]);

        assert_eq!(
            events,
            vec![
                MatchEvent::Sound(SoundCue::StopGameOver),
                MatchEvent::Sound(SoundCue::PlayBackgroundMusic),
                MatchEvent::ReturnToMenu,
            ]
        );
        assert!(!state.shooter.is_flying());
        assert_eq!(state.shooter.position, config.launch_position());
        assert_eq!(state.score, 0);
        assert_eq!(state.grid.len(), 1);
    }

    #[test]
    fn test_second_aim_ignored_while_flying() {
        let mut state = state_with(BubbleGrid::new(), BubbleColor::White);

        let events = state.tick([
            MatchInput::Aim(Vec2::new(210.0, 100.0)),
            MatchInput::Aim(Vec2::new(10.0, 100.0)),
        ]);

        let launches = events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Launched { .. }))
            .count();
        assert_eq!(launches, 1);
        assert!(state.shooter.is_flying());
    }

    #[test]
    fn test_shot_on_empty_grid_sticks_to_ceiling() {
        let mut state = state_with(BubbleGrid::new(), BubbleColor::White);

        let events = fire(&mut state, Vec2::new(210.0, 0.0));

        assert!(events.contains(&MatchEvent::Attached {
            position: Vec2::new(210.0, state.config.ceiling_y())
        }));
        assert_eq!(state.grid.len(), 1);
    }

    #[test]
    fn test_ceiling_hit_next_to_grid_keeps_score() {
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(36.0, 86.0), BubbleColor::White);
        let mut state = state_with(grid, BubbleColor::Black);
        let speed = state.config.shot_speed;
        state.shooter.position.x = 300.0;
        state.shooter.phase = ShotPhase::Flying {
            velocity: Vec2::new(0.0, -speed),
        };

        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(state.tick([]));
            if !state.shooter.is_flying() {
                break;
            }
        }

        assert!(events.contains(&MatchEvent::Attached {
            position: Vec2::new(80.0, 86.0)
        }));
        assert_eq!(state.score, 0);
        assert_eq!(state.grid.len(), 2);
        assert!(state.grid.iter().all(|b| b.is_resting()));
    }

    #[test]
    fn test_quit_stops_the_tick() {
        let mut state = state_with(BubbleGrid::new(), BubbleColor::White);

        let events = state.tick([MatchInput::Quit, MatchInput::Aim(Vec2::new(210.0, 100.0))]);

        assert_eq!(events, vec![MatchEvent::Quit]);
        assert!(!state.shooter.is_flying());
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = MatchState::new(MatchConfig::default(), "A", 1234);
        let b = MatchState::new(MatchConfig::default(), "B", 1234);

        let colors = |s: &MatchState| s.grid.iter().map(|b| b.color).collect::<Vec<_>>();
        assert_eq!(colors(&a), colors(&b));
        assert_eq!(a.shooter.color, b.shooter.color);
    }

    #[test]
    fn test_draw_requests_show_hud_and_overlay() {
        let config = MatchConfig::default();
        let mut grid = BubbleGrid::new();
        grid.insert(Vec2::new(100.0, 100.0), BubbleColor::White);
        let mut state = state_with(grid, BubbleColor::Black);
        state.score = 30;

        let requests = state.draw_requests();
        assert!(requests.iter().any(|r| matches!(
            r,
            DrawRequest::Text { key: DrawKey::Hud, text, .. } if text == "Tester | Score: 30"
        )));
        let cats = requests
            .iter()
            .filter(|r| matches!(r, DrawRequest::Sprite { .. }))
            .count();
        assert_eq!(cats, 2);
        assert_eq!(requests.first(), Some(&DrawRequest::Background));
        assert!(!requests.contains(&DrawRequest::Overlay));

        state.grid.insert(Vec2::new(200.0, config.lose_line_y()), BubbleColor::White);
        state.tick([]);
        let requests = state.draw_requests();
        assert!(requests.contains(&DrawRequest::Overlay));
        assert!(requests.iter().any(|r| matches!(
            r,
            DrawRequest::Text { key: DrawKey::Banner, .. }
        )));
    }
}
