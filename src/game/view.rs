//! Drawing the match - turning [`DrawRequest`]s into Bevy entities.
//!
//! The match describes what should be on screen each frame; this module keeps
//! one entity per [`DrawKey`] alive, updates it in place, and despawns keys
//! that are no longer requested. Cats and backgrounds use their images when
//! those loaded, and flat shapes when they did not.

use bevy::{prelude::*, sprite::Anchor};
use std::collections::HashMap;

use super::{
    bubble::{BubbleColor, BubbleId},
    config::MatchConfig,
    state::{MatchState, MatchSystems},
};
use crate::{
    images::{ImageAssets, is_drawable},
    screens::Screen,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Gameplay), load_bubble_materials);
    app.add_systems(
        Update,
        draw_match
            .in_set(MatchSystems::Draw)
            .run_if(in_state(Screen::Gameplay).and(resource_exists::<MatchState>)),
    );
}

/// Identity of something drawn across frames.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKey {
    Bubble(BubbleId),
    Shooter,
    Background,
    Hud,
    Banner,
    Overlay,
}

/// How a piece of text should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTone {
    Normal,
    Alert,
}

impl TextTone {
    fn color(self) -> Color {
        match self {
            TextTone::Normal => Color::srgb(0.0, 0.0, 0.0),
            TextTone::Alert => Color::srgb(0.78, 0.0, 0.0),
        }
    }
}

/// One thing the match wants on screen. Positions are playfield coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawRequest {
    /// The playfield backdrop.
    Background,
    /// A cat of `color`, `radius` wide at full `scale`.
    Sprite {
        key: DrawKey,
        position: Vec2,
        radius: f32,
        scale: f32,
        color: BubbleColor,
    },
    Text {
        key: DrawKey,
        text: String,
        position: Vec2,
        tone: TextTone,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
    /// Cover the whole playfield with the game over picture.
    Overlay,
}

/// How a keyed entity is drawn. A change of look respawns the entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum Look {
    Cat(BubbleColor),
    Circle(BubbleColor),
    Image,
    Flat,
}

impl Look {
    fn for_bubble(color: BubbleColor, image_drawable: bool) -> Self {
        if image_drawable {
            Look::Cat(color)
        } else {
            Look::Circle(color)
        }
    }

    fn for_background(image_drawable: bool) -> Self {
        if image_drawable { Look::Image } else { Look::Flat }
    }
}

/// Background behind the playfield.
const BACKGROUND: Color = Color::srgb(0.988, 0.98, 0.94);
const LINE_COLOR: Color = Color::srgb(0.0, 0.0, 0.0);
const OVERLAY_COLOR: Color = Color::srgba(0.98, 0.9, 0.9, 0.85);

const BACKGROUND_Z: f32 = -1.0;
const BUBBLE_Z: f32 = 0.0;
const SHOOTER_Z: f32 = 1.0;
const OVERLAY_Z: f32 = 5.0;
const TEXT_Z: f32 = 6.0;

/// Convert a playfield point (top-left origin, y down) to world space.
pub fn playfield_to_world(point: Vec2, config: &MatchConfig) -> Vec2 {
    Vec2::new(point.x - config.width / 2.0, config.height / 2.0 - point.y)
}

/// Convert a world point to playfield coordinates.
pub fn world_to_playfield(point: Vec2, config: &MatchConfig) -> Vec2 {
    Vec2::new(point.x + config.width / 2.0, config.height / 2.0 - point.y)
}

/// Shared mesh and per-color materials for bubbles.
#[derive(Resource)]
struct BubbleMaterials {
    mesh: Handle<Mesh>,
    radius: f32,
    colors: HashMap<BubbleColor, Handle<ColorMaterial>>,
}

fn load_bubble_materials(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<MatchConfig>,
    mut clear_color: ResMut<ClearColor>,
) {
    clear_color.0 = BACKGROUND;

    let colors = BubbleColor::ALL
        .into_iter()
        .map(|c| (c, materials.add(ColorMaterial::from_color(c.to_color()))))
        .collect();

    commands.insert_resource(BubbleMaterials {
        mesh: meshes.add(Circle::new(config.radius)),
        radius: config.radius,
        colors,
    });
}

/// Sync drawn entities with the match's draw requests.
fn draw_match(
    mut commands: Commands,
    mut gizmos: Gizmos,
    state: Res<MatchState>,
    asset_server: Res<AssetServer>,
    images: Res<ImageAssets>,
    bubble_materials: Option<Res<BubbleMaterials>>,
    mut drawn: Query<(
        Entity,
        &DrawKey,
        &mut Transform,
        Option<&Look>,
        Option<&mut Text2d>,
    )>,
) {
    let Some(bubble_materials) = bubble_materials else {
        return;
    };
    let config = &state.config;
    let playfield_size = Vec2::new(config.width, config.height);
    let playfield_center = Vec2::new(config.width / 2.0, config.height / 2.0);

    let mut existing: HashMap<DrawKey, Entity> = HashMap::new();
    for (entity, key, ..) in &drawn {
        existing.insert(*key, entity);
    }

    for request in state.draw_requests() {
        match request {
            DrawRequest::Sprite {
                key,
                position,
                radius,
                scale,
                color,
            } => {
                let cat = images
                    .cat(color)
                    .filter(|handle| is_drawable(&asset_server, handle));
                let look = Look::for_bubble(color, cat.is_some());
                let z = if key == DrawKey::Shooter { SHOOTER_Z } else { BUBBLE_Z };
                let translation = playfield_to_world(position, config).extend(z);

                // Cat images are sized to the bubble; the circle mesh has a fixed radius
                let scale = match look {
                    Look::Circle(_) => scale * radius / bubble_materials.radius,
                    _ => scale,
                };
                let transform = Transform::from_translation(translation).with_scale(Vec3::splat(scale));

                if let Some(entity) = existing.remove(&key) {
                    if let Ok((_, _, mut drawn_transform, Some(&drawn_look), _)) = drawn.get_mut(entity)
                        && drawn_look == look
                    {
                        *drawn_transform = transform;
                        continue;
                    }
                    commands.entity(entity).despawn();
                }

                let name = Name::new(format!("{:?} {:?}", key, color));
                match (cat, bubble_materials.colors.get(&color)) {
                    (Some(cat), _) => {
                        commands.spawn((
                            name,
                            key,
                            look,
                            Sprite {
                                image: cat.clone(),
                                custom_size: Some(Vec2::splat(radius * 2.0)),
                                ..default()
                            },
                            transform,
                            DespawnOnExit(Screen::Gameplay),
                        ));
                    }
                    (None, Some(material)) => {
                        commands.spawn((
                            name,
                            key,
                            look,
                            Mesh2d(bubble_materials.mesh.clone()),
                            MeshMaterial2d(material.clone()),
                            transform,
                            DespawnOnExit(Screen::Gameplay),
                        ));
                    }
                    (None, None) => {}
                }
            }
            DrawRequest::Text {
                key,
                text,
                position,
                tone,
            } => {
                let translation = playfield_to_world(position, config).extend(TEXT_Z);

                if let Some(entity) = existing.remove(&key)
                    && let Ok((_, _, mut transform, _, Some(mut drawn_text))) =
                        drawn.get_mut(entity)
                {
                    transform.translation = translation;
                    if drawn_text.0 != text {
                        drawn_text.0 = text;
                    }
                    continue;
                }

                let anchor = if key == DrawKey::Hud {
                    Anchor::TOP_LEFT
                } else {
                    Anchor::CENTER
                };
                commands.spawn((
                    Name::new(format!("{:?} Text", key)),
                    key,
                    Text2d::new(text),
                    TextFont::from_font_size(20.0),
                    TextColor(tone.color()),
                    anchor,
                    Transform::from_translation(translation),
                    DespawnOnExit(Screen::Gameplay),
                ));
            }
            DrawRequest::Line { from, to } => {
                gizmos.line_2d(
                    playfield_to_world(from, config),
                    playfield_to_world(to, config),
                    LINE_COLOR,
                );
            }
            DrawRequest::Background | DrawRequest::Overlay => {
                let (key, image, flat_color, z) = if request == DrawRequest::Background {
                    (DrawKey::Background, &images.game_background, BACKGROUND, BACKGROUND_Z)
                } else {
                    (DrawKey::Overlay, &images.game_over_background, OVERLAY_COLOR, OVERLAY_Z)
                };
                let look = Look::for_background(is_drawable(&asset_server, image));

                if let Some(entity) = existing.remove(&key) {
                    if let Ok((_, _, _, Some(&drawn_look), _)) = drawn.get(entity)
                        && drawn_look == look
                    {
                        continue;
                    }
                    commands.entity(entity).despawn();
                }

                let sprite = match look {
                    Look::Image => Sprite {
                        image: image.clone(),
                        custom_size: Some(playfield_size),
                        ..default()
                    },
                    _ => Sprite::from_color(flat_color, playfield_size),
                };
                commands.spawn((
                    Name::new(format!("{:?}", key)),
                    key,
                    look,
                    sprite,
                    Transform::from_translation(
                        playfield_to_world(playfield_center, config).extend(z),
                    ),
                    DespawnOnExit(Screen::Gameplay),
                ));
            }
        }
    }

    // Whatever was not requested this frame is gone
    for entity in existing.into_values() {
        commands.entity(entity).despawn();
    }
}
