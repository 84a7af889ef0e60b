//! Background music and sound effects, driven by [`SoundCue`] messages.

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<SoundCue>();

    app.add_systems(Startup, (load_audio_assets, start_background_music).chain());
    app.add_systems(Update, play_sound_cues);
}

/// A request to start or stop a sound. Fire and forget.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    PlayPop,
    PlayGameOver,
    StopGameOver,
    PlayBackgroundMusic,
    StopBackgroundMusic,
}

/// Handles for every sound the game plays.
#[derive(Resource)]
struct AudioAssets {
    music: Handle<AudioSource>,
    pop: Handle<AudioSource>,
    game_over: Handle<AudioSource>,
}

fn load_audio_assets(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(AudioAssets {
        music: asset_server.load("audio/music/music_loop.ogg"),
        pop: asset_server.load("audio/sound_effects/pop_meow.ogg"),
        game_over: asset_server.load("audio/sound_effects/game_over.ogg"),
    });
}

/// An organizational marker component that should be added to a spawned [`AudioPlayer`] if it's in the
/// general "music" category (e.g. global background music, soundtrack).
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Music;

/// A music audio instance.
pub fn music(handle: Handle<AudioSource>) -> impl Bundle {
    (
        AudioPlayer(handle),
        PlaybackSettings::LOOP.with_volume(bevy::audio::Volume::Linear(0.4)),
        Music,
    )
}

/// An organizational marker component that should be added to a spawned [`AudioPlayer`] if it's in the
/// general "sound effect" category (e.g. footsteps, the sound of a magic spell, a door opening).
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct SoundEffect;

/// A sound effect audio instance.
pub fn sound_effect(handle: Handle<AudioSource>) -> impl Bundle {
    (
        AudioPlayer(handle),
        PlaybackSettings::DESPAWN.with_volume(bevy::audio::Volume::Linear(0.7)),
        SoundEffect,
    )
}

/// Marker for the looping game over jingle.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct GameOverLoop;

fn start_background_music(mut cues: MessageWriter<SoundCue>) {
    cues.write(SoundCue::PlayBackgroundMusic);
}

fn play_sound_cues(
    mut commands: Commands,
    mut cues: MessageReader<SoundCue>,
    assets: Res<AudioAssets>,
    music_query: Query<Entity, With<Music>>,
    game_over_query: Query<Entity, With<GameOverLoop>>,
) {
    for cue in cues.read() {
        debug!("Sound cue: {:?}", cue);
        match cue {
            SoundCue::PlayPop => {
                commands.spawn((Name::new("Pop Sound"), sound_effect(assets.pop.clone())));
            }
            SoundCue::PlayGameOver => {
                commands.spawn((
                    Name::new("Game Over Sound"),
                    AudioPlayer(assets.game_over.clone()),
                    PlaybackSettings::LOOP.with_volume(bevy::audio::Volume::Linear(0.6)),
                    GameOverLoop,
                ));
            }
            SoundCue::StopGameOver => {
                for entity in &game_over_query {
                    commands.entity(entity).despawn();
                }
            }
            SoundCue::PlayBackgroundMusic => {
                if music_query.is_empty() {
                    commands.spawn((Name::new("Background Music"), music(assets.music.clone())));
                }
            }
            SoundCue::StopBackgroundMusic => {
                for entity in &music_query {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}
