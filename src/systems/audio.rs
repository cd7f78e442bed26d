//! Applies the tick's audio requests to the coordinator.
//!
//! The coordinator wraps a host device that may be tied to the main thread, so it lives in the
//! world as a non-send resource.

use bevy_ecs::{event::EventReader, system::NonSendMut};
use tracing::trace;

use crate::{audio::Audio, events::AudioEvent};

/// Non-send wrapper for the audio coordinator.
pub struct AudioResource(pub Audio);

/// Plays queued effects, switches music, and latches a music track that ended on its own.
pub fn audio_system(mut audio: NonSendMut<AudioResource>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        trace!(?event, "Audio event");
        match *event {
            AudioEvent::Play(sound) => audio.0.play(sound),
            AudioEvent::Music(track) => audio.0.play_music(track),
            AudioEvent::StopMusic => audio.0.stop_music(),
        }
    }

    audio.0.poll();
}
