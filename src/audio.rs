//! This module coordinates sound playback for the game.
//!
//! Decoding and output belong to the host; it plugs in through [`AudioBackend`]. The [`Audio`]
//! coordinator owns the policy: nothing plays until the host calls [`Audio::unlock`] on the first
//! user gesture, there is exactly one background music channel, and a non-looping track that ends
//! on its own is latched so the game can react to it.

use strum_macros::IntoStaticStr;
use tracing::{debug, trace, warn};

use crate::error::AudioError;

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum Sound {
    /// First of the two alternating token pickup cues.
    CollectA,
    /// Second of the two alternating token pickup cues.
    CollectB,
    StrictAlert,
    ErraticAlert,
    Caught,
    PhaseStart,
    PhaseVictory,
    PortalOpen,
    Win,
}

/// Background music tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum Track {
    Base,
    Survival,
}

impl Track {
    /// The base track loops forever; the survival track plays once and ends naturally.
    pub fn looping(self) -> bool {
        matches!(self, Track::Base)
    }
}

/// The host's playback device.
///
/// Implementations must never block; a failed call is reported and the game carries on.
pub trait AudioBackend {
    fn play_effect(&mut self, sound: Sound) -> Result<(), AudioError>;
    fn play_music(&mut self, track: Track, looping: bool) -> Result<(), AudioError>;
    fn stop_music(&mut self);
    /// Whether the music channel is still producing sound.
    fn is_music_playing(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
}

/// A backend that accepts everything and plays nothing.
///
/// Music "plays" silently until stopped; it never ends on its own.
#[derive(Debug, Default)]
pub struct NullBackend {
    music: bool,
}

impl AudioBackend for NullBackend {
    fn play_effect(&mut self, _sound: Sound) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_music(&mut self, _track: Track, _looping: bool) -> Result<(), AudioError> {
        self.music = true;
        Ok(())
    }

    fn stop_music(&mut self) {
        self.music = false;
    }

    fn is_music_playing(&self) -> bool {
        self.music
    }

    fn set_volume(&mut self, _volume: f32) {}
}

const DEFAULT_VOLUME: f32 = 0.5;

/// The audio coordinator.
pub struct Audio {
    backend: Box<dyn AudioBackend>,
    unlocked: bool,
    muted: bool,
    /// The track the music channel should be playing.
    music: Option<Track>,
    /// A non-looping track that finished on its own and has not been consumed yet.
    finished: Option<Track>,
}

impl Audio {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            unlocked: false,
            muted: false,
            music: None,
            finished: None,
        }
    }

    /// Enables playback. Called by the host on the first user gesture.
    ///
    /// Music requested while locked starts now.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        self.unlocked = true;
        debug!(pending_music = ?self.music, "Audio unlocked");
        self.backend.set_volume(if self.muted { 0.0 } else { DEFAULT_VOLUME });
        if let Some(track) = self.music {
            self.start_track(track);
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Instantly mute or unmute everything.
    pub fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
        if self.unlocked {
            self.backend.set_volume(if muted { 0.0 } else { DEFAULT_VOLUME });
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Plays a one-shot effect. A no-op while locked or muted.
    pub fn play(&mut self, sound: Sound) {
        if !self.unlocked || self.muted {
            trace!(?sound, unlocked = self.unlocked, muted = self.muted, "Skipping sound");
            return;
        }
        if let Err(e) = self.backend.play_effect(sound) {
            warn!(?sound, "Could not play sound: {e}");
        }
    }

    /// Switches the exclusive music channel to `track`, stopping whatever played before.
    ///
    /// While locked the request is remembered and honored by [`unlock`](Self::unlock).
    pub fn play_music(&mut self, track: Track) {
        self.finished = None;
        if self.music == Some(track) && self.unlocked && self.backend.is_music_playing() {
            return;
        }
        self.music = Some(track);
        if self.unlocked {
            self.start_track(track);
        } else {
            trace!(?track, "Audio locked, deferring music");
        }
    }

    pub fn stop_music(&mut self) {
        self.music = None;
        self.finished = None;
        if self.unlocked {
            self.backend.stop_music();
        }
    }

    pub fn current_music(&self) -> Option<Track> {
        self.music
    }

    /// Detects a non-looping track that stopped on its own and latches it.
    pub fn poll(&mut self) {
        if !self.unlocked {
            return;
        }
        if let Some(track) = self.music {
            if !track.looping() && !self.backend.is_music_playing() {
                debug!(?track, "Music track ended naturally");
                self.music = None;
                self.finished = Some(track);
            }
        }
    }

    /// The naturally-ended track, if any, without consuming it.
    pub fn finished_track(&self) -> Option<Track> {
        self.finished
    }

    /// Consumes the naturally-ended track latch.
    pub fn take_finished(&mut self) -> Option<Track> {
        self.finished.take()
    }

    fn start_track(&mut self, track: Track) {
        self.backend.stop_music();
        if let Err(e) = self.backend.play_music(track, track.looping()) {
            warn!(?track, "Could not start music: {e}");
        }
    }
}

impl std::fmt::Debug for Audio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Audio")
            .field("unlocked", &self.unlocked)
            .field("muted", &self.muted)
            .field("music", &self.music)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
