//! Channel infrastructure between the engine and an audio backend.
//!
//! The engine never touches audio buffers. It sends commands down a
//! lock-free channel and reads the playback position back from an atomic
//! the backend keeps up to date.

use crate::logic::audio::SoundCue;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Playback position reported while nothing is loaded or playing.
pub const NO_POSITION_MS: f64 = -1.0;

/// Commands sent to the audio backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Load a track for playback.
    Load { track: String },
    /// Start playback.
    Play,
    /// Pause playback.
    Pause,
    /// Play the cues resolved during one tick.
    Cues(Vec<SoundCue>),
}

/// Shared audio channels.
#[derive(Clone)]
pub struct AudioBus {
    /// Engine → Audio: commands.
    pub audio_cmd_tx: Sender<AudioCommand>,
    pub audio_cmd_rx: Receiver<AudioCommand>,

    /// Playback position in milliseconds, stored as `f64` bits.
    /// Written by the audio backend, read by the engine.
    pub audio_position: Arc<AtomicU64>,
}

impl AudioBus {
    pub fn new() -> Self {
        let (audio_cmd_tx, audio_cmd_rx) = unbounded();
        Self {
            audio_cmd_tx,
            audio_cmd_rx,
            audio_position: Arc::new(AtomicU64::new(NO_POSITION_MS.to_bits())),
        }
    }

    /// Publishes the backend's playback position.
    pub fn set_position_ms(&self, position_ms: f64) {
        self.audio_position
            .store(position_ms.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AudioBus {
    fn default() -> Self {
        Self::new()
    }
}
