//! Audio seams of the engine.
//!
//! The session talks to two collaborators: a [`Playback`] that owns the
//! music track and reports its position, and a [`CuePlayer`] that plays
//! hit sounds. [`AudioManager`] implements both on top of the [`AudioBus`],
//! so a real backend can run on its own thread.

use crate::models::engine::NoteKind;
use crate::models::stats::Judgement;
use crate::system::bus::{AudioBus, AudioCommand};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Semantic sound effect requests. Which sample each maps to is up to the
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    TapPerfect,
    /// Tap judged Great or Early.
    TapEtc,
    TapCrit,
    Flair,
    FlairCrit,
    /// Hold entered; carries the hold length in beats.
    Hold { beats: u32 },
    /// Key pressed on a lane with nothing to hit.
    LaneTap,
    /// Played once when the lead-in pause starts.
    LeadPause,
}

/// Cue for a note of `kind` judged `tier`.
pub fn cue_for(kind: NoteKind, tier: Judgement, hold_beats: u32) -> SoundCue {
    match kind {
        NoteKind::Tap if tier == Judgement::Perfect => SoundCue::TapPerfect,
        NoteKind::Tap => SoundCue::TapEtc,
        NoteKind::TapCritical => SoundCue::TapCrit,
        NoteKind::Flair => SoundCue::Flair,
        NoteKind::FlairCritical => SoundCue::FlairCrit,
        NoteKind::HoldHead => SoundCue::Hold { beats: hold_beats },
        NoteKind::HoldRelease => SoundCue::TapPerfect,
    }
}

/// Music playback as seen by the engine.
pub trait Playback {
    /// Current position in milliseconds, or a negative value when nothing
    /// is loaded or the track has finished.
    fn position_ms(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
    fn load(&mut self, track: &str);
}

/// Receives the cues resolved during one tick, at most once per tick.
pub trait CuePlayer {
    fn play(&mut self, cues: &[SoundCue]);
}

impl<T: CuePlayer + ?Sized> CuePlayer for &mut T {
    fn play(&mut self, cues: &[SoundCue]) {
        (**self).play(cues);
    }
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&mut self, _cues: &[SoundCue]) {}
}

/// Forwards playback and cue requests to the audio backend.
///
/// The `AudioManager` does not perform audio operations directly.
/// It sends commands through the bus and reads the position the backend
/// publishes.
pub struct AudioManager {
    cmd_tx: Sender<AudioCommand>,
    position: Arc<AtomicU64>,
}

impl AudioManager {
    pub fn new(bus: &AudioBus) -> Self {
        Self {
            cmd_tx: bus.audio_cmd_tx.clone(),
            position: bus.audio_position.clone(),
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!("AUDIO: Backend disconnected, command dropped");
        }
    }
}

impl Playback for AudioManager {
    fn position_ms(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn play(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn load(&mut self, track: &str) {
        self.send(AudioCommand::Load {
            track: track.to_string(),
        });
    }
}

impl CuePlayer for AudioManager {
    fn play(&mut self, cues: &[SoundCue]) {
        if !cues.is_empty() {
            self.send(AudioCommand::Cues(cues.to_vec()));
        }
    }
}
