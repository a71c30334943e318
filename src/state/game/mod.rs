//! Gameplay session for one play of one chart.
//!
//! The `GameplaySession` owns the beat clock, spawner, scroll model,
//! classifier and score, and drives them once per tick:
//! - poll lane input and derive press/release edges
//! - spawn groups that came due
//! - scroll the groups that existed before this tick
//! - judge them, then drop the ones fully resolved
//! - advance the beat clock once the track plays
//!
//! Collaborators (playback, hit sounds, result storage) are passed in as
//! trait implementations so the session holds no global state.

mod hold;
mod input;
mod notes;
mod score;
mod spawner;

pub use hold::{HoldStateError, transition};
pub use input::LaneInput;
pub use score::ScoreAggregator;
pub use spawner::NoteSpawner;

use crate::logic::audio::{CuePlayer, Playback, SoundCue};
use crate::logic::conductor::BeatClock;
use crate::models::engine::{
    ChartError, ChartStore, HoldPhase, JudgmentClassifier, NUM_LANES, NoteGroup, ScrollModel,
};
use crate::models::record::ResultSink;
use crate::models::settings::EngineConfig;
use crate::models::song::{Difficulty, SongData};
use crate::models::stats::SessionResult;
use crate::shared::snapshot::{GameplaySnapshot, NoteSnapshot};
use std::collections::HashSet;

/// The chart a session plays and the metadata it needs from the song.
#[derive(Debug, Clone)]
pub struct SessionChart {
    pub chart: ChartStore,
    /// Tempo the chart's beat indices are authored at.
    pub bpm: f64,
    pub track: String,
    pub difficulty: Difficulty,
}

impl SessionChart {
    /// Picks `difficulty` from `song`. Unmapped difficulties refuse to start.
    pub fn from_song(song: &SongData, difficulty: Difficulty) -> Result<Self, ChartError> {
        Ok(Self {
            chart: song.chart(difficulty)?,
            bpm: song.bpm_semiquaver,
            track: song.song_path.clone(),
            difficulty,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Started, waiting out the pause before the track.
    LeadIn,
    Playing,
    /// Every note judged and the result submitted.
    Finished,
    /// Ended by the caller before finishing.
    TornDown,
}

pub struct GameplaySession<P: Playback, C: CuePlayer, S: ResultSink> {
    pub(crate) difficulty: Difficulty,
    pub(crate) track: String,
    pub(crate) chart: ChartStore,
    pub(crate) clock: BeatClock,
    pub(crate) spawner: NoteSpawner,
    pub(crate) scroll: ScrollModel,
    pub(crate) classifier: JudgmentClassifier,
    pub(crate) input: LaneInput,
    pub(crate) score: ScoreAggregator,
    /// Live groups, oldest first.
    pub(crate) groups: Vec<NoteGroup>,
    /// Pair ids of holds that broke. Their release markers turn into taps.
    pub(crate) dead_sliders: HashSet<u32>,
    /// Cues resolved during the current tick.
    pub(crate) pending_cues: Vec<SoundCue>,

    playback: P,
    cue_player: C,
    sink: S,

    lead_in_ms: f64,
    start_ms: Option<f64>,
    phase: SessionPhase,
}

impl<P: Playback, C: CuePlayer, S: ResultSink> GameplaySession<P, C, S> {
    pub fn new(
        source: SessionChart,
        config: &EngineConfig,
        playback: P,
        cue_player: C,
        sink: S,
    ) -> Result<Self, ChartError> {
        let config = config.clone().sanitized();
        let SessionChart {
            chart,
            bpm,
            track,
            difficulty,
        } = source;

        let clock = BeatClock::new(bpm, &chart)?;
        let playfield = config.playfield();
        let scroll = ScrollModel::new(&playfield, config.reference_distance, config.note_speed);
        let classifier =
            JudgmentClassifier::new(config.hit_window(), playfield.hit_line, scroll.speed());

        let px_per_beat = (scroll.speed() as f64 * clock.ms_per_beat() / config.tick_ms()) as f32;
        let spawner = NoteSpawner::new(
            &clock,
            config.lead_beats,
            config.lead_in_ms,
            playfield.note_height,
            px_per_beat,
        );
        let score = ScoreAggregator::new(chart.note_count() as u32);

        log::info!(
            "ENGINE: {} session ready ({} notes, final beat {:?}, {} px/tick)",
            difficulty,
            chart.note_count(),
            clock.final_beat(),
            scroll.speed()
        );

        Ok(Self {
            difficulty,
            track,
            chart,
            clock,
            spawner,
            scroll,
            classifier,
            input: LaneInput::new(),
            score,
            groups: Vec::new(),
            dead_sliders: HashSet::new(),
            pending_cues: Vec::new(),
            playback,
            cue_player,
            sink,
            lead_in_ms: config.lead_in_ms,
            start_ms: None,
            phase: SessionPhase::LeadIn,
        })
    }

    /// Runs one tick. `lanes` is the held state of every lane key.
    ///
    /// Does nothing once the session finished or was torn down.
    pub fn update(&mut self, now_ms: f64, lanes: [bool; NUM_LANES]) {
        if matches!(self.phase, SessionPhase::Finished | SessionPhase::TornDown) {
            return;
        }
        let start = match self.start_ms {
            Some(start) => start,
            None => self.begin(now_ms),
        };

        self.input.poll(lanes);

        // Groups spawned this tick sit at the spawn line until the next one.
        let settled = self.groups.len();
        match self
            .spawner
            .maybe_spawn(now_ms, start, &mut self.clock, &self.chart)
        {
            Ok(spawned) => self.groups.extend(spawned),
            Err(e) => log::error!("ENGINE: {}", e),
        }

        for group in &mut self.groups[..settled] {
            self.scroll.advance(group);
        }

        self.judge_groups(settled);
        self.groups.retain(|group| !group.is_resolved());
        self.flush_cues();

        if self.phase == SessionPhase::LeadIn && now_ms - start >= self.lead_in_ms {
            log::info!("ENGINE: Lead-in over, starting playback");
            self.playback.play();
            self.phase = SessionPhase::Playing;
        }
        if self.phase == SessionPhase::Playing {
            self.clock.update(self.playback.position_ms());
        }

        // A hold head that is still down counts as judged but can still break.
        if self.score.is_complete() && !self.holds_down() {
            self.finish();
        }
    }

    fn holds_down(&self) -> bool {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter())
            .any(|note| note.hold == HoldPhase::Down)
    }

    fn begin(&mut self, now_ms: f64) -> f64 {
        log::info!("ENGINE: Session started, loading {:?}", self.track);
        self.start_ms = Some(now_ms);
        self.pending_cues.push(SoundCue::LeadPause);
        self.playback.load(&self.track);
        now_ms
    }

    fn flush_cues(&mut self) {
        if !self.pending_cues.is_empty() {
            self.cue_player.play(&self.pending_cues);
            self.pending_cues.clear();
        }
    }

    fn finish(&mut self) {
        if let Some(result) = self.score.finalize(&mut self.sink, self.difficulty) {
            log::info!(
                "ENGINE: Finished {}: {} {:?} {:.2}% (max combo {})",
                self.difficulty,
                result.clear_type.label(),
                result.rank,
                result.accuracy,
                result.max_combo
            );
            self.phase = SessionPhase::Finished;
        }
    }

    /// Ends the session early. Playback is paused and nothing is submitted.
    pub fn teardown(&mut self) {
        if self.phase == SessionPhase::TornDown {
            return;
        }
        log::info!("ENGINE: Session torn down in {:?}", self.phase);
        self.playback.pause();
        self.phase = SessionPhase::TornDown;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.score.result()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn groups(&self) -> &[NoteGroup] {
        &self.groups
    }

    pub fn scroll(&self) -> &ScrollModel {
        &self.scroll
    }

    pub fn classifier(&self) -> &JudgmentClassifier {
        &self.classifier
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn score(&self) -> &ScoreAggregator {
        &self.score
    }

    pub fn dead_sliders(&self) -> &HashSet<u32> {
        &self.dead_sliders
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    pub fn cue_player(&self) -> &C {
        &self.cue_player
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> GameplaySnapshot {
        let (accuracy, rank) = self.score.compute_accuracy();
        GameplaySnapshot {
            notes: self
                .groups
                .iter()
                .flat_map(|group| group.notes.iter())
                .filter(|note| !note.resolved)
                .map(NoteSnapshot::from)
                .collect(),
            keys_held: self.input.held().to_vec(),
            hit_line_y: self.classifier.line.center,
            beat_count: self.clock.beat_count(),
            combo: self.score.combo(),
            max_combo: self.score.max_combo(),
            accuracy,
            rank,
            hit_stats: self.score.hit_stats().clone(),
            remaining_notes: self
                .score
                .note_count()
                .saturating_sub(self.score.hit_stats().total()),
            finished: self.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests;
