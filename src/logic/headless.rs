//! Headless runs: a simulated playback clock and an autoplay input source.

use crate::logic::audio::{CuePlayer, Playback};
use crate::models::engine::{ChartError, NUM_LANES, NoteKind};
use crate::models::record::ResultSink;
use crate::models::settings::EngineConfig;
use crate::models::song::{Difficulty, SongData};
use crate::models::stats::SessionResult;
use crate::state::game::{GameplaySession, SessionChart};
use crate::system::bus::NO_POSITION_MS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::ops::Range;

/// Playback whose position only moves when the runner advances it.
#[derive(Debug, Default, Clone)]
pub struct SimulatedPlayback {
    track: Option<String>,
    playing: bool,
    position_ms: f64,
}

impl SimulatedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if self.playing {
            self.position_ms += dt_ms;
        }
    }

    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Playback for SimulatedPlayback {
    fn position_ms(&self) -> f64 {
        if self.track.is_some() && self.playing {
            self.position_ms
        } else {
            NO_POSITION_MS
        }
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn load(&mut self, track: &str) {
        self.track = Some(track.to_string());
        self.position_ms = 0.0;
        self.playing = false;
    }
}

/// Presses each note on the tick it lands on the hit line.
///
/// Holds stay pressed until their release marker reaches the line.
/// With a non-zero `miss_rate`, presses are skipped at random.
pub struct Autoplay {
    rng: StdRng,
    miss_rate: f64,
    /// Lanes held for each hold pair currently down.
    engaged: HashMap<u32, Range<usize>>,
}

impl Autoplay {
    pub fn new(miss_rate: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            miss_rate: miss_rate.clamp(0.0, 1.0),
            engaged: HashMap::new(),
        }
    }

    /// Lane state to feed the session on its next tick.
    pub fn lanes<P: Playback, C: CuePlayer, S: ResultSink>(
        &mut self,
        session: &GameplaySession<P, C, S>,
    ) -> [bool; NUM_LANES] {
        let scroll = session.scroll();
        let mut lanes = [false; NUM_LANES];
        let mut releasing = Vec::new();

        let live = session
            .groups()
            .iter()
            .flat_map(|group| group.notes.iter())
            .filter(|note| !note.resolved);

        for note in live {
            let lands = scroll.next_position(note.y) == scroll.snap_y();
            match note.kind {
                NoteKind::HoldHead if note.down => {
                    if note.note.pair_id != 0 {
                        self.engaged.insert(note.note.pair_id, note.lanes());
                    }
                    lanes[note.lanes()].fill(true);
                }
                NoteKind::HoldRelease => {
                    if lands && self.engaged.contains_key(&note.note.pair_id) {
                        releasing.push(note.note.pair_id);
                    }
                }
                _ if lands && note.alive && !note.down => {
                    if self.rng.random_bool(self.miss_rate) {
                        log::debug!("AUTOPLAY: Skipping {:?} on lane {}", note.kind, note.note.lane);
                    } else {
                        lanes[note.lanes()].fill(true);
                    }
                }
                _ => {}
            }
        }

        for pair in releasing {
            self.engaged.remove(&pair);
        }
        for span in self.engaged.values() {
            lanes[span.clone()].fill(true);
        }
        lanes
    }
}

/// Plays `difficulty` of `song` to the end with autoplay input.
///
/// Returns `None` if the session did not finish within the chart's length
/// plus a safety margin.
pub fn run_autoplay<C: CuePlayer, S: ResultSink>(
    song: &SongData,
    difficulty: Difficulty,
    config: &EngineConfig,
    autoplay: &mut Autoplay,
    cue_player: C,
    sink: S,
) -> Result<Option<SessionResult>, ChartError> {
    let source = SessionChart::from_song(song, difficulty)?;
    let final_beat = source.chart.final_beat().unwrap_or(0);
    let config = config.clone().sanitized();
    let tick_ms = config.tick_ms();

    let mut session =
        GameplaySession::new(source, &config, SimulatedPlayback::new(), cue_player, sink)?;

    let chart_ms = config.lead_in_ms + (final_beat as f64 + 8.0) * session.clock().ms_per_beat();
    let max_ticks = (chart_ms / tick_ms).ceil() as u64 + 10 * config.target_fps as u64;

    let mut now_ms = 0.0;
    for _ in 0..max_ticks {
        let lanes = autoplay.lanes(&session);
        session.update(now_ms, lanes);
        if session.is_finished() {
            return Ok(session.result().cloned());
        }
        session.playback_mut().advance(tick_ms);
        now_ms += tick_ms;
    }

    log::error!("AUTOPLAY: Session still running after {} ticks", max_ticks);
    session.teardown();
    Ok(None)
}
