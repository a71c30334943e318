//! Beat clock driven by the playback position.
//!
//! The clock turns milliseconds of playback into a beat index and owns the
//! one-way cursor over the chart's authored beats.

use crate::models::engine::{ChartError, ChartStore};

/// The beat cursor was advanced past the final authored beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExhaustedError {
    pub final_beat: Option<u32>,
}

impl std::fmt::Display for ExhaustedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.final_beat {
            Some(beat) => write!(f, "Beat cursor advanced past final beat {}", beat),
            None => write!(f, "Beat cursor advanced on a chart with no beats"),
        }
    }
}

impl std::error::Error for ExhaustedError {}

#[derive(Debug, Clone)]
pub struct BeatClock {
    sec_per_beat: f64,
    beat_count: u64,
    beats: Vec<u32>,
    cursor: usize,
}

impl BeatClock {
    /// `bpm` is the chart's declared tempo at the granularity notes are
    /// authored in.
    pub fn new(bpm: f64, chart: &ChartStore) -> Result<Self, ChartError> {
        if bpm.is_nan() || bpm <= 0.0 {
            return Err(ChartError::InvalidBpm(bpm));
        }
        Ok(Self {
            sec_per_beat: 60.0 / bpm,
            beat_count: 0,
            beats: chart.beats().collect(),
            cursor: 0,
        })
    }

    pub fn sec_per_beat(&self) -> f64 {
        self.sec_per_beat
    }

    pub fn ms_per_beat(&self) -> f64 {
        self.sec_per_beat * 1000.0
    }

    /// Recomputes the beat count from the playback position.
    ///
    /// Negative positions mean nothing is playing and are ignored. The count
    /// never moves backwards, even if playback seeks.
    pub fn update(&mut self, position_ms: f64) {
        if position_ms.is_nan() || position_ms < 0.0 {
            return;
        }
        let beat = (position_ms / self.ms_per_beat()).floor() as u64;
        if beat > self.beat_count {
            log::trace!("CLOCK: beat {} at {:.1}ms", beat, position_ms);
            self.beat_count = beat;
        }
    }

    pub fn beat_count(&self) -> u64 {
        self.beat_count
    }

    /// Fraction of the current beat already elapsed at `position_ms`, in `[0, 1)`.
    pub fn beat_phase(&self, position_ms: f64) -> f64 {
        if position_ms.is_nan() || position_ms < 0.0 {
            return 0.0;
        }
        (position_ms / self.ms_per_beat()).fract()
    }

    /// Next authored beat, without consuming it.
    pub fn peek_chart_beat(&self) -> Option<u32> {
        self.beats.get(self.cursor).copied()
    }

    /// Consumes and returns the next authored beat.
    pub fn next_chart_beat(&mut self) -> Result<u32, ExhaustedError> {
        let beat = self.peek_chart_beat().ok_or(ExhaustedError {
            final_beat: self.final_beat(),
        })?;
        self.cursor += 1;
        Ok(beat)
    }

    pub fn final_beat(&self) -> Option<u32> {
        self.beats.last().copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.beats.len()
    }
}
