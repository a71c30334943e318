//! Beat-indexed chart storage.

use super::note::Note;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Error type for charts that cannot be played.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// A note carries a type tag outside `t|tc|f|fc|h|hr`.
    UnknownNoteType { beat: String, tag: String },
    /// A note does not fit inside the 8 lanes.
    LaneOutOfRange { beat: u32, lane: i64, width: i64 },
    /// A chart key is not a non-negative integer.
    InvalidBeat(String),
    /// The chart has no authored notes.
    Empty,
    /// The declared BPM is zero, negative or not a number.
    InvalidBpm(f64),
    /// The song file could not be read.
    Io { path: PathBuf, message: String },
    /// The song file is not valid TOML or misses fields.
    Parse(String),
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::UnknownNoteType { beat, tag } => {
                write!(f, "Bad beatmap config: unknown note type {:?} at beat {}", tag, beat)
            }
            ChartError::LaneOutOfRange { beat, lane, width } => write!(
                f,
                "Bad beatmap config: note at beat {} spans lanes {}..{} outside 1..=8",
                beat,
                lane,
                lane + width - 1
            ),
            ChartError::InvalidBeat(key) => write!(f, "Invalid beat index: {:?}", key),
            ChartError::Empty => write!(f, "This beatmap has no notes"),
            ChartError::InvalidBpm(bpm) => write!(f, "Invalid BPM: {}", bpm),
            ChartError::Io { path, message } => write!(f, "Failed to read {:?}: {}", path, message),
            ChartError::Parse(msg) => write!(f, "Failed to parse song file: {}", msg),
        }
    }
}

impl std::error::Error for ChartError {}

/// Ordered mapping from beat index to the notes anchored there.
///
/// Iteration is always in increasing beat order. The store itself is
/// read-only; the one-way cursor over its beats lives in `BeatClock`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartStore {
    beats: BTreeMap<u32, Vec<Note>>,
}

impl ChartStore {
    /// Builds a store, rejecting empty charts and notes outside the playfield.
    pub fn new(beats: BTreeMap<u32, Vec<Note>>) -> Result<Self, ChartError> {
        for (beat, notes) in &beats {
            if let Some(bad) = notes.iter().find(|n| !n.fits_playfield()) {
                return Err(ChartError::LaneOutOfRange {
                    beat: *beat,
                    lane: bad.lane as i64,
                    width: bad.width as i64,
                });
            }
        }
        let store = Self { beats };
        if store.note_count() == 0 {
            return Err(ChartError::Empty);
        }
        Ok(store)
    }

    /// Notes authored at `beat`, if any.
    pub fn notes_at(&self, beat: u32) -> Option<&[Note]> {
        self.beats.get(&beat).map(Vec::as_slice)
    }

    /// Authored beats in increasing order.
    pub fn beats(&self) -> impl Iterator<Item = u32> + '_ {
        self.beats.keys().copied()
    }

    pub fn first_beat(&self) -> Option<u32> {
        self.beats.keys().next().copied()
    }

    pub fn final_beat(&self) -> Option<u32> {
        self.beats.keys().next_back().copied()
    }

    /// Total number of notes across all beats.
    pub fn note_count(&self) -> usize {
        self.beats.values().map(Vec::len).sum()
    }
}
