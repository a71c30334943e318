//! Song files: metadata plus one chart per difficulty.
//!
//! A song file is TOML. Each `map_<difficulty>` table maps a beat index
//! (as a string key) to the notes anchored on that beat:
//!
//! ```toml
//! name = "Dokuzu"
//! song_path = "audio/dokuzu.ogg"
//! bpm_semiquaver = 520
//!
//! [map_easy]
//! "0" = [{ l = 1, w = 2, t = "t" }]
//! "8" = [{ l = 3, w = 2, t = "h", ln = 4, p = 1 }]
//! "12" = [{ l = 3, w = 2, t = "hr", p = 1 }]
//! ```

use crate::models::engine::{ChartError, ChartStore, NUM_LANES, Note, NoteKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Master,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "master" => Some(Difficulty::Master),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Normal => write!(f, "Normal"),
            Difficulty::Hard => write!(f, "Hard"),
            Difficulty::Master => write!(f, "Master"),
        }
    }
}

/// Difficulty levels shown on song select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyLevels {
    pub easy: u32,
    pub normal: u32,
    pub hard: u32,
    pub master: u32,
}

#[derive(Debug, Deserialize)]
struct RawNote {
    l: i64,
    w: i64,
    t: String,
    #[serde(default)]
    ln: Option<u32>,
    #[serde(default)]
    p: Option<u32>,
}

type RawChart = BTreeMap<String, Vec<RawNote>>;

#[derive(Debug, Deserialize)]
struct RawSong {
    name: String,
    #[serde(default)]
    name_en: String,
    #[serde(default)]
    prod: String,
    #[serde(default)]
    prod_en: String,
    #[serde(default)]
    song_path: String,
    #[serde(default)]
    bpm_crotchet: f64,
    bpm_semiquaver: f64,
    #[serde(default)]
    difficulty: DifficultyLevels,
    #[serde(default)]
    map_easy: RawChart,
    #[serde(default)]
    map_normal: RawChart,
    #[serde(default)]
    map_hard: RawChart,
    #[serde(default)]
    map_master: RawChart,
}

/// A parsed song file.
#[derive(Debug, Clone, PartialEq)]
pub struct SongData {
    pub name: String,
    pub name_en: String,
    pub prod: String,
    pub prod_en: String,
    /// Track handed to the playback collaborator.
    pub song_path: String,
    pub bpm_crotchet: f64,
    /// BPM the conductor runs at (semiquaver granularity).
    pub bpm_semiquaver: f64,
    pub levels: DifficultyLevels,
    maps: BTreeMap<Difficulty, BTreeMap<u32, Vec<Note>>>,
}

impl SongData {
    /// Reads and parses a song file.
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let content = fs::read_to_string(path).map_err(|e| ChartError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let song = Self::parse(&content)?;
        log::info!(
            "CHART: Loaded {:?} ({} notes over {} difficulties)",
            song.name,
            song.maps.values().map(|m| m.values().map(Vec::len).sum::<usize>()).sum::<usize>(),
            song.maps.values().filter(|m| !m.is_empty()).count()
        );
        Ok(song)
    }

    /// Parses a song file's contents. Unknown note tags are fatal.
    pub fn parse(content: &str) -> Result<Self, ChartError> {
        let raw: RawSong = toml::from_str(content).map_err(|e| ChartError::Parse(e.to_string()))?;

        if raw.bpm_semiquaver.is_nan() || raw.bpm_semiquaver <= 0.0 {
            return Err(ChartError::InvalidBpm(raw.bpm_semiquaver));
        }

        let mut maps = BTreeMap::new();
        for (difficulty, chart) in [
            (Difficulty::Easy, &raw.map_easy),
            (Difficulty::Normal, &raw.map_normal),
            (Difficulty::Hard, &raw.map_hard),
            (Difficulty::Master, &raw.map_master),
        ] {
            maps.insert(difficulty, convert_chart(chart)?);
        }

        Ok(Self {
            name: raw.name,
            name_en: raw.name_en,
            prod: raw.prod,
            prod_en: raw.prod_en,
            song_path: raw.song_path,
            bpm_crotchet: raw.bpm_crotchet,
            bpm_semiquaver: raw.bpm_semiquaver,
            levels: raw.difficulty,
            maps,
        })
    }

    /// Chart for `difficulty`. Fails with `ChartError::Empty` when that
    /// difficulty has not been mapped yet.
    pub fn chart(&self, difficulty: Difficulty) -> Result<ChartStore, ChartError> {
        let beats = self.maps.get(&difficulty).cloned().unwrap_or_default();
        ChartStore::new(beats)
    }

    pub fn level(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.levels.easy,
            Difficulty::Normal => self.levels.normal,
            Difficulty::Hard => self.levels.hard,
            Difficulty::Master => self.levels.master,
        }
    }
}

fn convert_chart(raw: &RawChart) -> Result<BTreeMap<u32, Vec<Note>>, ChartError> {
    let mut beats = BTreeMap::new();
    for (key, notes) in raw {
        let beat: u32 = key
            .trim()
            .parse()
            .map_err(|_| ChartError::InvalidBeat(key.clone()))?;

        let converted = notes
            .iter()
            .map(|n| convert_note(key, beat, n))
            .collect::<Result<Vec<_>, _>>()?;
        beats.entry(beat).or_insert_with(Vec::new).extend(converted);
    }
    Ok(beats)
}

fn convert_note(key: &str, beat: u32, raw: &RawNote) -> Result<Note, ChartError> {
    let kind = NoteKind::from_tag(&raw.t).ok_or_else(|| ChartError::UnknownNoteType {
        beat: key.to_string(),
        tag: raw.t.clone(),
    })?;

    let lanes = NUM_LANES as i64;
    if raw.l < 1 || raw.w < 1 || raw.l > lanes || raw.w > lanes - (raw.l - 1) {
        return Err(ChartError::LaneOutOfRange {
            beat,
            lane: raw.l,
            width: raw.w,
        });
    }

    Ok(Note {
        lane: raw.l as u8,
        width: raw.w as u8,
        kind,
        // A missing or zero length means one beat.
        length: raw.ln.filter(|&ln| ln > 0).unwrap_or(1),
        pair_id: raw.p.unwrap_or(0),
    })
}
