//! Engine tuning loaded from TOML.

use crate::models::engine::{
    EARLY_TICKS, GREAT_TICKS, HIT_LINE_HEIGHT, HIT_LINE_Y, HitLine, HitWindow, LEAD_BEATS,
    LEAD_IN_MS, NOTE_HEIGHT, NOTE_SPEED, PERFECT_TICKS, PlayfieldConfig, REFERENCE_DISTANCE,
    TARGET_FPS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    match toml::from_str(&content) {
        Ok(data) => Ok(data),
        Err(e) => {
            log::error!("Failed to parse TOML file {:?}: {}", path, e);
            Err(e.to_string())
        }
    }
}

/// Every tunable of the judgement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub target_fps: u32,
    /// Pause before the track starts (ms).
    pub lead_in_ms: f64,
    /// Beats between a group's spawn and its hit time.
    pub lead_beats: f64,
    pub reference_distance: f32,
    pub note_speed: f32,
    pub perfect_ticks: f32,
    pub great_ticks: f32,
    pub early_ticks: f32,
    pub hit_line_y: f32,
    pub hit_line_height: f32,
    pub note_height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            lead_in_ms: LEAD_IN_MS,
            lead_beats: LEAD_BEATS,
            reference_distance: REFERENCE_DISTANCE,
            note_speed: NOTE_SPEED,
            perfect_ticks: PERFECT_TICKS,
            great_ticks: GREAT_TICKS,
            early_ticks: EARLY_TICKS,
            hit_line_y: HIT_LINE_Y,
            hit_line_height: HIT_LINE_HEIGHT,
            note_height: NOTE_HEIGHT,
        }
    }
}

impl EngineConfig {
    /// Loads the config at `path`, falling back to defaults when the file
    /// is missing or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("CONFIG: {:?} not found, using defaults", path);
            return Self::default();
        }
        match load_toml::<EngineConfig>(path) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::warn!("CONFIG: Falling back to defaults ({})", e);
                Self::default()
            }
        }
    }

    /// Clamps values into usable ranges and restores tier nesting.
    pub fn sanitized(mut self) -> Self {
        self.target_fps = self.target_fps.clamp(1, 1000);
        self.lead_in_ms = self.lead_in_ms.max(0.0);
        if self.lead_beats.is_nan() || self.lead_beats <= 0.0 {
            log::warn!("CONFIG: lead_beats must be positive, got {}", self.lead_beats);
            self.lead_beats = LEAD_BEATS;
        }
        if self.reference_distance.is_nan() || self.reference_distance <= 0.0 {
            self.reference_distance = REFERENCE_DISTANCE;
        }
        if self.note_speed.is_nan() || self.note_speed <= 0.0 {
            self.note_speed = NOTE_SPEED;
        }
        self.hit_line_y = self.hit_line_y.max(1.0);
        self.hit_line_height = self.hit_line_height.max(0.0);
        self.note_height = self.note_height.max(1.0);

        let window = self.hit_window();
        self.perfect_ticks = window.perfect_ticks;
        self.great_ticks = window.great_ticks;
        self.early_ticks = window.early_ticks;
        self
    }

    pub fn hit_window(&self) -> HitWindow {
        HitWindow::from_custom(self.perfect_ticks, self.great_ticks, self.early_ticks)
    }

    pub fn playfield(&self) -> PlayfieldConfig {
        PlayfieldConfig {
            hit_line: HitLine::new(self.hit_line_y, self.hit_line_height),
            note_height: self.note_height,
            travel_distance: self.hit_line_y,
        }
    }

    /// Duration of one tick in milliseconds.
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.target_fps as f64
    }
}
