//! Calibration constants shared by the engine.
//!
//! These values are tuning choices, not derived quantities. `EngineConfig`
//! starts from them and lets a config file override each one.

/// Number of input lanes on the playfield.
pub const NUM_LANES: usize = 8;

/// Display refresh rate the scroll speed is calibrated against.
pub const TARGET_FPS: u32 = 60;

/// Silence before the track starts playing, in milliseconds.
pub const LEAD_IN_MS: f64 = 5000.0;

/// How many beats ahead of its hit time a note group is spawned.
pub const LEAD_BEATS: f64 = 2.1;

/// Travel distance (pixels) the note speed constant was tuned on.
pub const REFERENCE_DISTANCE: f32 = 457.0;

/// Pixels per tick a note moves over `REFERENCE_DISTANCE`.
pub const NOTE_SPEED: f32 = 30.0;

/// Tier widths, in scroll ticks from the hit line.
pub const PERFECT_TICKS: f32 = 2.0;
pub const GREAT_TICKS: f32 = 4.0;
pub const EARLY_TICKS: f32 = 6.0;

/// Distance (in scroll ticks) above the hit line at which a held
/// note's tail is checked for release.
pub const HOLD_RELEASE_TICKS: f32 = 6.0;

/// Default playfield geometry (pixels, y grows downwards).
pub const HIT_LINE_Y: f32 = 457.0;
pub const HIT_LINE_HEIGHT: f32 = 16.0;
pub const NOTE_HEIGHT: f32 = 16.0;
