//! Render snapshots of a running session.
//!
//! A snapshot is an immutable copy of what a renderer needs to draw one
//! frame. Dead notes are included so they can be drawn greyed out.

use crate::models::engine::{HoldPhase, NoteKind, NoteObject};
use crate::models::stats::{HitStats, Rank};
use serde::Serialize;

/// One note as it should be drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteSnapshot {
    /// First lane, 1-based.
    pub lane: u8,
    pub width: u8,
    pub kind: NoteKind,
    /// Top edge of the head, in pixels from the spawn line.
    pub y: f32,
    pub height: f32,
    /// Hold body drawn above the head.
    pub body_len: f32,
    pub alive: bool,
    pub down: bool,
}

impl From<&NoteObject> for NoteSnapshot {
    fn from(note: &NoteObject) -> Self {
        Self {
            lane: note.note.lane,
            width: note.note.width,
            kind: note.kind,
            y: note.y,
            height: note.height,
            body_len: note.body_len,
            alive: note.alive,
            // A released hold no longer has a held body to draw.
            down: note.down && note.hold == HoldPhase::Down,
        }
    }
}

/// Snapshot of gameplay state for rendering.
#[derive(Clone, Debug, Serialize)]
pub struct GameplaySnapshot {
    /// Unresolved notes, oldest group first.
    pub notes: Vec<NoteSnapshot>,
    /// Per-lane key held state.
    pub keys_held: Vec<bool>,
    pub hit_line_y: f32,
    pub beat_count: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub accuracy: f64,
    pub rank: Rank,
    pub hit_stats: HitStats,
    /// Notes not judged yet.
    pub remaining_notes: u32,
    pub finished: bool,
}
