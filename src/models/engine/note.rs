//! Authored notes and their live, on-screen counterparts.

use super::constants::NUM_LANES;
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Kind of note as authored in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// Plain tap.
    Tap,
    /// Tap with the critical sound.
    TapCritical,
    /// Flick-style note, judged like a tap.
    Flair,
    /// Critical flair.
    FlairCritical,
    /// Start of a hold (slider). Must be held for its length.
    HoldHead,
    /// End marker of a hold, let go of when it crosses the line.
    HoldRelease,
}

impl NoteKind {
    /// Parses the short tag used in song files (`t`, `tc`, `f`, `fc`, `h`, `hr`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "t" => Some(NoteKind::Tap),
            "tc" => Some(NoteKind::TapCritical),
            "f" => Some(NoteKind::Flair),
            "fc" => Some(NoteKind::FlairCritical),
            "h" => Some(NoteKind::HoldHead),
            "hr" => Some(NoteKind::HoldRelease),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            NoteKind::Tap => "t",
            NoteKind::TapCritical => "tc",
            NoteKind::Flair => "f",
            NoteKind::FlairCritical => "fc",
            NoteKind::HoldHead => "h",
            NoteKind::HoldRelease => "hr",
        }
    }

    /// Returns true for notes resolved by a single key press.
    pub fn is_instant(self) -> bool {
        matches!(
            self,
            NoteKind::Tap | NoteKind::TapCritical | NoteKind::Flair | NoteKind::FlairCritical
        )
    }

    pub fn is_hold(self) -> bool {
        matches!(self, NoteKind::HoldHead)
    }
}

/// A note as written in the chart. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// First lane covered, 1-based.
    pub lane: u8,
    /// Number of lanes spanned.
    pub width: u8,
    pub kind: NoteKind,
    /// Duration in beats. Only meaningful for hold heads.
    pub length: u32,
    /// Links a hold release to its head. 0 means unpaired.
    pub pair_id: u32,
}

impl Note {
    pub fn new(lane: u8, width: u8, kind: NoteKind) -> Self {
        Self {
            lane,
            width,
            kind,
            length: 1,
            pair_id: 0,
        }
    }

    pub fn hold(lane: u8, width: u8, length: u32, pair_id: u32) -> Self {
        Self {
            lane,
            width,
            kind: NoteKind::HoldHead,
            length,
            pair_id,
        }
    }

    pub fn release(lane: u8, width: u8, pair_id: u32) -> Self {
        Self {
            lane,
            width,
            kind: NoteKind::HoldRelease,
            length: 1,
            pair_id,
        }
    }

    /// Returns true when the note fits inside the playfield.
    pub fn fits_playfield(&self) -> bool {
        self.lane >= 1
            && self.width >= 1
            && (self.lane as usize - 1) + self.width as usize <= NUM_LANES
    }

    /// Zero-based input lane indices covered by this note.
    pub fn lanes(&self) -> Range<usize> {
        let start = (self.lane as usize).saturating_sub(1);
        start..(start + self.width as usize).min(NUM_LANES)
    }
}

/// Lifecycle of a hold note once it is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    Idle,
    Down,
    Released,
    Broken,
}

impl HoldPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, HoldPhase::Released | HoldPhase::Broken)
    }
}

/// A spawned note scrolling towards the hit line.
#[derive(Debug, Clone)]
pub struct NoteObject {
    pub note: Note,
    /// Effective kind. A hold release whose head broke is demoted to `Tap`.
    pub kind: NoteKind,
    /// Top edge of the note head, in pixels from the spawn line.
    pub y: f32,
    /// Head height in pixels.
    pub height: f32,
    /// Length of the hold body above the head, in pixels. Zero for other notes.
    pub body_len: f32,
    /// False once the note was missed or broken. Dead notes are drawn greyed out.
    pub alive: bool,
    /// True while a hold head is being held down.
    pub down: bool,
    /// Set once nothing further can happen to this note.
    pub resolved: bool,
    /// Hold lifecycle; stays `Idle` for every other kind.
    pub hold: HoldPhase,
    /// Tier this note was scored with, once judged.
    pub judgement: Option<Judgement>,
}

impl NoteObject {
    pub fn spawn(note: Note, height: f32, px_per_beat: f32) -> Self {
        let body_len = if note.kind.is_hold() {
            note.length as f32 * px_per_beat
        } else {
            0.0
        };
        Self {
            kind: note.kind,
            note,
            y: 0.0,
            height,
            body_len,
            alive: true,
            down: false,
            resolved: false,
            hold: HoldPhase::Idle,
            judgement: None,
        }
    }

    /// Bottom edge of the head (first to reach the hit line).
    pub fn leading_edge(&self) -> f32 {
        self.y + self.height
    }

    /// Top edge of the head.
    pub fn trailing_edge(&self) -> f32 {
        self.y
    }

    pub fn center(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Top end of the hold body. Equal to the trailing edge for non-hold notes.
    pub fn tail(&self) -> f32 {
        self.y - self.body_len
    }

    pub fn lanes(&self) -> Range<usize> {
        self.note.lanes()
    }
}

/// Notes sharing one spawn beat. They scroll in lockstep.
#[derive(Debug, Clone)]
pub struct NoteGroup {
    pub beat: u32,
    pub notes: Vec<NoteObject>,
}

impl NoteGroup {
    pub fn new(beat: u32, notes: &[Note], height: f32, px_per_beat: f32) -> Self {
        Self {
            beat,
            notes: notes
                .iter()
                .cloned()
                .map(|n| NoteObject::spawn(n, height, px_per_beat))
                .collect(),
        }
    }

    /// Index of the element that drives the group's motion: the first
    /// member not yet resolved.
    pub fn lead_index(&self) -> Option<usize> {
        self.notes.iter().position(|n| !n.resolved)
    }

    pub fn lead_position(&self) -> Option<f32> {
        self.lead_index().map(|i| self.notes[i].y)
    }

    /// Moves every member to `y`.
    pub fn set_position(&mut self, y: f32) {
        for note in &mut self.notes {
            note.y = y;
        }
    }

    /// True once every member is resolved; the group can then be dropped.
    pub fn is_resolved(&self) -> bool {
        self.notes.iter().all(|n| n.resolved)
    }
}
