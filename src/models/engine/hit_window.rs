//! Hit window tiers and the positional judgement classifier.
//!
//! Windows are measured in scroll ticks: a tier of `k` ticks accepts a note
//! whose leading edge is within `k * tick_speed` pixels of the hit line's
//! near edge, or whose trailing edge is within that distance of the far edge.
//! A note centred exactly on the line always qualifies.

use super::constants::{EARLY_TICKS, GREAT_TICKS, HOLD_RELEASE_TICKS, PERFECT_TICKS};
use super::note::{NoteKind, NoteObject};
use super::playfield::HitLine;
use crate::models::stats::Judgement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub perfect_ticks: f32,
    pub great_ticks: f32,
    pub early_ticks: f32,
}

impl HitWindow {
    /// Reference tiers (2, 4 and 6 ticks).
    pub fn new() -> Self {
        Self {
            perfect_ticks: PERFECT_TICKS,
            great_ticks: GREAT_TICKS,
            early_ticks: EARLY_TICKS,
        }
    }

    /// Custom tiers. Values are sorted so the windows stay nested.
    pub fn from_custom(perfect: f32, great: f32, early: f32) -> Self {
        let mut ticks = [perfect.max(0.0), great.max(0.0), early.max(0.0)];
        ticks.sort_by(f32::total_cmp);
        Self {
            perfect_ticks: ticks[0],
            great_ticks: ticks[1],
            early_ticks: ticks[2],
        }
    }

    /// Width of `tier` in ticks. Miss has no window.
    pub fn ticks(&self, tier: Judgement) -> Option<f32> {
        match tier {
            Judgement::Perfect => Some(self.perfect_ticks),
            Judgement::Great => Some(self.great_ticks),
            Judgement::Early => Some(self.early_ticks),
            Judgement::Miss => None,
        }
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether a note sits inside a tier window this tick.
///
/// Input state is not consulted here; the session only asks for a tier
/// once it knows the note's lanes have a matching key event.
#[derive(Debug, Clone, Copy)]
pub struct JudgmentClassifier {
    pub window: HitWindow,
    pub line: HitLine,
    /// Pixels a note travels per tick.
    pub tick_speed: f32,
}

impl JudgmentClassifier {
    pub fn new(window: HitWindow, line: HitLine, tick_speed: f32) -> Self {
        Self {
            window,
            line,
            tick_speed,
        }
    }

    /// Raw window predicate for `tier`, without priority between tiers.
    pub fn satisfies(&self, note: &NoteObject, tier: Judgement) -> bool {
        let Some(ticks) = self.window.ticks(tier) else {
            return false;
        };
        let reach = ticks * self.tick_speed;

        (note.leading_edge() - self.line.near_edge()).abs() <= reach
            || (note.trailing_edge() - self.line.far_edge()).abs() <= reach
            || (note.center() - self.line.center).abs() < f32::EPSILON
    }

    /// Best tier the note currently qualifies for, tested Perfect, Great
    /// then Early.
    fn best_tier(&self, note: &NoteObject) -> Option<Judgement> {
        Judgement::HIT_TIERS
            .into_iter()
            .find(|&tier| self.satisfies(note, tier))
    }

    /// Tier for an instantaneous note (tap, flair and their critical forms,
    /// or a demoted hold release).
    pub fn classify(&self, note: &NoteObject) -> Option<Judgement> {
        if !note.kind.is_instant() {
            return None;
        }
        self.best_tier(note)
    }

    /// Tier for a hold head entering the held state.
    pub fn classify_hold(&self, note: &NoteObject) -> Option<Judgement> {
        if note.kind != NoteKind::HoldHead || !note.alive || note.down {
            return None;
        }
        self.best_tier(note)
    }

    /// Tier for a live hold release marker.
    pub fn classify_release(&self, note: &NoteObject) -> Option<Judgement> {
        if note.kind != NoteKind::HoldRelease {
            return None;
        }
        self.best_tier(note)
    }

    /// True once the head has scrolled beyond every window.
    pub fn is_past(&self, note: &NoteObject) -> bool {
        note.trailing_edge() > self.line.far_edge() + self.window.early_ticks * self.tick_speed
    }

    /// True once a hold's tail has scrolled beyond every window.
    pub fn tail_is_past(&self, note: &NoteObject) -> bool {
        note.tail() > self.line.far_edge() + self.window.early_ticks * self.tick_speed
    }

    /// True once a hold's tail reaches the release check point above the line.
    pub fn tail_at_release_point(&self, note: &NoteObject) -> bool {
        note.tail() >= self.line.center - HOLD_RELEASE_TICKS * self.tick_speed
    }
}
