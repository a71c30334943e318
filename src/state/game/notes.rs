//! Judgement pass over the live note groups.

use super::GameplaySession;
use super::hold::transition;
use super::input::LaneInput;
use super::score::ScoreAggregator;
use crate::logic::audio::{CuePlayer, Playback, SoundCue, cue_for};
use crate::models::engine::{HoldPhase, JudgmentClassifier, NoteKind, NoteObject};
use crate::models::record::ResultSink;
use crate::models::stats::Judgement;
use std::collections::HashSet;

impl<P: Playback, C: CuePlayer, S: ResultSink> GameplaySession<P, C, S> {
    /// Judges every unresolved note of the first `settled` groups, oldest
    /// group first, so an input edge goes to the earliest note that wants it.
    pub(crate) fn judge_groups(&mut self, settled: usize) {
        let mut judge = Judge {
            classifier: &self.classifier,
            input: &mut self.input,
            score: &mut self.score,
            dead_sliders: &mut self.dead_sliders,
            cues: &mut self.pending_cues,
        };

        for group in &mut self.groups[..settled] {
            for note in group.notes.iter_mut().filter(|n| !n.resolved) {
                judge.note(note);
            }
        }

        for lane in judge.input.take_unmatched_presses() {
            log::trace!("ENGINE: Empty press on lane {}", lane + 1);
            judge.cues.push(SoundCue::LaneTap);
        }
    }
}

struct Judge<'a> {
    classifier: &'a JudgmentClassifier,
    input: &'a mut LaneInput,
    score: &'a mut ScoreAggregator,
    dead_sliders: &'a mut HashSet<u32>,
    cues: &'a mut Vec<SoundCue>,
}

impl Judge<'_> {
    fn note(&mut self, note: &mut NoteObject) {
        if note.kind == NoteKind::HoldRelease && self.dead_sliders.contains(&note.note.pair_id) {
            log::debug!(
                "ENGINE: Hold {} broke, its release becomes a tap",
                note.note.pair_id
            );
            note.kind = NoteKind::Tap;
        }

        match note.kind {
            NoteKind::HoldHead => self.hold(note),
            NoteKind::HoldRelease => self.release(note),
            NoteKind::Tap | NoteKind::TapCritical | NoteKind::Flair | NoteKind::FlairCritical => {
                self.instant(note)
            }
        }
    }

    fn instant(&mut self, note: &mut NoteObject) {
        if let Some(tier) = self.classifier.classify(note)
            && self.input.take_press(note.lanes())
        {
            self.hit(note, tier);
        } else if self.classifier.is_past(note) {
            self.miss(note);
        }
    }

    /// A live release marker scores when the player lets go on it.
    fn release(&mut self, note: &mut NoteObject) {
        if let Some(tier) = self.classifier.classify_release(note)
            && self.input.take_release(note.lanes())
        {
            self.hit(note, tier);
        } else if self.classifier.is_past(note) {
            self.miss(note);
        }
    }

    fn hold(&mut self, note: &mut NoteObject) {
        match note.hold {
            HoldPhase::Idle => {
                if let Some(tier) = self.classifier.classify_hold(note)
                    && self.input.take_press(note.lanes())
                {
                    self.set_phase(note, HoldPhase::Down);
                    self.score.record(tier);
                    note.judgement = Some(tier);
                    self.cues.push(cue_for(note.kind, tier, note.note.length));
                } else if self.classifier.is_past(note) {
                    self.set_phase(note, HoldPhase::Broken);
                    self.score.record(Judgement::Miss);
                    note.judgement = Some(Judgement::Miss);
                    self.kill_pair(note);
                }
            }
            HoldPhase::Down => {
                if !self.classifier.tail_at_release_point(note) {
                    return;
                }
                if self.input.any_held(note.lanes()) {
                    self.set_phase(note, HoldPhase::Released);
                } else {
                    self.set_phase(note, HoldPhase::Broken);
                    if let Some(tier) = note.judgement {
                        self.score.revoke(tier);
                    }
                    note.judgement = Some(Judgement::Miss);
                    self.kill_pair(note);
                }
            }
            HoldPhase::Broken => {
                if self.classifier.tail_is_past(note) {
                    note.resolved = true;
                }
            }
            HoldPhase::Released => {}
        }
    }

    fn set_phase(&mut self, note: &mut NoteObject, to: HoldPhase) {
        if let Err(e) = transition(note, to) {
            log::trace!("ENGINE: Ignoring hold transition: {}", e);
        }
    }

    fn kill_pair(&mut self, note: &NoteObject) {
        log::debug!("ENGINE: Hold on lane {} broke", note.note.lane);
        if note.note.pair_id != 0 {
            self.dead_sliders.insert(note.note.pair_id);
        }
    }

    fn hit(&mut self, note: &mut NoteObject, tier: Judgement) {
        self.score.record(tier);
        note.judgement = Some(tier);
        note.resolved = true;
        self.cues.push(cue_for(note.kind, tier, note.note.length));
    }

    fn miss(&mut self, note: &mut NoteObject) {
        log::debug!("ENGINE: Miss on lane {} ({:?})", note.note.lane, note.kind);
        self.score.record(Judgement::Miss);
        note.judgement = Some(Judgement::Miss);
        note.resolved = true;
    }
}
