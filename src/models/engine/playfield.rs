//! Playfield geometry and note scrolling.

use super::constants::{HIT_LINE_HEIGHT, HIT_LINE_Y, NOTE_HEIGHT, NOTE_SPEED, REFERENCE_DISTANCE};
use super::note::NoteGroup;

/// The judgement line notes scroll towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitLine {
    /// Vertical center of the line, in pixels from the spawn line.
    pub center: f32,
    pub height: f32,
}

impl HitLine {
    pub fn new(center: f32, height: f32) -> Self {
        Self { center, height }
    }

    /// Edge facing incoming notes.
    pub fn near_edge(&self) -> f32 {
        self.center - self.height / 2.0
    }

    pub fn far_edge(&self) -> f32 {
        self.center + self.height / 2.0
    }
}

/// Configuration for the playfield layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayfieldConfig {
    pub hit_line: HitLine,
    pub note_height: f32,
    /// Distance from the spawn line to the hit line.
    pub travel_distance: f32,
}

impl PlayfieldConfig {
    pub fn new() -> Self {
        Self {
            hit_line: HitLine::new(HIT_LINE_Y, HIT_LINE_HEIGHT),
            note_height: NOTE_HEIGHT,
            travel_distance: HIT_LINE_Y,
        }
    }
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Advances note groups at a constant pixel-per-tick rate.
#[derive(Debug, Clone, Copy)]
pub struct ScrollModel {
    relative_speed: f32,
    /// Head position at which a note is centred on the hit line.
    snap_y: f32,
}

impl ScrollModel {
    pub fn new(playfield: &PlayfieldConfig, reference_distance: f32, note_speed: f32) -> Self {
        Self {
            relative_speed: Self::relative_speed(
                playfield.travel_distance,
                reference_distance,
                note_speed,
            ),
            snap_y: playfield.hit_line.center - playfield.note_height / 2.0,
        }
    }

    /// Pixels per tick, scaled so notes take the same number of ticks to
    /// reach the line whatever the travel distance.
    pub fn relative_speed(travel_distance: f32, reference_distance: f32, note_speed: f32) -> f32 {
        // travel / (reference / speed), multiplied out to keep exact integers exact
        (travel_distance * note_speed / reference_distance).floor().max(1.0)
    }

    pub fn speed(&self) -> f32 {
        self.relative_speed
    }

    pub fn snap_y(&self) -> f32 {
        self.snap_y
    }

    /// Position one tick after `y`. A step that would carry a note across
    /// the line lands exactly on it.
    pub fn next_position(&self, y: f32) -> f32 {
        let next = y + self.relative_speed;
        if y < self.snap_y && next > self.snap_y {
            self.snap_y
        } else {
            next
        }
    }

    /// Moves the group's lead by one tick and aligns the other members on it.
    pub fn advance(&self, group: &mut NoteGroup) {
        if let Some(y) = group.lead_position() {
            group.set_position(self.next_position(y));
        }
    }
}

impl Default for ScrollModel {
    fn default() -> Self {
        Self::new(&PlayfieldConfig::new(), REFERENCE_DISTANCE, NOTE_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::note::{Note, NoteKind};

    #[test]
    fn test_relative_speed_scales_with_travel() {
        assert_eq!(ScrollModel::relative_speed(457.0, 457.0, 30.0), 30.0);
        assert_eq!(ScrollModel::relative_speed(914.0, 457.0, 30.0), 60.0);
        // floor(300 / 15.233) = 19
        assert_eq!(ScrollModel::relative_speed(300.0, 457.0, 30.0), 19.0);
    }

    #[test]
    fn test_advance_snaps_onto_line() {
        let playfield = PlayfieldConfig {
            hit_line: HitLine::new(100.0, 10.0),
            note_height: 10.0,
            travel_distance: 457.0,
        };
        let scroll = ScrollModel::new(&playfield, 457.0, 30.0);
        let notes = [
            Note::new(1, 1, NoteKind::Tap),
            Note::new(4, 1, NoteKind::Tap),
        ];
        let mut group = NoteGroup::new(0, &notes, 10.0, 30.0);

        scroll.advance(&mut group);
        scroll.advance(&mut group);
        scroll.advance(&mut group);
        assert_eq!(group.lead_position(), Some(90.0));
        // 90 + 30 would cross the snap point at 95.
        scroll.advance(&mut group);
        assert_eq!(group.lead_position(), Some(95.0));
        assert_eq!(group.notes[1].y, 95.0);
        // Motion resumes after the snap.
        scroll.advance(&mut group);
        assert_eq!(group.lead_position(), Some(125.0));
    }

    #[test]
    fn test_members_follow_new_lead() {
        let scroll = ScrollModel::default();
        let notes = [
            Note::new(1, 1, NoteKind::Tap),
            Note::new(2, 1, NoteKind::Tap),
        ];
        let mut group = NoteGroup::new(0, &notes, 16.0, 30.0);
        group.notes[0].resolved = true;
        scroll.advance(&mut group);
        assert_eq!(group.notes[1].y, scroll.speed());
        assert_eq!(group.notes[0].y, scroll.speed());
    }
}
