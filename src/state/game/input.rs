//! Edge-detected lane input.
//!
//! The input collaborator reports which lanes are held each tick. Only the
//! transitions matter to judgement: a press edge can score at most one note
//! and a lane held across ticks never scores twice.

use crate::models::engine::NUM_LANES;
use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct LaneInput {
    held: [bool; NUM_LANES],
    /// Press edges not yet consumed this tick.
    pressed: [bool; NUM_LANES],
    /// Release edges not yet consumed this tick.
    released: [bool; NUM_LANES],
}

impl LaneInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records this tick's lane state and derives its edges.
    /// Edges left over from the previous tick are dropped.
    pub fn poll(&mut self, lanes: [bool; NUM_LANES]) {
        for (i, &down) in lanes.iter().enumerate() {
            self.pressed[i] = down && !self.held[i];
            self.released[i] = !down && self.held[i];
        }
        self.held = lanes;
    }

    pub fn held(&self) -> [bool; NUM_LANES] {
        self.held
    }

    pub fn any_held(&self, span: Range<usize>) -> bool {
        self.held[span].iter().any(|&h| h)
    }

    /// Consumes every press edge in `span`. Returns true if there was one.
    pub fn take_press(&mut self, span: Range<usize>) -> bool {
        take_edges(&mut self.pressed[span])
    }

    /// Consumes every release edge in `span`. Returns true if there was one.
    pub fn take_release(&mut self, span: Range<usize>) -> bool {
        take_edges(&mut self.released[span])
    }

    /// Consumes the press edges no note claimed, returning their lanes.
    pub fn take_unmatched_presses(&mut self) -> Vec<usize> {
        let lanes = (0..NUM_LANES).filter(|&i| self.pressed[i]).collect();
        self.pressed = [false; NUM_LANES];
        lanes
    }
}

fn take_edges(edges: &mut [bool]) -> bool {
    let found = edges.iter().any(|&e| e);
    edges.fill(false);
    found
}
