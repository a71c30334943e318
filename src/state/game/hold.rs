//! Hold note lifecycle: `Idle -> Down -> Released | Broken`, or
//! `Idle -> Broken` when the head is never pressed.

use crate::models::engine::{HoldPhase, NoteObject};

/// A hold transition that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldStateError {
    /// The hold already finished.
    Terminal(HoldPhase),
    /// No edge between these phases.
    Invalid { from: HoldPhase, to: HoldPhase },
}

impl std::fmt::Display for HoldStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldStateError::Terminal(phase) => {
                write!(f, "Hold already ended in {:?}", phase)
            }
            HoldStateError::Invalid { from, to } => {
                write!(f, "No hold transition from {:?} to {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for HoldStateError {}

/// Moves `note` to `to` and updates its flags. Returns the phase it left.
///
/// A Broken hold stays unresolved so it keeps being drawn until its tail
/// leaves the screen; the caller resolves it then.
pub fn transition(note: &mut NoteObject, to: HoldPhase) -> Result<HoldPhase, HoldStateError> {
    let from = note.hold;
    if from.is_terminal() {
        return Err(HoldStateError::Terminal(from));
    }

    match (from, to) {
        (HoldPhase::Idle, HoldPhase::Down) => {
            note.down = true;
        }
        (HoldPhase::Down, HoldPhase::Released) => {
            note.down = false;
            note.resolved = true;
        }
        (HoldPhase::Idle | HoldPhase::Down, HoldPhase::Broken) => {
            note.down = false;
            note.alive = false;
        }
        _ => return Err(HoldStateError::Invalid { from, to }),
    }

    note.hold = to;
    Ok(from)
}
