pub mod chart;
pub mod constants;
pub mod hit_window;
pub mod note;
pub mod playfield;

pub use chart::{ChartError, ChartStore};
pub use constants::*;
pub use hit_window::{HitWindow, JudgmentClassifier};
pub use note::{HoldPhase, Note, NoteGroup, NoteKind, NoteObject};
pub use playfield::{HitLine, PlayfieldConfig, ScrollModel};
