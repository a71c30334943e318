//! Gameplay state.

pub mod game;

pub use game::{GameplaySession, SessionChart, SessionPhase};
