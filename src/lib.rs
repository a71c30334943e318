//! Rhythm game judgement engine.
//!
//! A [`GameplaySession`](state::GameplaySession) plays one chart: it spawns
//! note groups ahead of their beat, scrolls them towards the hit line,
//! judges lane presses against tiered hit windows, runs hold notes through
//! their lifecycle and hands the final result to a [`ResultSink`](models::record::ResultSink).

pub mod logic;
pub mod models;
pub mod shared;
pub mod state;
pub mod system;
