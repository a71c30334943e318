pub mod engine;
pub mod record;
pub mod settings;
pub mod song;
pub mod stats;
