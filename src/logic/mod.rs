//! Engine logic outside the per-tick session: the beat clock, the audio
//! seams and the headless runner.

pub mod audio;
pub mod audio_thread;
pub mod conductor;
pub mod headless;
