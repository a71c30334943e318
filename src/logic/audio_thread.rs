//! Audio backend thread for runs without an output device.
//!
//! Drains the command channel, logs what a real mixer would play and tallies
//! the cues. The thread exits once every sender is gone.

use crate::logic::audio::SoundCue;
use crate::system::bus::{AudioBus, AudioCommand};
use std::collections::HashMap;
use std::thread::{self, JoinHandle};

/// What the backend received over its lifetime.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AudioTally {
    pub loaded: Vec<String>,
    pub plays: u32,
    pub pauses: u32,
    pub cues: HashMap<SoundCue, u32>,
}

impl AudioTally {
    pub fn total_cues(&self) -> u32 {
        self.cues.values().sum()
    }

    fn handle_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Load { track } => {
                log::info!("AUDIO: Loading {:?}", track);
                self.loaded.push(track);
            }
            AudioCommand::Play => self.plays += 1,
            AudioCommand::Pause => self.pauses += 1,
            AudioCommand::Cues(cues) => {
                log::debug!("AUDIO: {:?}", cues);
                for cue in cues {
                    *self.cues.entry(cue).or_insert(0) += 1;
                }
            }
        }
    }
}

/// Spawns the silent backend. The caller must drop its own copies of the
/// bus senders for the thread to finish.
pub fn start_audio_thread(bus: &AudioBus) -> std::io::Result<JoinHandle<AudioTally>> {
    let rx = bus.audio_cmd_rx.clone();
    thread::Builder::new()
        .name("Audio Thread".to_string())
        .spawn(move || {
            log::info!("AUDIO: Thread started (silent mode)");
            let mut tally = AudioTally::default();
            for cmd in rx.iter() {
                tally.handle_command(cmd);
            }
            log::info!("AUDIO: Thread stopped after {} cues", tally.total_cues());
            tally
        })
}
