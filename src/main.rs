//! Headless entry point: plays one chart with autoplay and prints the result.
//!
//! Usage: `beatline <song.toml> [difficulty] [miss-rate]`

use beatline::logic::audio::AudioManager;
use beatline::logic::audio_thread;
use beatline::logic::headless::{Autoplay, run_autoplay};
use beatline::models::record::{BestRecord, BestRecords};
use beatline::models::settings::EngineConfig;
use beatline::models::song::{Difficulty, SongData};
use beatline::models::stats::SessionResult;
use beatline::system::bus::AudioBus;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Serialize)]
struct RunReport<'a> {
    song: &'a str,
    difficulty: Difficulty,
    level: u32,
    seed: u64,
    result: SessionResult,
    best: Option<BestRecord>,
    cues: u32,
}

fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(song_path) = args.first().map(PathBuf::from) else {
        eprintln!("usage: beatline <song.toml> [easy|normal|hard|master] [miss-rate]");
        return ExitCode::FAILURE;
    };
    let difficulty = match args.get(1) {
        Some(name) => match Difficulty::from_name(name) {
            Some(d) => d,
            None => {
                log::error!("MAIN: Unknown difficulty {:?}", name);
                return ExitCode::FAILURE;
            }
        },
        None => Difficulty::Easy,
    };
    let miss_rate = match args.get(2).map(|s| s.parse::<f64>()) {
        Some(Ok(rate)) if (0.0..=1.0).contains(&rate) => rate,
        Some(_) => {
            log::error!("MAIN: miss-rate must be a number between 0 and 1");
            return ExitCode::FAILURE;
        }
        None => 0.0,
    };

    log::info!("MAIN: Booting beatline...");
    let config = EngineConfig::load(Path::new("config.toml"));

    let song = match SongData::load(&song_path) {
        Ok(song) => song,
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let bus = AudioBus::new();
    let audio = match audio_thread::start_audio_thread(&bus) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("MAIN: Failed to start audio thread: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let cues = AudioManager::new(&bus);
    drop(bus);

    let seed: u64 = rand::random();
    let mut autoplay = Autoplay::new(miss_rate, seed);
    let mut records = BestRecords::new();
    let outcome = run_autoplay(&song, difficulty, &config, &mut autoplay, cues, &mut records);

    // The session (and its sender) is gone, so the audio thread winds down.
    let cue_count = match audio.join() {
        Ok(tally) => tally.total_cues(),
        Err(_) => {
            log::warn!("MAIN: Audio thread panicked");
            0
        }
    };

    let result = match outcome {
        Ok(Some(result)) => result,
        Ok(None) => {
            log::error!("MAIN: Session did not finish");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = RunReport {
        song: &song.name,
        difficulty,
        level: song.level(difficulty),
        seed,
        result,
        best: records.get(difficulty).copied(),
        cues: cue_count,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("MAIN: Failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}
