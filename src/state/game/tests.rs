use super::*;
use crate::models::engine::{HoldPhase, Note, NoteKind};
use crate::models::stats::{ClearType, HitStats, Judgement, Rank};

#[derive(Default)]
struct FakePlayback {
    loaded: Vec<String>,
    plays: u32,
    pauses: u32,
    playing: bool,
    position: f64,
}

impl Playback for FakePlayback {
    fn position_ms(&self) -> f64 {
        if self.playing { self.position } else { -1.0 }
    }

    fn play(&mut self) {
        self.plays += 1;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.pauses += 1;
        self.playing = false;
    }

    fn load(&mut self, track: &str) {
        self.loaded.push(track.to_string());
    }
}

#[derive(Default)]
struct RecordingCues {
    batches: Vec<Vec<SoundCue>>,
}

impl RecordingCues {
    fn all(&self) -> Vec<SoundCue> {
        self.batches.iter().flatten().copied().collect()
    }
}

impl CuePlayer for RecordingCues {
    fn play(&mut self, cues: &[SoundCue]) {
        self.batches.push(cues.to_vec());
    }
}

#[derive(Default)]
struct CountingSink {
    submitted: Vec<SessionResult>,
}

impl ResultSink for CountingSink {
    fn submit(&mut self, _difficulty: Difficulty, result: &SessionResult) {
        self.submitted.push(result.clone());
    }
}

type TestSession = GameplaySession<FakePlayback, RecordingCues, CountingSink>;

/// 10ms ticks, 30px per tick, 120 BPM and a lead of 0.3 beats (15 ticks),
/// so notes reach the line on their beat.
fn config() -> EngineConfig {
    EngineConfig {
        target_fps: 100,
        lead_in_ms: 0.0,
        lead_beats: 0.3,
        ..EngineConfig::default()
    }
}

struct Harness {
    session: TestSession,
    now: f64,
}

impl Harness {
    fn new(beats: Vec<(u32, Vec<Note>)>) -> Self {
        Self::with_config(beats, config())
    }

    fn with_config(beats: Vec<(u32, Vec<Note>)>, config: EngineConfig) -> Self {
        let source = SessionChart {
            chart: ChartStore::new(beats.into_iter().collect()).unwrap(),
            bpm: 120.0,
            track: "song.ogg".to_string(),
            difficulty: Difficulty::Normal,
        };
        let session = GameplaySession::new(
            source,
            &config,
            FakePlayback::default(),
            RecordingCues::default(),
            CountingSink::default(),
        )
        .unwrap();
        Self {
            session,
            now: 1000.0,
        }
    }

    fn step(&mut self, held: &[usize]) {
        let mut lanes = [false; NUM_LANES];
        for &lane in held {
            lanes[lane] = true;
        }
        self.session.update(self.now, lanes);
        self.now += 10.0;
    }

    fn steps(&mut self, n: usize, held: &[usize]) {
        for _ in 0..n {
            self.step(held);
        }
    }

    /// Steps until the oldest unresolved note of `kind` lands on the line
    /// during the next tick.
    fn run_until_centered(&mut self, kind: NoteKind, held: &[usize]) {
        for _ in 0..10_000 {
            let scroll = *self.session.scroll();
            let due = self
                .session
                .groups()
                .iter()
                .flat_map(|g| g.notes.iter())
                .find(|n| !n.resolved && n.kind == kind)
                .is_some_and(|n| scroll.next_position(n.y) == scroll.snap_y());
            if due {
                return;
            }
            self.step(held);
        }
        panic!("no {:?} reached the line", kind);
    }

    fn stats(&self) -> HitStats {
        self.session.score().hit_stats().clone()
    }

    fn first_note(&self) -> &crate::models::engine::NoteObject {
        &self.session.groups()[0].notes[0]
    }
}

fn tap(lane: u8) -> Note {
    Note::new(lane, 1, NoteKind::Tap)
}

fn hold_chart() -> Vec<(u32, Vec<Note>)> {
    vec![
        (1, vec![Note::hold(3, 2, 1, 1)]),
        (2, vec![Note::release(3, 2, 1)]),
    ]
}

#[test]
fn test_centered_press_is_perfect() {
    let mut h = Harness::new(vec![(0, vec![tap(1)])]);
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[0]);

    assert_eq!(h.stats().perfect, 1);
    assert_eq!(h.session.score().combo(), 1);
    assert!(h.session.is_finished());
    assert!(h.session.groups().is_empty());
    assert_eq!(h.session.cue_player().all(), vec![SoundCue::LeadPause, SoundCue::TapPerfect]);

    let result = h.session.result().unwrap();
    assert_eq!(result.clear_type, ClearType::AllPerfect);
    assert_eq!(result.rank, Rank::S);
}

#[test]
fn test_early_and_great_tiers() {
    // Leading edge 133px before the line: Early.
    let mut early = Harness::new(vec![(0, vec![tap(1)])]);
    early.steps(10, &[]);
    early.step(&[0]);
    assert_eq!(early.stats().early, 1);
    assert_eq!(early.session.score().combo(), 0);

    // 73px before: Great.
    let mut great = Harness::new(vec![(0, vec![Note::new(2, 1, NoteKind::TapCritical)])]);
    great.steps(12, &[]);
    great.step(&[1]);
    assert_eq!(great.stats().great, 1);
    assert_eq!(great.session.score().combo(), 1);
    assert!(great.session.cue_player().all().contains(&SoundCue::TapCrit));
}

#[test]
fn test_press_outside_window_waits() {
    let mut h = Harness::new(vec![(0, vec![tap(1)])]);
    h.steps(3, &[]);
    h.step(&[0]);
    assert_eq!(h.stats().total(), 0);
    assert_eq!(h.session.cue_player().all(), vec![SoundCue::LeadPause, SoundCue::LaneTap]);
}

#[test]
fn test_unpressed_note_misses_once_past() {
    let mut h = Harness::new(vec![(0, vec![tap(1)])]);
    h.steps(22, &[]);
    assert_eq!(h.stats().total(), 0);
    h.step(&[]);
    assert_eq!(h.stats().miss, 1);

    let result = h.session.result().unwrap();
    assert_eq!(result.clear_type, ClearType::NoClear);
    assert_eq!(result.rank, Rank::C);
    assert_eq!(result.accuracy, 0.0);
}

#[test]
fn test_held_key_scores_once() {
    let mut h = Harness::new(vec![(0, vec![tap(1), tap(1)])]);
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[0]);
    // The key stays down while the second note crosses the whole window.
    h.steps(10, &[0]);

    let stats = h.stats();
    assert_eq!(stats.perfect, 1);
    assert_eq!(stats.miss, 1);
    assert_eq!(h.session.score().max_combo(), 1);
}

#[test]
fn test_group_kept_until_every_member_resolves() {
    let mut h = Harness::new(vec![(0, vec![tap(1), tap(5)])]);
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[0]);

    assert_eq!(h.session.groups().len(), 1);
    assert!(h.first_note().resolved);
    assert!(!h.session.groups()[0].notes[1].resolved);

    h.steps(10, &[]);
    assert!(h.session.groups().is_empty());
    assert_eq!(h.stats().miss, 1);
}

#[test]
fn test_wide_note_hit_from_any_lane() {
    let mut h = Harness::new(vec![(0, vec![Note::new(5, 3, NoteKind::Flair)])]);
    h.run_until_centered(NoteKind::Flair, &[]);
    h.step(&[6]);
    assert_eq!(h.stats().perfect, 1);
    assert!(h.session.cue_player().all().contains(&SoundCue::Flair));
}

#[test]
fn test_hold_released() {
    let mut h = Harness::new(hold_chart());
    h.run_until_centered(NoteKind::HoldHead, &[]);
    h.step(&[2, 3]);

    assert_eq!(h.first_note().hold, HoldPhase::Down);
    assert!(h.first_note().down);
    assert_eq!(h.stats().perfect, 1);
    assert!(h.session.cue_player().all().contains(&SoundCue::Hold { beats: 1 }));

    h.run_until_centered(NoteKind::HoldRelease, &[2, 3]);
    h.step(&[]);

    let stats = h.stats();
    assert_eq!(stats.perfect, 2);
    assert_eq!(stats.miss, 0);
    assert!(h.session.dead_sliders().is_empty());
    assert_eq!(
        h.session.result().map(|r| r.clear_type),
        Some(ClearType::AllPerfect)
    );
}

#[test]
fn test_hold_let_go_early_breaks() {
    let mut h = Harness::new(hold_chart());
    h.run_until_centered(NoteKind::HoldHead, &[]);
    h.step(&[2, 3]);
    h.steps(50, &[]);

    let head = h.first_note();
    assert_eq!(head.hold, HoldPhase::Broken);
    assert!(!head.alive);
    assert!(!head.resolved);
    assert_eq!(h.stats().perfect, 0);
    assert_eq!(h.stats().miss, 1);
    assert!(h.session.dead_sliders().contains(&1));
    assert!(h.session.snapshot().notes.iter().any(|n| !n.alive));

    // The release marker now plays as a tap.
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[2]);

    let stats = h.stats();
    assert_eq!(stats.perfect, 1);
    assert_eq!(stats.miss, 1);
    assert_eq!(stats.total(), 2);
    assert!(h.session.is_finished());
    assert_eq!(h.session.cue_player().all().last(), Some(&SoundCue::TapPerfect));
}

#[test]
fn test_unpressed_hold_breaks_and_stays_drawn() {
    let mut h = Harness::new(hold_chart());
    h.steps(30, &[]);

    let head = h.first_note();
    assert_eq!(head.hold, HoldPhase::Broken);
    assert_eq!(head.judgement, Some(Judgement::Miss));
    assert!(!head.resolved);
    assert_eq!(h.stats().miss, 1);
    assert!(h.session.dead_sliders().contains(&1));

    h.steps(200, &[]);
    assert_eq!(h.stats().miss, 2);
    assert!(h.session.groups().is_empty());
    assert_eq!(
        h.session.result().map(|r| r.clear_type),
        Some(ClearType::NoClear)
    );
}

#[test]
fn test_final_unpaired_hold_let_go_early_breaks() {
    let mut h = Harness::new(vec![(1, vec![Note::hold(3, 1, 4, 0)])]);
    h.run_until_centered(NoteKind::HoldHead, &[]);
    h.step(&[2]);
    assert_eq!(h.stats().perfect, 1);

    // Every note counts as judged, but the hold is still down.
    h.steps(50, &[]);
    assert_eq!(h.first_note().hold, HoldPhase::Down);
    assert!(!h.session.is_finished());
    assert!(h.session.sink().submitted.is_empty());

    h.steps(300, &[]);
    let stats = h.stats();
    assert_eq!(stats.perfect, 0);
    assert_eq!(stats.miss, 1);
    assert!(h.session.is_finished());
    assert_eq!(h.session.sink().submitted.len(), 1);
    assert_eq!(
        h.session.result().map(|r| r.clear_type),
        Some(ClearType::NoClear)
    );
}

#[test]
fn test_final_unpaired_hold_kept_down_is_released() {
    let mut h = Harness::new(vec![(1, vec![Note::hold(3, 1, 4, 0)])]);
    h.run_until_centered(NoteKind::HoldHead, &[]);
    h.step(&[2]);
    h.steps(100, &[2]);
    assert!(!h.session.is_finished());

    h.steps(200, &[2]);
    assert!(h.session.is_finished());
    assert!(h.session.groups().is_empty());
    assert_eq!(h.stats().perfect, 1);
    assert_eq!(
        h.session.result().map(|r| r.clear_type),
        Some(ClearType::AllPerfect)
    );
}

#[test]
fn test_hold_outlasting_last_tap_can_still_break() {
    let mut h = Harness::new(vec![
        (1, vec![Note::hold(1, 1, 8, 0)]),
        (3, vec![tap(5)]),
    ]);
    h.run_until_centered(NoteKind::HoldHead, &[]);
    h.step(&[0]);
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[4]);

    assert_eq!(h.stats().perfect, 2);
    assert!(!h.session.is_finished());

    h.steps(600, &[]);
    let stats = h.stats();
    assert_eq!(stats.perfect, 1);
    assert_eq!(stats.miss, 1);
    assert!(h.session.is_finished());
    assert_eq!(
        h.session.result().map(|r| r.clear_type),
        Some(ClearType::NoClear)
    );
}

#[test]
fn test_result_submitted_once() {
    let mut h = Harness::new(vec![(0, vec![tap(1)])]);
    h.run_until_centered(NoteKind::Tap, &[]);
    h.step(&[0]);
    let first = h.session.result().cloned();
    h.steps(5, &[0]);

    assert_eq!(h.session.sink().submitted.len(), 1);
    assert_eq!(h.session.result().cloned(), first);
    assert_eq!(h.session.phase(), SessionPhase::Finished);
}

#[test]
fn test_lead_in_then_playback() {
    let mut h = Harness::with_config(
        vec![(40, vec![tap(1)])],
        EngineConfig {
            lead_in_ms: 100.0,
            ..config()
        },
    );
    h.steps(10, &[]);
    assert_eq!(h.session.playback().loaded, vec!["song.ogg".to_string()]);
    assert_eq!(h.session.playback().plays, 0);
    assert_eq!(h.session.phase(), SessionPhase::LeadIn);

    h.step(&[]);
    assert_eq!(h.session.playback().plays, 1);
    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.session.clock().beat_count(), 0);

    h.session.playback_mut().position = 1200.0;
    h.step(&[]);
    assert_eq!(h.session.clock().beat_count(), 2);
}

#[test]
fn test_teardown_ends_without_result() {
    let mut h = Harness::new(vec![(0, vec![tap(1)])]);
    h.steps(5, &[]);
    h.session.teardown();
    h.session.teardown();

    assert_eq!(h.session.phase(), SessionPhase::TornDown);
    assert_eq!(h.session.playback().pauses, 1);

    h.steps(50, &[]);
    assert_eq!(h.stats().total(), 0);
    assert!(h.session.sink().submitted.is_empty());
    assert!(h.session.result().is_none());
}

#[test]
fn test_snapshot() {
    let mut h = Harness::new(vec![(0, vec![tap(2)])]);
    h.steps(4, &[7]);

    let snap = h.session.snapshot();
    assert_eq!(snap.notes.len(), 1);
    assert_eq!(snap.notes[0].lane, 2);
    assert_eq!(snap.notes[0].y, 90.0);
    assert!(snap.keys_held[7]);
    assert_eq!(snap.remaining_notes, 1);
    assert_eq!(snap.hit_line_y, 457.0);
    assert!(!snap.finished);
}

#[test]
fn test_unmapped_difficulty_refuses_to_start() {
    let song = SongData::parse(
        r#"
name = "x"
bpm_semiquaver = 480

[map_easy]
"0" = [{ l = 1, w = 1, t = "t" }]
"#,
    )
    .unwrap();
    assert!(SessionChart::from_song(&song, Difficulty::Easy).is_ok());
    assert_eq!(
        SessionChart::from_song(&song, Difficulty::Master).err(),
        Some(ChartError::Empty)
    );
}
