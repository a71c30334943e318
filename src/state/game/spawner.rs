//! Materializes chart beats as note groups ahead of their hit time.

use crate::logic::conductor::{BeatClock, ExhaustedError};
use crate::models::engine::{ChartStore, NoteGroup};

#[derive(Debug, Clone)]
pub struct NoteSpawner {
    /// How long before its hit time a beat is spawned.
    lead_ms: f64,
    /// Elapsed session time at which beat 0 is due.
    song_start_offset_ms: f64,
    ms_per_beat: f64,
    note_height: f32,
    /// Pixels the playfield scrolls during one beat.
    px_per_beat: f32,
    next_beat: Option<u32>,
    started: bool,
    exhausted: bool,
}

impl NoteSpawner {
    pub fn new(
        clock: &BeatClock,
        lead_beats: f64,
        song_start_offset_ms: f64,
        note_height: f32,
        px_per_beat: f32,
    ) -> Self {
        Self {
            lead_ms: clock.ms_per_beat() * lead_beats,
            song_start_offset_ms,
            ms_per_beat: clock.ms_per_beat(),
            note_height,
            px_per_beat,
            next_beat: None,
            started: false,
            exhausted: false,
        }
    }

    pub fn lead_ms(&self) -> f64 {
        self.lead_ms
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns the groups due at `now_ms`, oldest first.
    ///
    /// The first call always spawns the first authored beat. After that a
    /// beat spawns once `elapsed + lead >= offset + beat * ms_per_beat`;
    /// several beats can come due in a single call.
    pub fn maybe_spawn(
        &mut self,
        now_ms: f64,
        session_start_ms: f64,
        clock: &mut BeatClock,
        chart: &ChartStore,
    ) -> Result<Vec<NoteGroup>, ExhaustedError> {
        let mut spawned = Vec::new();
        if self.exhausted {
            return Ok(spawned);
        }

        if !self.started {
            self.started = true;
            let first = clock.next_chart_beat()?;
            spawned.push(self.spawn(first, chart));
            self.advance_from(first, clock)?;
        }

        let elapsed = now_ms - session_start_ms;
        while let Some(beat) = self.next_beat {
            let due_ms = self.song_start_offset_ms + beat as f64 * self.ms_per_beat;
            if elapsed + self.lead_ms < due_ms {
                break;
            }
            spawned.push(self.spawn(beat, chart));
            self.advance_from(beat, clock)?;
        }

        Ok(spawned)
    }

    fn spawn(&self, beat: u32, chart: &ChartStore) -> NoteGroup {
        let notes = chart.notes_at(beat).unwrap_or_default();
        log::debug!("ENGINE: Spawning beat {} ({} notes)", beat, notes.len());
        NoteGroup::new(beat, notes, self.note_height, self.px_per_beat)
    }

    /// Moves the cursor past `beat`, stopping at the final one.
    fn advance_from(&mut self, beat: u32, clock: &mut BeatClock) -> Result<(), ExhaustedError> {
        if Some(beat) == clock.final_beat() {
            self.exhausted = true;
            self.next_beat = None;
            log::debug!("ENGINE: Chart exhausted at beat {}", beat);
        } else {
            self.next_beat = Some(clock.next_chart_beat()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::{Note, NoteKind};
    use std::collections::BTreeMap;

    fn chart(beats: &[u32]) -> ChartStore {
        let map: BTreeMap<u32, Vec<Note>> = beats
            .iter()
            .map(|&b| (b, vec![Note::new(1, 1, NoteKind::Tap)]))
            .collect();
        ChartStore::new(map).unwrap()
    }

    #[test]
    fn test_first_call_spawns_first_beat() {
        let chart = chart(&[40, 80]);
        let mut clock = BeatClock::new(120.0, &chart).unwrap();
        let mut spawner = NoteSpawner::new(&clock, 2.1, 5000.0, 16.0, 30.0);

        let groups = spawner.maybe_spawn(0.0, 0.0, &mut clock, &chart).unwrap();
        assert_eq!(groups.iter().map(|g| g.beat).collect::<Vec<_>>(), vec![40]);
        assert!(!spawner.is_exhausted());
    }

    #[test]
    fn test_spawn_lead_time() {
        // 120 BPM: 0.5s per beat, lead 2.1 beats = 1050ms.
        // Beat 10 is due at 5000 + 5000 = 10000ms, so it spawns at 8950ms.
        let chart = chart(&[0, 10, 20]);
        let mut clock = BeatClock::new(120.0, &chart).unwrap();
        let mut spawner = NoteSpawner::new(&clock, 2.1, 5000.0, 16.0, 30.0);
        assert_eq!(spawner.lead_ms(), 1050.0);

        let start = 1_000.0;
        let mut spawned_at = None;
        let mut elapsed = 0.0;
        while elapsed <= 20_000.0 {
            let groups = spawner
                .maybe_spawn(start + elapsed, start, &mut clock, &chart)
                .unwrap();
            if groups.iter().any(|g| g.beat == 10) {
                spawned_at = Some(elapsed);
                break;
            }
            elapsed += 10.0;
        }

        let spawned_at = spawned_at.unwrap();
        assert!(spawned_at <= 5000.0 + 10.0 * 500.0 - 2.1 * 500.0);
        assert!(spawned_at > 8940.0 - 1e-6);
    }

    #[test]
    fn test_coarse_tick_spawns_every_due_beat() {
        let chart = chart(&[0, 1, 2, 3]);
        let mut clock = BeatClock::new(120.0, &chart).unwrap();
        let mut spawner = NoteSpawner::new(&clock, 2.1, 0.0, 16.0, 30.0);

        let first = spawner.maybe_spawn(0.0, 0.0, &mut clock, &chart).unwrap();
        // Beats 0, 1 and 2 are all within the lead at t=0.
        assert_eq!(first.iter().map(|g| g.beat).collect::<Vec<_>>(), vec![0, 1, 2]);

        let later = spawner.maybe_spawn(10_000.0, 0.0, &mut clock, &chart).unwrap();
        assert_eq!(later.iter().map(|g| g.beat).collect::<Vec<_>>(), vec![3]);
        assert!(spawner.is_exhausted());
        assert!(clock.is_exhausted());

        // Nothing further, and no cursor error.
        assert!(spawner.maybe_spawn(20_000.0, 0.0, &mut clock, &chart).unwrap().is_empty());
    }

    #[test]
    fn test_single_beat_chart() {
        let chart = chart(&[7]);
        let mut clock = BeatClock::new(120.0, &chart).unwrap();
        let mut spawner = NoteSpawner::new(&clock, 2.1, 5000.0, 16.0, 30.0);
        let groups = spawner.maybe_spawn(0.0, 0.0, &mut clock, &chart).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(spawner.is_exhausted());
    }
}
