//! Result persistence seam and the in-memory best-record table.

use crate::models::song::Difficulty;
use crate::models::stats::{ClearType, Rank, SessionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Receives a session's final result. Called exactly once per session.
pub trait ResultSink {
    fn submit(&mut self, difficulty: Difficulty, result: &SessionResult);
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn submit(&mut self, difficulty: Difficulty, result: &SessionResult) {
        (**self).submit(difficulty, result);
    }
}

/// Best outcome ever recorded on one difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRecord {
    pub clear_type: ClearType,
    pub rank: Rank,
    pub plays: u32,
}

impl BestRecord {
    /// Keeps the better of each field independently.
    pub fn merge(&mut self, result: &SessionResult) {
        self.clear_type = self.clear_type.max(result.clear_type);
        self.rank = self.rank.max(result.rank);
        self.plays += 1;
    }
}

/// Per-difficulty best records of one song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestRecords {
    records: BTreeMap<Difficulty, BestRecord>,
}

impl BestRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, difficulty: Difficulty) -> Option<&BestRecord> {
        self.records.get(&difficulty)
    }
}

impl ResultSink for BestRecords {
    fn submit(&mut self, difficulty: Difficulty, result: &SessionResult) {
        let record = self
            .records
            .entry(difficulty)
            .and_modify(|r| r.merge(result))
            .or_insert(BestRecord {
                clear_type: result.clear_type,
                rank: result.rank,
                plays: 1,
            });
        log::info!(
            "RECORD: {} best is now {} / {:?} after {} plays",
            difficulty,
            record.clear_type.label(),
            record.rank,
            record.plays
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::HitStats;

    fn result(clear_type: ClearType, rank: Rank) -> SessionResult {
        SessionResult {
            clear_type,
            rank,
            accuracy: 0.0,
            max_combo: 0,
            hit_stats: HitStats::new(),
        }
    }

    #[test]
    fn test_merge_keeps_best_fields() {
        let mut records = BestRecords::new();
        records.submit(Difficulty::Hard, &result(ClearType::FullCombo, Rank::B));
        records.submit(Difficulty::Hard, &result(ClearType::Clear, Rank::S));
        records.submit(Difficulty::Hard, &result(ClearType::NoClear, Rank::C));

        let best = records.get(Difficulty::Hard).unwrap();
        assert_eq!(best.clear_type, ClearType::FullCombo);
        assert_eq!(best.rank, Rank::S);
        assert_eq!(best.plays, 3);
        assert!(records.get(Difficulty::Easy).is_none());
    }

    #[test]
    fn test_sink_through_reference() {
        fn submit_into<S: ResultSink>(mut sink: S) {
            sink.submit(Difficulty::Easy, &result(ClearType::AllPerfect, Rank::S));
        }

        let mut records = BestRecords::new();
        submit_into(&mut records);
        assert_eq!(
            records.get(Difficulty::Easy).map(|r| r.clear_type),
            Some(ClearType::AllPerfect)
        );
    }
}
