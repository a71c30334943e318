//! Running score: tier counts, combo, accuracy and the final result.

use crate::models::record::ResultSink;
use crate::models::song::Difficulty;
use crate::models::stats::{HitStats, Judgement, Rank, SessionResult};

#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    hit_stats: HitStats,
    combo: u32,
    max_combo: u32,
    /// Notes the chart holds; the session is complete once this many are judged.
    note_count: u32,
    result: Option<SessionResult>,
}

impl ScoreAggregator {
    pub fn new(note_count: u32) -> Self {
        Self {
            hit_stats: HitStats::new(),
            combo: 0,
            max_combo: 0,
            note_count,
            result: None,
        }
    }

    pub fn record(&mut self, tier: Judgement) {
        *self.hit_stats.count_mut(tier) += 1;
        if tier.keeps_combo() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
    }

    /// Takes back a tier already recorded and counts a miss in its place.
    pub fn revoke(&mut self, tier: Judgement) {
        let count = self.hit_stats.count_mut(tier);
        *count = count.saturating_sub(1);
        self.hit_stats.miss += 1;
        self.combo = 0;
    }

    pub fn hit_stats(&self) -> &HitStats {
        &self.hit_stats
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn note_count(&self) -> u32 {
        self.note_count
    }

    pub fn compute_accuracy(&self) -> (f64, Rank) {
        let accuracy = self.hit_stats.calculate_accuracy();
        (accuracy, Rank::from_accuracy(accuracy))
    }

    pub fn is_complete(&self) -> bool {
        self.hit_stats.total() >= self.note_count
    }

    /// Final result, once every note is judged.
    ///
    /// The first successful call submits to `sink`. Later calls return the
    /// same result without submitting again.
    pub fn finalize<S: ResultSink>(
        &mut self,
        sink: &mut S,
        difficulty: Difficulty,
    ) -> Option<SessionResult> {
        if let Some(result) = &self.result {
            return Some(result.clone());
        }
        if !self.is_complete() {
            return None;
        }

        let (accuracy, rank) = self.compute_accuracy();
        let result = SessionResult {
            clear_type: self.hit_stats.clear_type(),
            rank,
            accuracy,
            max_combo: self.max_combo,
            hit_stats: self.hit_stats.clone(),
        };
        sink.submit(difficulty, &result);
        self.result = Some(result.clone());
        Some(result)
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}
