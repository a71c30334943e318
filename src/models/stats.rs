//! Hit statistics and judgement types.
//!
//! This module defines the judgement tiers used for scoring, the
//! accuracy formula, letter ranks and end-of-session clear types.

use serde::{Deserialize, Serialize};

/// Judgement tiers from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// Inside the tightest window.
    Perfect,
    /// Inside the middle window.
    Great,
    /// Inside the widest window. Breaks combo.
    Early,
    /// Never hit, or a hold that was let go too soon.
    Miss,
}

impl Judgement {
    /// Hit tiers in the order they are tested.
    pub const HIT_TIERS: [Judgement; 3] = [Judgement::Perfect, Judgement::Great, Judgement::Early];

    /// Returns true if this judgement keeps the combo going.
    pub fn keeps_combo(self) -> bool {
        matches!(self, Judgement::Perfect | Judgement::Great)
    }

    /// Accuracy weight of this judgement.
    pub fn weight(self) -> f64 {
        match self {
            Judgement::Perfect => 1.0,
            Judgement::Great => 0.75,
            Judgement::Early => 0.5,
            Judgement::Miss => 0.0,
        }
    }
}

/// Letter rank derived from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 95.0 {
            Rank::S
        } else if accuracy >= 90.0 {
            Rank::A
        } else if accuracy >= 75.0 {
            Rank::B
        } else {
            Rank::C
        }
    }
}

/// End-of-session classification, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClearType {
    #[serde(rename = "NA")]
    NoClear,
    #[serde(rename = "CL")]
    Clear,
    #[serde(rename = "FC")]
    FullCombo,
    #[serde(rename = "AP")]
    AllPerfect,
}

impl ClearType {
    /// Short label shown on song select diamonds.
    pub fn label(self) -> &'static str {
        match self {
            ClearType::NoClear => "NA",
            ClearType::Clear => "CL",
            ClearType::FullCombo => "FC",
            ClearType::AllPerfect => "AP",
        }
    }
}

/// Accumulated judgement counts for a play session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub great: u32,
    pub early: u32,
    pub miss: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notes judged so far.
    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.early + self.miss
    }

    pub fn count(&self, j: Judgement) -> u32 {
        match j {
            Judgement::Perfect => self.perfect,
            Judgement::Great => self.great,
            Judgement::Early => self.early,
            Judgement::Miss => self.miss,
        }
    }

    pub(crate) fn count_mut(&mut self, j: Judgement) -> &mut u32 {
        match j {
            Judgement::Perfect => &mut self.perfect,
            Judgement::Great => &mut self.great,
            Judgement::Early => &mut self.early,
            Judgement::Miss => &mut self.miss,
        }
    }

    /// Calculates accuracy percentage (0-100).
    ///
    /// Perfect weighs 1.0, Great 0.75, Early 0.5, Miss 0.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return 0.0;
        }

        let score = Judgement::HIT_TIERS
            .iter()
            .map(|&j| self.count(j) as f64 * j.weight())
            .sum::<f64>();

        score / total * 100.0
    }

    pub fn clear_type(&self) -> ClearType {
        let total = self.total();
        if total == self.perfect {
            ClearType::AllPerfect
        } else if total == self.perfect + self.great {
            ClearType::FullCombo
        } else if total == self.miss {
            ClearType::NoClear
        } else {
            ClearType::Clear
        }
    }
}

/// Final outcome of a session, handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub clear_type: ClearType,
    pub rank: Rank,
    pub accuracy: f64,
    pub max_combo: u32,
    pub hit_stats: HitStats,
}
