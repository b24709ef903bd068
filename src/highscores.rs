//! Per-difficulty records
//!
//! Best score and best combo for each tier, persisted as one JSON blob:
//! `{"highScores":{"easy":0,...},"bestCombos":{"easy":0,...}}`.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::settings::Difficulty;

/// One value per difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TierScores {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

impl TierScores {
    pub fn get(&self, tier: Difficulty) -> u64 {
        match tier {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn slot_mut(&mut self, tier: Difficulty) -> &mut u64 {
        match tier {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Store `value` if it beats the current one, returns whether it did
    fn raise(&mut self, tier: Difficulty, value: u64) -> bool {
        let slot = self.slot_mut(tier);
        if value > *slot {
            *slot = value;
            true
        } else {
            false
        }
    }
}

/// Which parts of the record a finished round improved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub new_high_score: bool,
    pub new_best_combo: bool,
}

impl RecordOutcome {
    /// True if either record was beaten
    pub fn is_new_record(&self) -> bool {
        self.new_high_score || self.new_best_combo
    }
}

/// High-score record keyed by difficulty tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct HighScores {
    pub high_scores: TierScores,
    pub best_combos: TierScores,
}

impl HighScores {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "obzvon_records";

    /// Create an all-zero record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_score(&self, tier: Difficulty) -> u64 {
        self.high_scores.get(tier)
    }

    pub fn best_combo(&self, tier: Difficulty) -> u32 {
        // Stored blobs may carry anything up to u64
        u32::try_from(self.best_combos.get(tier)).unwrap_or(u32::MAX)
    }

    /// Fold a finished round into the record.
    ///
    /// Score and combo are compared independently; each is replaced only when
    /// strictly beaten.
    pub fn record(&mut self, tier: Difficulty, score: u64, max_combo: u32) -> RecordOutcome {
        RecordOutcome {
            new_high_score: self.high_scores.raise(tier, score),
            new_best_combo: self.best_combos.raise(tier, u64::from(max_combo)),
        }
    }

    /// Load the record (zeros when absent or malformed)
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let scores: HighScores = load_json(store, Self::STORAGE_KEY);
        log::info!(
            "Loaded records (easy {}, medium {}, hard {})",
            scores.high_scores.easy,
            scores.high_scores.medium,
            scores.high_scores.hard
        );
        scores
    }

    /// Save the record
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Records saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_record_improves_independently() {
        let mut scores = HighScores::new();
        scores.high_scores.easy = 500;
        scores.best_combos.easy = 8;

        // Lower score, better combo
        let outcome = scores.record(Difficulty::Easy, 480, 12);
        assert!(!outcome.new_high_score);
        assert!(outcome.new_best_combo);
        assert!(outcome.is_new_record());
        assert_eq!(scores.best_score(Difficulty::Easy), 500);
        assert_eq!(scores.best_combo(Difficulty::Easy), 12);

        // Other tiers untouched
        assert_eq!(scores.best_score(Difficulty::Hard), 0);
    }

    #[test]
    fn test_record_unchanged_when_not_beaten() {
        let mut scores = HighScores::new();
        scores.high_scores.easy = 500;
        scores.best_combos.easy = 10;

        let outcome = scores.record(Difficulty::Easy, 480, 10);
        assert_eq!(outcome, RecordOutcome::default());
        assert!(!outcome.is_new_record());
        assert_eq!(scores.best_score(Difficulty::Easy), 500);

        // Equal is not an improvement
        let outcome = scores.record(Difficulty::Easy, 500, 3);
        assert!(!outcome.new_high_score);
    }

    #[test]
    fn test_json_shape() {
        let mut scores = HighScores::new();
        scores.record(Difficulty::Medium, 1234, 17);
        let json = serde_json::to_value(&scores).unwrap();
        assert_eq!(json["highScores"]["medium"], 1234);
        assert_eq!(json["bestCombos"]["medium"], 17);
        assert_eq!(json["highScores"]["easy"], 0);
        assert_eq!(json["bestCombos"]["hard"], 0);
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let mut store = MemoryStore::new();
        assert_eq!(HighScores::load(&store), HighScores::new());

        store.set_item(HighScores::STORAGE_KEY, "][");
        assert_eq!(HighScores::load(&store), HighScores::new());

        // Partial blobs keep whatever is present
        store.set_item(HighScores::STORAGE_KEY, r#"{"highScores":{"hard":90}}"#);
        let scores = HighScores::load(&store);
        assert_eq!(scores.best_score(Difficulty::Hard), 90);
        assert_eq!(scores.best_combo(Difficulty::Hard), 0);
    }

    #[test]
    fn test_oversized_stored_combo_saturates() {
        let mut store = MemoryStore::new();
        store.set_item(
            HighScores::STORAGE_KEY,
            r#"{"bestCombos":{"easy":4294967297}}"#,
        );
        let mut scores = HighScores::load(&store);
        assert_eq!(scores.best_combo(Difficulty::Easy), u32::MAX);

        // A real combo can never beat it
        let outcome = scores.record(Difficulty::Easy, 0, u32::MAX);
        assert!(!outcome.new_best_combo);
    }

    #[test]
    fn test_save_roundtrip() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.record(Difficulty::Hard, 777, 21);
        scores.save(&mut store);
        assert_eq!(HighScores::load(&store), scores);
    }
}
