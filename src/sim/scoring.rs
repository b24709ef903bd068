//! Hit rating, combo multiplier and accuracy
//!
//! Every function here is pure over `RoundState`; nothing reads a clock.

use serde::{Deserialize, Serialize};

use super::state::RoundState;
use crate::consts::*;

/// Rating tier shown in the hit popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Perfect,
    Great,
    Good,
}

impl Rating {
    /// CSS class / label
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Perfect => "perfect",
            Rating::Great => "great",
            Rating::Good => "good",
        }
    }
}

/// Outcome of a resolved hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Points before the multiplier
    pub base_points: u32,
    /// Multiplier applied (from the combo including this hit)
    pub multiplier: f64,
    /// Points actually added to the score
    pub points: u32,
    pub rating: Rating,
    pub reaction_ms: f64,
}

/// Which screen asks for accuracy; they disagree when nothing was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyView {
    /// In-round HUD: 100% before the first attempt
    Hud,
    /// End-of-round summary: 0% when nothing was attempted
    Summary,
}

/// Base points and rating for a reaction time
pub fn rate_reaction(reaction_ms: f64) -> (u32, Rating) {
    if reaction_ms < PERFECT_BELOW_MS {
        (PERFECT_POINTS, Rating::Perfect)
    } else if reaction_ms < GREAT_BELOW_MS {
        (GREAT_POINTS, Rating::Great)
    } else if reaction_ms < GOOD_BELOW_MS {
        (GOOD_POINTS, Rating::Good)
    } else {
        (SLOW_POINTS, Rating::Good)
    }
}

/// Score multiplier for a combo count
#[inline]
pub fn multiplier(combo: u32) -> f64 {
    if combo >= COMBO_TIER_2 {
        MULTIPLIER_TIER_2
    } else if combo >= COMBO_TIER_1 {
        MULTIPLIER_TIER_1
    } else {
        MULTIPLIER_BASE
    }
}

/// Register a hit: bump combo, apply multiplier, add to score
pub fn resolve_hit(round: &mut RoundState, reaction_ms: f64) -> HitResult {
    let (base_points, rating) = rate_reaction(reaction_ms);

    round.combo += 1;
    round.max_combo = round.max_combo.max(round.combo);

    let multiplier = multiplier(round.combo);
    let points = (f64::from(base_points) * multiplier).floor() as u32;

    round.score += u64::from(points);
    round.hits += 1;

    HitResult {
        base_points,
        multiplier,
        points,
        rating,
        reaction_ms,
    }
}

/// Register a misclick or an expired target
pub fn resolve_miss(round: &mut RoundState) {
    round.combo = 0;
    round.misses += 1;
}

/// Hit percentage, rounded to the nearest integer
pub fn accuracy(hits: u32, misses: u32, view: AccuracyView) -> u32 {
    let total = hits + misses;
    if total == 0 {
        return match view {
            AccuracyView::Hud => 100,
            AccuracyView::Summary => 0,
        };
    }
    (f64::from(hits) / f64::from(total) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TimerMode;
    use proptest::prelude::*;

    fn round() -> RoundState {
        RoundState::new(TimerMode::CountUp)
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(rate_reaction(0.0), (50, Rating::Perfect));
        assert_eq!(rate_reaction(199.9), (50, Rating::Perfect));
        assert_eq!(rate_reaction(200.0), (35, Rating::Great));
        assert_eq!(rate_reaction(399.0), (35, Rating::Great));
        assert_eq!(rate_reaction(400.0), (22, Rating::Good));
        assert_eq!(rate_reaction(699.0), (22, Rating::Good));
        assert_eq!(rate_reaction(700.0), (12, Rating::Good));
        assert_eq!(rate_reaction(5000.0), (12, Rating::Good));
    }

    #[test]
    fn test_first_perfect_hit() {
        let mut r = round();
        let hit = resolve_hit(&mut r, 150.0);
        assert_eq!(hit.base_points, 50);
        assert_eq!(hit.rating, Rating::Perfect);
        assert_eq!(hit.multiplier, 1.0);
        assert_eq!(hit.points, 50);
        assert_eq!(r.combo, 1);
        assert_eq!(r.score, 50);
        assert_eq!(r.hits, 1);
    }

    #[test]
    fn test_hit_with_combo_six() {
        let mut r = round();
        r.combo = 6;
        let hit = resolve_hit(&mut r, 500.0);
        assert_eq!(hit.base_points, 22);
        assert_eq!(hit.multiplier, 1.4);
        assert_eq!(hit.points, 30);
        assert_eq!(r.combo, 7);
    }

    #[test]
    fn test_multiplier_uses_combo_after_increment() {
        let mut r = round();
        r.combo = 4;
        // Fifth hit in a row already earns x1.4
        let hit = resolve_hit(&mut r, 100.0);
        assert_eq!(r.combo, 5);
        assert_eq!(hit.points, 70);

        r.combo = 9;
        let hit = resolve_hit(&mut r, 100.0);
        assert_eq!(hit.points, 95);
    }

    #[test]
    fn test_miss_resets_combo() {
        let mut r = round();
        r.combo = 12;
        r.max_combo = 12;
        resolve_miss(&mut r);
        assert_eq!(r.combo, 0);
        assert_eq!(r.max_combo, 12);
        assert_eq!(r.misses, 1);
        assert_eq!(multiplier(r.combo), 1.0);

        let hit = resolve_hit(&mut r, 100.0);
        assert_eq!(hit.multiplier, 1.0);
    }

    #[test]
    fn test_accuracy_views() {
        assert_eq!(accuracy(0, 0, AccuracyView::Hud), 100);
        assert_eq!(accuracy(0, 0, AccuracyView::Summary), 0);
        assert_eq!(accuracy(1, 2, AccuracyView::Hud), 33);
        assert_eq!(accuracy(2, 1, AccuracyView::Summary), 67);
        assert_eq!(accuracy(1, 1, AccuracyView::Hud), 50);
        assert_eq!(accuracy(5, 0, AccuracyView::Summary), 100);
    }

    proptest! {
        #[test]
        fn prop_multiplier_is_step_function(combo in 0u32..1000) {
            let expected = if combo >= 10 { 1.9 } else if combo >= 5 { 1.4 } else { 1.0 };
            prop_assert_eq!(multiplier(combo), expected);
        }

        #[test]
        fn prop_final_points_floor(combo in 0u32..50, reaction in 0.0f64..3000.0) {
            let mut r = round();
            r.combo = combo;
            let hit = resolve_hit(&mut r, reaction);
            let expected = (f64::from(hit.base_points) * multiplier(combo + 1)).floor() as u32;
            prop_assert_eq!(hit.points, expected);
            prop_assert!(hit.points >= hit.base_points);
        }

        #[test]
        fn prop_invariants_hold_over_any_sequence(
            outcomes in proptest::collection::vec(proptest::option::of(0.0f64..2000.0), 0..200)
        ) {
            let mut r = round();
            for outcome in outcomes {
                let (score, max_combo) = (r.score, r.max_combo);
                match outcome {
                    Some(reaction) => {
                        resolve_hit(&mut r, reaction);
                    }
                    None => {
                        resolve_miss(&mut r);
                        prop_assert_eq!(r.combo, 0);
                    }
                }
                prop_assert!(r.score >= score);
                prop_assert!(r.max_combo >= max_combo);
                prop_assert!(r.max_combo >= r.combo);
            }
        }
    }
}
