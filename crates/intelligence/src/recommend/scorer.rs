//! Priority scoring and final ordering.

use super::{Candidate, Recommendation, ScoreBreakdown};
use dipia_catalog::Material;
use std::cmp::Ordering;

/// Points for a material the owner marked as favorite.
const FAVORITE_BONUS: u64 = 50;
/// Points per full ten recorded uses, uncapped.
const USAGE_DECADE_BONUS: u64 = 30;
const LOW_PRICE_BONUS: u64 = 20;
const MID_PRICE_BONUS: u64 = 10;
const LOW_PRICE_CEILING: f64 = 100.0;
const MID_PRICE_CEILING: f64 = 500.0;
/// Recency is part of the breakdown but never awards points.
const RECENCY_BONUS: u64 = 0;

/// Trait for computing material priority.
pub trait Scorer {
    /// Per-factor contributions for one material.
    fn breakdown(&self, material: &Material) -> ScoreBreakdown;

    fn score(&self, material: &Material) -> u64 {
        self.breakdown(material).total()
    }

    /// Produce a new scored value; the candidate is consumed, never edited.
    fn score_candidate(&self, candidate: Candidate) -> Recommendation {
        let score_breakdown = self.breakdown(&candidate.material);
        Recommendation {
            score: score_breakdown.total(),
            score_breakdown,
            material: candidate.material,
            match_reasons: candidate.match_reasons,
        }
    }
}

/// Favorite, usage and price-tier scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityScorer;

impl Scorer for PriorityScorer {
    fn breakdown(&self, material: &Material) -> ScoreBreakdown {
        ScoreBreakdown {
            favorite: if material.is_favorite { FAVORITE_BONUS } else { 0 },
            usage: (material.usage_count / 10).saturating_mul(USAGE_DECADE_BONUS),
            price: price_tier(material.price),
            recency: RECENCY_BONUS,
        }
    }
}

fn price_tier(price: f64) -> u64 {
    if price < LOW_PRICE_CEILING {
        LOW_PRICE_BONUS
    } else if price < MID_PRICE_CEILING {
        MID_PRICE_BONUS
    } else {
        0
    }
}

/// Sort by score descending, then price ascending. The sort is stable, so
/// full ties keep their aggregation order.
pub fn rank(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(compare);
}

fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.material.price.total_cmp(&b.material.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::MatchReasons;
    use dipia_test_utils::MaterialBuilder;
    use proptest::prelude::*;

    fn scored(material: Material) -> Recommendation {
        PriorityScorer.score_candidate(Candidate {
            material,
            match_reasons: MatchReasons::single("Crack"),
        })
    }

    #[test]
    fn favorite_with_two_decades_of_use_and_cheap_price() {
        let m = MaterialBuilder::new(1).favorite().usage(25).price(50.0).build();
        let b = PriorityScorer.breakdown(&m);
        assert_eq!(b.favorite, 50);
        assert_eq!(b.usage, 60);
        assert_eq!(b.price, 20);
        assert_eq!(b.recency, 0);
        assert_eq!(PriorityScorer.score(&m), 130);
    }

    #[test]
    fn nine_uses_do_not_reach_a_decade() {
        let m = MaterialBuilder::new(1).usage(9).price(300.0).build();
        assert_eq!(PriorityScorer.score(&m), 10);
    }

    #[test]
    fn price_tiers_use_strict_bounds() {
        assert_eq!(price_tier(0.0), 20);
        assert_eq!(price_tier(99.99), 20);
        assert_eq!(price_tier(100.0), 10);
        assert_eq!(price_tier(499.99), 10);
        assert_eq!(price_tier(500.0), 0);
        assert_eq!(price_tier(999_999.0), 0);
    }

    #[test]
    fn usage_bonus_is_uncapped() {
        let m = MaterialBuilder::new(1).usage(1_000).price(1_000.0).build();
        assert_eq!(PriorityScorer.score(&m), 3_000);
    }

    #[test]
    fn huge_usage_saturates_instead_of_overflowing() {
        let m = MaterialBuilder::new(1)
            .favorite()
            .usage(u64::MAX)
            .price(50.0)
            .build();
        let rec = scored(m);
        assert_eq!(rec.score_breakdown.usage, u64::MAX);
        assert_eq!(rec.score, u64::MAX);
    }

    #[test]
    fn scoring_does_not_touch_the_material() {
        let m = MaterialBuilder::new(1).favorite().usage(12).build();
        let rec = scored(m.clone());
        assert_eq!(rec.material, m);
        assert_eq!(rec.score, rec.score_breakdown.total());
    }

    #[test]
    fn equal_scores_break_ties_on_price() {
        let mut recs = vec![
            scored(MaterialBuilder::new(1).price(450.0).build()),
            scored(MaterialBuilder::new(2).price(150.0).build()),
        ];
        rank(&mut recs);
        assert_eq!(recs[0].material.id.0, 2);
        assert_eq!(recs[1].material.id.0, 1);
    }

    #[test]
    fn full_ties_keep_insertion_order() {
        let mut recs = vec![
            scored(MaterialBuilder::new(9).price(120.0).build()),
            scored(MaterialBuilder::new(4).price(120.0).build()),
        ];
        rank(&mut recs);
        assert_eq!(recs[0].material.id.0, 9);
        assert_eq!(recs[1].material.id.0, 4);
    }

    fn material() -> impl Strategy<Value = Material> {
        (1u64..1_000, any::<bool>(), 0u64..60, 0u32..2_000).prop_map(
            |(id, favorite, usage, cents)| {
                let builder = MaterialBuilder::new(id)
                    .usage(usage)
                    .price(f64::from(cents) / 2.0);
                if favorite {
                    builder.favorite().build()
                } else {
                    builder.build()
                }
            },
        )
    }

    proptest! {
        #[test]
        fn ranked_output_respects_score_then_price(materials in prop::collection::vec(material(), 0..24)) {
            let mut recs: Vec<_> = materials.into_iter().map(scored).collect();
            rank(&mut recs);
            for pair in recs.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.score >= b.score);
                if a.score == b.score {
                    prop_assert!(a.material.price <= b.material.price);
                }
            }
        }
    }
}
