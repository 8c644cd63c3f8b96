//! Pathology-driven material recommendations.

mod aggregate;
mod engine;
mod explainer;
mod matcher;
mod normalize;
mod scorer;

pub use aggregate::{aggregate, Candidate};
pub use engine::{RecommendError, RecommendationEngine};
pub use explainer::{explain, summarize};
pub use matcher::match_pathology;
pub use normalize::{SynonymError, SynonymTable};
pub use scorer::{rank, PriorityScorer, Scorer};

use dipia_catalog::Material;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A material ranked for the requested pathologies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub material: Material,
    /// Labels that pulled this material in, first-seen order.
    pub match_reasons: MatchReasons,
    pub score: u64,
    pub score_breakdown: ScoreBreakdown,
}

/// Breakdown of the priority score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub favorite: u64,
    pub usage: u64,
    pub price: u64,
    /// Always zero; kept so the breakdown lists every factor.
    pub recency: u64,
}

impl ScoreBreakdown {
    /// Calculate total score, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.favorite
            .saturating_add(self.usage)
            .saturating_add(self.price)
            .saturating_add(self.recency)
    }
}

/// Ordered pathology labels, rendered as a `", "`-joined string.
///
/// Repeats are kept: a label supplied twice shows up twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReasons(Vec<String>);

impl MatchReasons {
    pub fn single(label: &str) -> Self {
        Self(vec![label.to_string()])
    }

    pub fn push(&mut self, label: &str) {
        self.0.push(label.to_string());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MatchReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl Serialize for MatchReasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchReasons {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let joined = String::deserialize(deserializer)?;
        Ok(Self(
            joined
                .split(", ")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}
