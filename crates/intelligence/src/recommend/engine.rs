//! Orchestration: labels -> normalize -> match -> aggregate -> score -> rank.

use super::{aggregate, match_pathology, rank, PriorityScorer, Recommendation, Scorer, SynonymTable};
use dipia_catalog::{CatalogError, CatalogStore, Material, OwnerId};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Infrastructure failures surfaced by [`RecommendationEngine::recommend_from_store`].
///
/// The engine never retries; callers decide whether to.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("catalog unavailable: {source}")]
    CatalogUnavailable {
        #[source]
        source: CatalogError,
    },
    #[error("catalog fetch timed out after {after:?}")]
    CatalogTimeout { after: Duration },
}

impl RecommendError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CatalogUnavailable { .. } | Self::CatalogTimeout { .. } => true,
        }
    }
}

/// Stateless recommendation pipeline.
///
/// Holds only its configuration, so a single engine can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct RecommendationEngine<S = PriorityScorer> {
    synonyms: SynonymTable,
    scorer: S,
}

impl RecommendationEngine<PriorityScorer> {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self {
            synonyms,
            scorer: PriorityScorer,
        }
    }
}

impl Default for RecommendationEngine<PriorityScorer> {
    fn default() -> Self {
        Self::new(SynonymTable::default())
    }
}

impl<S: Scorer> RecommendationEngine<S> {
    pub fn with_scorer(synonyms: SynonymTable, scorer: S) -> Self {
        Self { synonyms, scorer }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Rank the owner's materials for the given pathology labels.
    ///
    /// Empty labels, an empty catalog and zero matches all yield an empty
    /// list. Output order depends only on label order, catalog contents,
    /// score and price.
    pub fn recommend<L: AsRef<str>>(
        &self,
        labels: &[L],
        catalog: &[Material],
        owner: OwnerId,
    ) -> Vec<Recommendation> {
        if labels.is_empty() {
            return Vec::new();
        }

        let per_label = labels.iter().map(|label| {
            let label = label.as_ref();
            (label, match_pathology(&self.synonyms, label, catalog, owner))
        });

        let mut recommendations: Vec<Recommendation> = aggregate(per_label)
            .into_iter()
            .map(|candidate| self.scorer.score_candidate(candidate))
            .collect();
        rank(&mut recommendations);

        debug!(
            target: "dipia::engine",
            owner = %owner,
            labels = labels.len(),
            catalog = catalog.len(),
            results = recommendations.len(),
            "Ranked recommendations"
        );
        recommendations
    }

    /// Fetch the owner's catalog under `timeout`, then run [`Self::recommend`].
    ///
    /// The store is not touched when `labels` is empty.
    pub async fn recommend_from_store<L: AsRef<str> + Sync>(
        &self,
        store: &dyn CatalogStore,
        labels: &[L],
        owner: OwnerId,
        timeout: Duration,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = match tokio::time::timeout(timeout, store.list_materials_by_owner(owner)).await
        {
            Ok(Ok(catalog)) => catalog,
            Ok(Err(source)) => {
                warn!(target: "dipia::engine", owner = %owner, error = %source, "Catalog fetch failed");
                return Err(RecommendError::CatalogUnavailable { source });
            }
            Err(_) => {
                warn!(target: "dipia::engine", owner = %owner, timeout_ms = timeout.as_millis() as u64, "Catalog fetch timed out");
                return Err(RecommendError::CatalogTimeout { after: timeout });
            }
        };

        Ok(self.recommend(labels, &catalog, owner))
    }
}
