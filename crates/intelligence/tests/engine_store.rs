//! Engine behaviour at the catalog-store boundary.

use async_trait::async_trait;
use dipia_catalog::{
    CatalogError, CatalogStore, Material, MaterialId, MemCatalogStore, NewMaterial, OwnerId,
};
use dipia_intelligence::{RecommendError, RecommendationEngine};
use dipia_test_utils::scenario_catalog;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(200);

/// Store whose catalog listing fails, stalls, or counts calls.
struct BrokenStore {
    stall: bool,
    calls: AtomicUsize,
}

impl BrokenStore {
    fn failing() -> Self {
        Self {
            stall: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn stalling() -> Self {
        Self {
            stall: true,
            calls: AtomicUsize::new(0),
        }
    }
}

fn down() -> CatalogError {
    CatalogError::Unavailable("database offline".into())
}

#[async_trait]
impl CatalogStore for BrokenStore {
    async fn list_materials_by_owner(&self, _: OwnerId) -> Result<Vec<Material>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stall {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Err(down())
    }
    async fn create_material(&self, _: OwnerId, _: NewMaterial) -> Result<Material, CatalogError> {
        Err(down())
    }
    async fn update_material(
        &self,
        _: MaterialId,
        _: OwnerId,
        _: NewMaterial,
    ) -> Result<Material, CatalogError> {
        Err(down())
    }
    async fn delete_material(&self, _: MaterialId, _: OwnerId) -> Result<(), CatalogError> {
        Err(down())
    }
    async fn update_usage_count(&self, _: MaterialId, _: OwnerId) -> Result<u64, CatalogError> {
        Err(down())
    }
    async fn update_favorite(&self, _: MaterialId, _: OwnerId, _: bool) -> Result<(), CatalogError> {
        Err(down())
    }
    async fn most_used(&self, _: OwnerId, _: usize) -> Result<Vec<Material>, CatalogError> {
        Err(down())
    }
    async fn recent(&self, _: OwnerId, _: usize) -> Result<Vec<Material>, CatalogError> {
        Err(down())
    }
}

#[tokio::test]
async fn given_scenario_catalog_when_recommending_then_ranked_end_to_end() {
    let store = MemCatalogStore::with_materials(scenario_catalog());
    let engine = RecommendationEngine::default();

    let out = engine
        .recommend_from_store(&store, &["Humedad", "Crack"], OwnerId(1), TIMEOUT)
        .await
        .unwrap();

    let summary: Vec<_> = out
        .iter()
        .map(|r| (r.material.id.0, r.score, r.match_reasons.to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![(1, 70, "Humedad".to_string()), (2, 30, "Crack".to_string())]
    );
}

#[tokio::test]
async fn given_empty_labels_when_recommending_then_store_is_not_called() {
    let store = BrokenStore::failing();
    let labels: Vec<String> = Vec::new();

    let out = RecommendationEngine::default()
        .recommend_from_store(&store, &labels, OwnerId(1), TIMEOUT)
        .await
        .unwrap();

    assert!(out.is_empty());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_failing_store_when_recommending_then_retryable_unavailable() {
    let store = BrokenStore::failing();

    let err = RecommendationEngine::default()
        .recommend_from_store(&store, &["Crack"], OwnerId(1), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendError::CatalogUnavailable { .. }));
    assert!(err.is_retryable());
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn given_stalled_store_when_recommending_then_times_out() {
    let store = BrokenStore::stalling();

    let err = RecommendationEngine::default()
        .recommend_from_store(&store, &["Crack"], OwnerId(1), TIMEOUT)
        .await
        .unwrap_err();

    match err {
        RecommendError::CatalogTimeout { after } => assert_eq!(after, TIMEOUT),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn given_unknown_owner_when_recommending_then_empty() {
    let store = MemCatalogStore::with_materials(scenario_catalog());

    let out = RecommendationEngine::default()
        .recommend_from_store(&store, &["Crack"], OwnerId(99), TIMEOUT)
        .await
        .unwrap();

    assert!(out.is_empty());
}
