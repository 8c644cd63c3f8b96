use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::CatalogError;
use crate::model::{Material, MaterialId, NewMaterial, OwnerId};
use crate::schema;

/// Owner-scoped access to the materials catalog.
///
/// Every operation filters on `owner`; a material belonging to someone else
/// behaves exactly like a missing one.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All materials of `owner`, newest first.
    async fn list_materials_by_owner(&self, owner: OwnerId)
        -> Result<Vec<Material>, CatalogError>;
    async fn create_material(
        &self,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError>;
    async fn update_material(
        &self,
        id: MaterialId,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError>;
    async fn delete_material(&self, id: MaterialId, owner: OwnerId) -> Result<(), CatalogError>;
    /// Record one "material used" event and return the new count.
    async fn update_usage_count(&self, id: MaterialId, owner: OwnerId)
        -> Result<u64, CatalogError>;
    async fn update_favorite(
        &self,
        id: MaterialId,
        owner: OwnerId,
        is_favorite: bool,
    ) -> Result<(), CatalogError>;
    /// Up to `limit` materials with the highest usage count.
    async fn most_used(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError>;
    /// Up to `limit` most recently created materials.
    async fn recent(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError>;
}

/// Catalog contents shared by both store implementations.
#[derive(Debug)]
struct CatalogState {
    next_id: u64,
    materials: Vec<Material>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            next_id: 1,
            materials: Vec::new(),
        }
    }
}

impl CatalogState {
    fn owned_mut(&mut self, id: MaterialId, owner: OwnerId) -> Result<&mut Material, CatalogError> {
        self.materials
            .iter_mut()
            .find(|m| m.id == id && m.is_owned_by(owner))
            .ok_or(CatalogError::NotFound { id, owner })
    }

    fn by_owner(&self, owner: OwnerId) -> Vec<Material> {
        self.materials
            .iter()
            .filter(|m| m.is_owned_by(owner))
            .cloned()
            .collect()
    }

    fn list(&self, owner: OwnerId) -> Vec<Material> {
        let mut list = self.by_owner(owner);
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list
    }

    fn create(&mut self, owner: OwnerId, fields: NewMaterial) -> Result<Material, CatalogError> {
        fields.validate()?;
        let id = MaterialId(self.next_id);
        self.next_id += 1;
        let material = Material::from_new(id, owner, fields, OffsetDateTime::now_utc());
        self.materials.push(material.clone());
        Ok(material)
    }

    fn update(
        &mut self,
        id: MaterialId,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError> {
        fields.validate()?;
        let material = self.owned_mut(id, owner)?;
        material.apply(fields);
        Ok(material.clone())
    }

    fn delete(&mut self, id: MaterialId, owner: OwnerId) -> Result<(), CatalogError> {
        let before = self.materials.len();
        self.materials
            .retain(|m| !(m.id == id && m.is_owned_by(owner)));
        if self.materials.len() == before {
            return Err(CatalogError::NotFound { id, owner });
        }
        Ok(())
    }

    fn record_usage(&mut self, id: MaterialId, owner: OwnerId) -> Result<u64, CatalogError> {
        let material = self.owned_mut(id, owner)?;
        material.usage_count = material.usage_count.saturating_add(1);
        Ok(material.usage_count)
    }

    fn set_favorite(
        &mut self,
        id: MaterialId,
        owner: OwnerId,
        is_favorite: bool,
    ) -> Result<(), CatalogError> {
        self.owned_mut(id, owner)?.is_favorite = is_favorite;
        Ok(())
    }

    fn most_used(&self, owner: OwnerId, limit: usize) -> Vec<Material> {
        let mut list = self.by_owner(owner);
        list.sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then(a.id.cmp(&b.id)));
        list.truncate(limit);
        list
    }

    fn recent(&self, owner: OwnerId, limit: usize) -> Vec<Material> {
        let mut list = self.list(owner);
        list.truncate(limit);
        list
    }
}

/// In-memory store for tests and ephemeral sessions.
pub struct MemCatalogStore {
    inner: Arc<Mutex<CatalogState>>,
}

impl Default for MemCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemCatalogStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CatalogState::default())),
        }
    }

    /// Seed the store with existing records, keeping their identifiers.
    pub fn with_materials(materials: Vec<Material>) -> Self {
        let next_id = materials.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(CatalogState { next_id, materials })),
        }
    }
}

#[async_trait]
impl CatalogStore for MemCatalogStore {
    async fn list_materials_by_owner(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.list(owner))
    }

    async fn create_material(
        &self,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError> {
        let mut guard = self.inner.lock().await;
        guard.create(owner, fields)
    }

    async fn update_material(
        &self,
        id: MaterialId,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError> {
        let mut guard = self.inner.lock().await;
        guard.update(id, owner, fields)
    }

    async fn delete_material(&self, id: MaterialId, owner: OwnerId) -> Result<(), CatalogError> {
        let mut guard = self.inner.lock().await;
        guard.delete(id, owner)
    }

    async fn update_usage_count(
        &self,
        id: MaterialId,
        owner: OwnerId,
    ) -> Result<u64, CatalogError> {
        let mut guard = self.inner.lock().await;
        guard.record_usage(id, owner)
    }

    async fn update_favorite(
        &self,
        id: MaterialId,
        owner: OwnerId,
        is_favorite: bool,
    ) -> Result<(), CatalogError> {
        let mut guard = self.inner.lock().await;
        guard.set_favorite(id, owner, is_favorite)
    }

    async fn most_used(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.most_used(owner, limit))
    }

    async fn recent(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.recent(owner, limit))
    }
}

/// Disk-backed store persisting the catalog as versioned JSON.
pub struct StateCatalogStore {
    path: PathBuf,
    inner: Arc<Mutex<CatalogState>>,
}

impl StateCatalogStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let state = read_state(&path)
            .with_context(|| format!("failed to initialize catalog from: {}", path.display()))?;
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(state)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the in-memory catalog from disk, waiting for the lock.
    pub async fn load_from_disk(&self) -> Result<()> {
        let state = read_state(&self.path)
            .with_context(|| format!("failed to reload catalog from: {}", self.path.display()))?;
        let mut guard = self.inner.lock().await;
        *guard = state;
        Ok(())
    }

    /// Write `state` to disk. Called with the lock held so concurrent
    /// mutations cannot persist out of order.
    fn persist(&self, state: &CatalogState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create catalog directory: {}", parent.display())
            })?;
        }
        let mut materials = state.materials.clone();
        materials.sort_by_key(|m| m.id);
        let data = schema::encode(state.next_id, &materials)
            .context("failed to serialize catalog")?;

        // Write to a temp file then rename so readers never see a partial file.
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data)
            .with_context(|| format!("failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("failed to rename temp file to: {}", self.path.display()))?;
        Ok(())
    }

    /// Apply `op` to the catalog and persist the result.
    ///
    /// A failed write rolls the in-memory state back so memory and disk
    /// never disagree.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut CatalogState) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self.inner.lock().await;
        let backup = CatalogState {
            next_id: guard.next_id,
            materials: guard.materials.clone(),
        };
        let value = op(&mut *guard)?;
        if let Err(err) = self.persist(&*guard) {
            tracing::warn!(
                target: "dipia::catalog",
                path = %self.path.display(),
                error = %err,
                "Failed to persist catalog; rolling back"
            );
            *guard = backup;
            return Err(err.into());
        }
        Ok(value)
    }
}

fn read_state(path: &Path) -> Result<CatalogState> {
    if !path.exists() {
        return Ok(CatalogState::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
    let snapshot = schema::decode(&text)
        .with_context(|| format!("failed to parse catalog file: {}", path.display()))?;
    if snapshot.version < schema::SCHEMA_VERSION {
        tracing::info!(
            target: "dipia::catalog",
            path = %path.display(),
            from = snapshot.version,
            to = schema::SCHEMA_VERSION,
            "Upgrading catalog schema"
        );
    }
    Ok(CatalogState {
        next_id: snapshot.next_id,
        materials: snapshot.materials,
    })
}

#[async_trait]
impl CatalogStore for StateCatalogStore {
    async fn list_materials_by_owner(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.list(owner))
    }

    async fn create_material(
        &self,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError> {
        self.mutate(|state| state.create(owner, fields)).await
    }

    async fn update_material(
        &self,
        id: MaterialId,
        owner: OwnerId,
        fields: NewMaterial,
    ) -> Result<Material, CatalogError> {
        self.mutate(|state| state.update(id, owner, fields)).await
    }

    async fn delete_material(&self, id: MaterialId, owner: OwnerId) -> Result<(), CatalogError> {
        self.mutate(|state| state.delete(id, owner)).await
    }

    async fn update_usage_count(
        &self,
        id: MaterialId,
        owner: OwnerId,
    ) -> Result<u64, CatalogError> {
        self.mutate(|state| state.record_usage(id, owner)).await
    }

    async fn update_favorite(
        &self,
        id: MaterialId,
        owner: OwnerId,
        is_favorite: bool,
    ) -> Result<(), CatalogError> {
        self.mutate(|state| state.set_favorite(id, owner, is_favorite))
            .await
    }

    async fn most_used(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.most_used(owner, limit))
    }

    async fn recent(&self, owner: OwnerId, limit: usize) -> Result<Vec<Material>, CatalogError> {
        let guard = self.inner.lock().await;
        Ok(guard.recent(owner, limit))
    }
}
