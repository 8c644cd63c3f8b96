//! CLI command handlers for the dipia application.

mod knowledge;
mod material;
mod recommend;
mod serve;

pub(crate) use knowledge::handle_knowledge_command;
pub(crate) use material::handle_material_command;
pub(crate) use recommend::handle_recommend_command;
pub(crate) use serve::handle_serve_command;

use anyhow::{Context, Result};
use dipia_catalog::StateCatalogStore;
use std::path::PathBuf;

/// Open the catalog at `--store`, falling back to `DIPIA_STORE` and then
/// `~/.dipia/catalog.json`.
pub(crate) fn open_store(store: Option<PathBuf>) -> Result<StateCatalogStore> {
    let path = match store {
        Some(path) => path,
        None => dipia_state::store_path()?,
    };
    tracing::debug!(target: "dipia::catalog", path = %path.display(), "Opening catalog");
    StateCatalogStore::new(path.clone())
        .with_context(|| format!("failed to open catalog: {}", path.display()))
}
