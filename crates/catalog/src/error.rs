use crate::model::{MaterialId, OwnerId};

/// Rejected material fields on create or update.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("material name must not be empty")]
    EmptyName,
    #[error("material supplier must not be empty")]
    EmptySupplier,
    #[error("material unit must not be empty")]
    EmptyUnit,
    #[error("material price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The material does not exist or belongs to another owner.
    #[error("material not found: {id} (owner {owner})")]
    NotFound { id: MaterialId, owner: OwnerId },
    #[error("invalid material: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    /// True for infrastructure failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Unavailable(_))
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}
