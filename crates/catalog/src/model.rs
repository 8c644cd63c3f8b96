//! Material records and their identifiers.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Category assigned when a material is created without one.
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MaterialId(pub u64);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MaterialId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The user account a material belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A fully-populated catalog record.
///
/// Stores apply every default before handing a `Material` out, so callers
/// never deal with missing columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub supplier: String,
    /// Unit price, never negative.
    pub price: f64,
    pub unit: String,
    pub category: String,
    /// Free-text pathology vocabulary this material remedies.
    pub pathology_tags: Vec<String>,
    pub image: String,
    pub is_favorite: bool,
    pub usage_count: u64,
    pub owner_id: OwnerId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Material {
    pub(crate) fn from_new(
        id: MaterialId,
        owner_id: OwnerId,
        fields: NewMaterial,
        created_at: OffsetDateTime,
    ) -> Self {
        let mut material = Self {
            id,
            name: String::new(),
            supplier: String::new(),
            price: 0.0,
            unit: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            pathology_tags: Vec::new(),
            image: String::new(),
            is_favorite: false,
            usage_count: 0,
            owner_id,
            created_at,
        };
        material.apply(fields);
        material
    }

    /// Overwrite the user-editable fields. Favorite and usage state are kept.
    pub(crate) fn apply(&mut self, fields: NewMaterial) {
        self.name = fields.name.trim().to_string();
        self.supplier = fields.supplier.trim().to_string();
        self.price = fields.price;
        self.unit = fields.unit.trim().to_string();
        self.category = fields
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        self.pathology_tags = fields
            .pathology_tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self.image = fields.image.unwrap_or_default();
    }

    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner_id == owner
    }
}

/// User-supplied fields for creating or replacing a material.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewMaterial {
    pub name: String,
    pub supplier: String,
    pub price: f64,
    pub unit: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pathology_tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewMaterial {
    pub fn new(
        name: impl Into<String>,
        supplier: impl Into<String>,
        price: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            supplier: supplier.into(),
            price,
            unit: unit.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pathology_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check required fields before they reach a store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.supplier.trim().is_empty() {
            return Err(ValidationError::EmptySupplier);
        }
        if self.unit.trim().is_empty() {
            return Err(ValidationError::EmptyUnit);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.price));
        }
        Ok(())
    }
}
