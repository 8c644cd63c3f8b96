//! On-disk catalog format.
//!
//! Version 2 wraps the records with a schema version and the identifier
//! counter. Version 1 files are a bare array of rows written before the
//! category, tag, image, favorite, and usage columns existed; they are
//! upgraded on load by filling in explicit defaults.

use crate::model::{Material, MaterialId, OwnerId, DEFAULT_CATEGORY};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

pub(crate) const SCHEMA_VERSION: u32 = 2;

/// Timestamp layout used by SQLite `CURRENT_TIMESTAMP` columns.
const SQLITE_TIMESTAMP: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Versioned {
        version: u32,
        next_id: u64,
        materials: Vec<MaterialRecord>,
    },
    Legacy(Vec<MaterialRecord>),
}

#[derive(Serialize)]
struct CatalogFileOut<'a> {
    version: u32,
    next_id: u64,
    materials: &'a [Material],
}

/// Tags were a comma-separated text column before they became a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagsField {
    List(Vec<String>),
    Text(String),
}

impl TagsField {
    fn into_tags(self) -> Vec<String> {
        let raw = match self {
            Self::List(list) => list,
            Self::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
struct MaterialRecord {
    id: u64,
    name: String,
    supplier: String,
    price: f64,
    unit: String,
    #[serde(alias = "user_id")]
    owner_id: u64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    pathology_tags: Option<TagsField>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    is_favorite: Option<bool>,
    #[serde(default)]
    usage_count: Option<u64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl MaterialRecord {
    fn into_material(self) -> Material {
        Material {
            id: MaterialId(self.id),
            name: self.name,
            supplier: self.supplier,
            price: self.price,
            unit: self.unit,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            pathology_tags: self
                .pathology_tags
                .map(TagsField::into_tags)
                .unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            is_favorite: self.is_favorite.unwrap_or(false),
            usage_count: self.usage_count.unwrap_or(0),
            owner_id: OwnerId(self.owner_id),
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let layout = time::format_description::parse(SQLITE_TIMESTAMP).ok()?;
    PrimitiveDateTime::parse(raw, &layout)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Decoded catalog contents.
#[derive(Debug, Default)]
pub(crate) struct CatalogSnapshot {
    pub version: u32,
    pub next_id: u64,
    pub materials: Vec<Material>,
}

pub(crate) fn decode(text: &str) -> serde_json::Result<CatalogSnapshot> {
    let file: CatalogFile = serde_json::from_str(text)?;
    let (version, next_id, records) = match file {
        CatalogFile::Versioned {
            version,
            next_id,
            materials,
        } => (version, next_id, materials),
        CatalogFile::Legacy(records) => (1, 0, records),
    };
    let materials: Vec<Material> = records
        .into_iter()
        .map(MaterialRecord::into_material)
        .collect();
    // Never hand out an id that already exists, whatever the file claims.
    let max_id = materials.iter().map(|m| m.id.0).max().unwrap_or(0);
    Ok(CatalogSnapshot {
        version,
        next_id: next_id.max(max_id + 1),
        materials,
    })
}

pub(crate) fn encode(next_id: u64, materials: &[Material]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CatalogFileOut {
        version: SCHEMA_VERSION,
        next_id,
        materials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_rows_receive_defaults() {
        let text = r#"[
            {"id": 3, "name": "Cemento", "supplier": "Holcim", "price": 12.5,
             "unit": "saco", "user_id": 1, "created_at": "2025-03-01 10:20:30"}
        ]"#;
        let snapshot = decode(text).unwrap();

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.next_id, 4);
        let m = &snapshot.materials[0];
        assert_eq!(m.category, DEFAULT_CATEGORY);
        assert!(m.pathology_tags.is_empty());
        assert_eq!(m.image, "");
        assert!(!m.is_favorite);
        assert_eq!(m.usage_count, 0);
        assert_eq!(m.owner_id, OwnerId(1));
        assert_eq!(m.created_at.year(), 2025);
        assert_eq!(m.created_at.second(), 30);
    }

    #[test]
    fn legacy_text_tags_are_split() {
        let text = r#"[
            {"id": 1, "name": "Sellador", "supplier": "Sika", "price": 80,
             "unit": "galon", "user_id": 2, "pathology_tags": "grieta, humedad ,"}
        ]"#;
        let snapshot = decode(text).unwrap();
        assert_eq!(snapshot.materials[0].pathology_tags, vec!["grieta", "humedad"]);
        assert_eq!(snapshot.materials[0].created_at, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn versioned_round_trip_preserves_counter() {
        let text = r#"[
            {"id": 1, "name": "Malla", "supplier": "Acme", "price": 5,
             "unit": "m2", "owner_id": 2, "is_favorite": true, "usage_count": 12,
             "created_at": "2025-01-02T03:04:05Z"}
        ]"#;
        let snapshot = decode(text).unwrap();
        let encoded = encode(10, &snapshot.materials).unwrap();
        let reread = decode(&encoded).unwrap();

        assert_eq!(reread.version, SCHEMA_VERSION);
        assert_eq!(reread.next_id, 10);
        assert_eq!(reread.materials, snapshot.materials);
    }

    #[test]
    fn next_id_never_collides_with_existing_rows() {
        let text = r#"{"version": 2, "next_id": 1, "materials": [
            {"id": 5, "name": "Malla", "supplier": "Acme", "price": 5,
             "unit": "m2", "owner_id": 2}
        ]}"#;
        assert_eq!(decode(text).unwrap().next_id, 6);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(decode("{ not json }").is_err());
    }
}
