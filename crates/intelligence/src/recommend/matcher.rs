//! Pathology-to-material matching.

use super::normalize::SynonymTable;
use dipia_catalog::{Material, OwnerId};

/// Select every material owned by `owner` that references `raw_label`.
///
/// A material matches when one of its pathology tags contains the raw label
/// or its normalized form, or when its category contains the normalized
/// form. All checks are case-insensitive substring tests. Catalog order is
/// preserved. Blank labels match nothing.
pub fn match_pathology<'a>(
    synonyms: &SynonymTable,
    raw_label: &str,
    catalog: &'a [Material],
    owner: OwnerId,
) -> Vec<&'a Material> {
    if raw_label.trim().is_empty() {
        return Vec::new();
    }

    let raw = raw_label.to_lowercase();
    let normalized = synonyms.normalize(raw_label);

    catalog
        .iter()
        .filter(|material| material.is_owned_by(owner))
        .filter(|material| {
            let tag_hit = material.pathology_tags.iter().any(|tag| {
                let tag = tag.to_lowercase();
                tag.contains(&raw) || tag.contains(&normalized)
            });
            tag_hit || material.category.to_lowercase().contains(&normalized)
        })
        .collect()
}
