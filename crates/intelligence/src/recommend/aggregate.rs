//! Merging per-pathology matches into one candidate per material.

use super::MatchReasons;
use dipia_catalog::{Material, MaterialId};
use indexmap::IndexMap;

/// A matched material before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub material: Material,
    pub match_reasons: MatchReasons,
}

/// Deduplicate matches by material id.
///
/// Walks labels in the order given, then materials in match order. The first
/// sighting of an id creates a candidate; later sightings append their label
/// to its reasons. Output is first-seen order.
pub fn aggregate<'a, L, I>(matches: I) -> Vec<Candidate>
where
    L: AsRef<str>,
    I: IntoIterator<Item = (L, Vec<&'a Material>)>,
{
    let mut merged: IndexMap<MaterialId, Candidate> = IndexMap::new();

    for (label, materials) in matches {
        let label = label.as_ref();
        for material in materials {
            merged
                .entry(material.id)
                .and_modify(|candidate| candidate.match_reasons.push(label))
                .or_insert_with(|| Candidate {
                    material: material.clone(),
                    match_reasons: MatchReasons::single(label),
                });
        }
    }

    merged.into_values().collect()
}
