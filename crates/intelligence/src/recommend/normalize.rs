//! Pathology vocabulary normalization.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while building a synonym table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynonymError {
    #[error("synonym entry has an empty term")]
    EmptyTerm,
    /// `from -> via -> to`: normalizing twice would give a different answer.
    #[error("synonym chain {from} -> {via} -> {to}")]
    Chained { from: String, via: String, to: String },
}

/// Maps detector vocabulary onto the domain vocabulary used in the catalog.
///
/// Keys and values are stored lowercased. A target may not itself be the
/// source of another mapping, which keeps `normalize` idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: BTreeMap<String, String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self {
            entries: BTreeMap::from([("crack".to_string(), "grieta".to_string())]),
        }
    }
}

impl SynonymTable {
    /// A table with no synonyms; every label only gets lowercased.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SynonymError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (from, to) in pairs {
            let from = from.as_ref().trim().to_lowercase();
            let to = to.as_ref().trim().to_lowercase();
            if from.is_empty() || to.is_empty() {
                return Err(SynonymError::EmptyTerm);
            }
            entries.insert(from, to);
        }

        for (from, via) in &entries {
            if let Some(to) = entries.get(via) {
                if to != via {
                    return Err(SynonymError::Chained {
                        from: from.clone(),
                        via: via.clone(),
                        to: to.clone(),
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// Fold `raw` to lowercase and apply the synonym table. Unknown labels
    /// pass through lowercased.
    pub fn normalize(&self, raw: &str) -> String {
        let folded = raw.to_lowercase();
        match self.entries.get(&folded) {
            Some(target) => target.clone(),
            None => folded,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
