//! Material recommendations driven by detected structural pathologies.
//!
//! This crate provides:
//! - Pathology normalization through a configurable synonym table
//! - Owner-scoped matching of labels against catalog metadata
//! - Deduplicating aggregation and deterministic priority scoring
//! - A static knowledge base describing common damage types

pub mod knowledge;
pub mod recommend;

pub use knowledge::{keys as knowledge_keys, lookup, KnowledgeEntry};
pub use recommend::{
    aggregate, explain, match_pathology, rank, summarize, Candidate, MatchReasons, PriorityScorer,
    Recommendation, RecommendError, RecommendationEngine, ScoreBreakdown, Scorer, SynonymError,
    SynonymTable,
};
