//! Detection ingestion for dipia.
//!
//! This crate provides:
//! - `Detection` / `DetectionBatch`, the unit exchanged with the detector process
//! - `ClassMap`, turning raw model class ids into labels
//! - `DetectionInbox`, the single-slot cache holding the latest batch

pub mod inbox;
pub mod labels;
pub mod types;

pub use inbox::DetectionInbox;
pub use labels::{ClassMap, DetectionLabel};
pub use types::{BoundingBox, Detection, DetectionBatch, DetectionBatchPayload, DetectionPayload};
