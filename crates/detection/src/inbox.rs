//! Single-slot cache for the most recent detection batch.
//!
//! # Concurrency Model
//!
//! One detector pushes batches while any number of presentation handlers read
//! them. The slot holds an `Arc<DetectionBatch>` behind a
//! `parking_lot::RwLock`:
//!
//! - `publish` builds the `Arc` outside the lock and swaps it in, so the
//!   write section is a pointer store.
//! - `latest` clones the `Arc` under a read lock and releases it
//!   immediately; callers keep a complete snapshot even if a newer batch
//!   lands while they render.
//!
//! A reader therefore observes either the empty sentinel or one complete,
//! previously published batch, never fields from two different batches.
//!
//! The inbox is an ordinary value: the server creates one and shares it via
//! `Arc<DetectionInbox>` with the handlers that need it.

use crate::types::DetectionBatch;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Slot {
    batch: Option<Arc<DetectionBatch>>,
    publishes: u64,
}

/// Holds the latest batch pushed by the detector, last write wins.
#[derive(Debug)]
pub struct DetectionInbox {
    slot: RwLock<Slot>,
    empty: Arc<DetectionBatch>,
}

impl Default for DetectionInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionInbox {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            empty: Arc::new(DetectionBatch::empty()),
        }
    }

    /// Replace the held batch. No merging and no history.
    pub fn publish(&self, batch: DetectionBatch) {
        let detections = batch.len();
        let camera_index = batch.camera_index;
        let batch = Arc::new(batch);
        let publishes = {
            let mut slot = self.slot.write();
            slot.batch = Some(batch);
            slot.publishes += 1;
            slot.publishes
        };
        tracing::debug!(
            target: "dipia::inbox",
            detections,
            camera_index,
            publishes,
            "Published detection batch"
        );
    }

    /// The current batch, or the empty sentinel if nothing was published yet.
    pub fn latest(&self) -> Arc<DetectionBatch> {
        self.slot
            .read()
            .batch
            .as_ref()
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::clone(&self.empty))
    }

    /// Whether at least one batch has been published.
    pub fn is_populated(&self) -> bool {
        self.slot.read().batch.is_some()
    }

    /// Number of batches published since creation.
    pub fn publish_count(&self) -> u64 {
        self.slot.read().publishes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Detection};

    fn batch(label: &str, timestamp: f64, camera_index: u32) -> DetectionBatch {
        DetectionBatch {
            detections: vec![Detection {
                label: label.to_string(),
                confidence: 0.9,
                bbox: BoundingBox::new(1, 2, 3, 4),
                class_id: 1,
            }],
            timestamp,
            camera_index,
        }
    }

    #[test]
    fn new_inbox_returns_sentinel() {
        let inbox = DetectionInbox::new();
        assert!(!inbox.is_populated());
        assert_eq!(*inbox.latest(), DetectionBatch::empty());
        assert_eq!(inbox.publish_count(), 0);
    }

    #[test]
    fn publish_populates_inbox() {
        let inbox = DetectionInbox::new();
        inbox.publish(batch("Crack", 10.0, 1));
        assert!(inbox.is_populated());
        assert_eq!(*inbox.latest(), batch("Crack", 10.0, 1));
    }

    #[test]
    fn later_publish_overwrites_without_merging() {
        let inbox = DetectionInbox::new();
        inbox.publish(batch("Crack", 10.0, 1));
        inbox.publish(batch("Humidity", 11.0, 2));

        let latest = inbox.latest();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest.detections[0].label, "Humidity");
        assert_eq!(inbox.publish_count(), 2);
    }

    #[test]
    fn publishing_empty_batch_still_counts_as_populated() {
        let inbox = DetectionInbox::new();
        inbox.publish(DetectionBatch {
            detections: vec![],
            timestamp: 5.0,
            camera_index: 3,
        });
        assert!(inbox.is_populated());
        assert_eq!(inbox.latest().camera_index, 3);
    }

    #[test]
    fn snapshot_survives_later_publish() {
        let inbox = DetectionInbox::new();
        inbox.publish(batch("Crack", 10.0, 1));
        let held = inbox.latest();
        inbox.publish(batch("Humidity", 11.0, 2));

        assert_eq!(held.detections[0].label, "Crack");
        assert_eq!(inbox.latest().detections[0].label, "Humidity");
    }
}
