//! Detection data exchanged between the detector and the presentation layer.

use crate::labels::{ClassMap, DetectionLabel};
use serde::{Deserialize, Serialize};

/// Pixel-space box, serialized as `[x1, y1, x2, y2]`.
///
/// Corners are reordered on construction so that `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One finding from the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Reported as-is; the detector is trusted to stay within `[0, 1]`.
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub class_id: i64,
}

/// The detections of one frame or image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub detections: Vec<Detection>,
    /// Capture time in UNIX seconds.
    pub timestamp: f64,
    pub camera_index: u32,
}

impl DetectionBatch {
    /// The sentinel returned before anything has been published.
    pub fn empty() -> Self {
        Self {
            detections: Vec::new(),
            timestamp: 0.0,
            camera_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Labels present in the batch, each once, in first-seen order.
    pub fn distinct_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for detection in &self.detections {
            if !labels.iter().any(|l| l == &detection.label) {
                labels.push(detection.label.clone());
            }
        }
        labels
    }

    /// Distinct labels minus bystanders: what the recommendation engine
    /// should be asked about. Unrecognized labels are kept.
    pub fn pathology_labels(&self) -> Vec<String> {
        self.distinct_labels()
            .into_iter()
            .filter(|l| !DetectionLabel::parse(l).is_bystander())
            .collect()
    }
}

impl Default for DetectionBatch {
    fn default() -> Self {
        Self::empty()
    }
}

/// A detection as pushed by the detector; `label` may be left out.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionPayload {
    #[serde(default)]
    pub label: Option<String>,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub class_id: i64,
}

/// A batch as pushed by the detector, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionBatchPayload {
    #[serde(default)]
    pub detections: Vec<DetectionPayload>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub camera_index: Option<u32>,
}

impl DetectionBatchPayload {
    /// Fill in missing fields: labels from `classes`, the timestamp from
    /// `received_at`, and camera 0.
    pub fn into_batch(self, classes: &ClassMap, received_at: f64) -> DetectionBatch {
        let detections = self
            .detections
            .into_iter()
            .map(|d| Detection {
                label: d
                    .label
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| classes.label_for(d.class_id)),
                confidence: d.confidence,
                bbox: d.bbox,
                class_id: d.class_id,
            })
            .collect();
        DetectionBatch {
            detections,
            timestamp: self.timestamp.unwrap_or(received_at),
            camera_index: self.camera_index.unwrap_or(0),
        }
    }
}
