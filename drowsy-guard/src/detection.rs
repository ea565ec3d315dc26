//! Detector output and the per-frame drowsy classification.
//!
//! The object-detection model itself lives outside this crate. There are two
//! ways in:
//!
//! - The daemon never runs a model. The frame source runs it and posts the
//!   resulting detections to `POST /api/v0/detections`.
//! - A program embedding the library in-process implements [`Detector`] for
//!   its model and calls
//!   [`DetectionDriver::process_image`](crate::driver::DetectionDriver::process_image),
//!   which maps model faults to `Error::DetectorUnavailable` and
//!   `Error::InvalidFrame`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use utoipa::ToSchema;

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize, ToSchema)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One detection reported by the model for a frame.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Detection {
    /// Class name, e.g. "Drowsy" or "Awake".
    pub label: String,

    /// Model confidence in `[0, 1]`.
    pub confidence: f32,

    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// A processed frame reduced to the one bit the alert engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionFrame {
    pub timestamp: Instant,
    pub drowsy: bool,
}

impl DetectionFrame {
    /// Classify a frame: drowsy when any detection carries `drowsy_label`.
    pub fn classify(timestamp: Instant, detections: &[Detection], drowsy_label: &str) -> Self {
        Self {
            timestamp,
            drowsy: detections.iter().any(|d| d.label == drowsy_label),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// Model not loaded or still warming up.
    #[error("Model not ready: {0}")]
    NotReady(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// The external object detector.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Run the model on one encoded image.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectorError>;
}
