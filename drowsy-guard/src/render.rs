//! Render hints handed back to whoever draws the frame.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::detection::{BoundingBox, Detection};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorHint {
    /// Drawn in alert red.
    Alert,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RenderItem {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub color: ColorHint,
}

/// Pair every detection with its color: alert for the drowsy label, neutral
/// for everything else.
pub fn annotate(detections: &[Detection], drowsy_label: &str) -> Vec<RenderItem> {
    detections
        .iter()
        .map(|d| RenderItem {
            label: d.label.clone(),
            confidence: d.confidence,
            bbox: d.bbox,
            color: if d.label == drowsy_label {
                ColorHint::Alert
            } else {
                ColorHint::Neutral
            },
        })
        .collect()
}
