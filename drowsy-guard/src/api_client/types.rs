//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::detection::Detection;
use crate::render::RenderItem;

/// Alert engine status snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct AlertStatus {
    pub frames_processed: u64,
    /// Drowsy frames inside the sliding window.
    pub window_count: usize,
    pub last_frame_drowsy: bool,
    pub continuous_active: bool,
}

/// One frame's worth of detector output.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct DetectionRequest {
    pub detections: Vec<Detection>,
}

/// Result of one detection cycle.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct DetectionResponse {
    pub drowsy: bool,
    /// Detections with their render color.
    pub detections: Vec<RenderItem>,
    /// Alert actions taken this cycle, e.g. `single_beep`.
    pub actions: Vec<String>,
    pub window_count: usize,
    pub continuous_active: bool,
}

/// Result of a stop request.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct StopResponse {
    /// `not_running`, `stopped` or `detached`.
    pub outcome: String,
    pub task_id: Option<u64>,
    /// Why the task ended, when it was seen to end.
    pub exit: Option<String>,
}
