//! Command types sent from API handlers to the detection driver.
//!
//! Each command carries a oneshot reply channel so the handler can
//! await the result and translate it into an HTTP response.

use tokio::sync::oneshot;

use crate::alert::StopOutcome;
use crate::api_client::types::AlertStatus;
use crate::detection::Detection;
use crate::driver::CycleReport;

/// Commands from the API to the driver task.
pub enum DriverCommand {
    /// Run one detection cycle on detector output.
    ProcessDetections {
        detections: Vec<Detection>,
        reply: oneshot::Sender<CycleReport>,
    },

    /// Current status, with the window pruned at the time of the request.
    Status { reply: oneshot::Sender<AlertStatus> },

    /// Silence the continuous alert, keeping the event window.
    StopBeep { reply: oneshot::Sender<StopOutcome> },

    /// Silence everything and reset the session's alert state.
    StopAll { reply: oneshot::Sender<StopOutcome> },
}
