//! The per-frame integration point.
//!
//! [`DetectionDriver`] runs one detection cycle at a time: classify the
//! frame, update the event window, decide, then act on the alert engine.
//! [`task`] wraps it in an actor so concurrent callers (HTTP handlers) are
//! serialized into the single sequential driving cycle the policy expects.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::alert::{AlertEngine, StartOutcome, StopOutcome};
use crate::api::commands::DriverCommand;
use crate::api_client::types::AlertStatus;
use crate::config::Config;
use crate::detection::{Detection, DetectionFrame, Detector, DetectorError};
use crate::error::{Error, Result};
use crate::escalation::{AlertActions, EscalationPolicy};
use crate::render::{self, RenderItem};
use crate::tracing::prelude::*;

/// What one detection cycle decided and what to draw.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub timestamp: Instant,
    pub drowsy: bool,
    pub actions: AlertActions,
    pub window_count: usize,
    pub render: Vec<RenderItem>,
}

pub struct DetectionDriver {
    engine: Arc<AlertEngine>,
    policy: EscalationPolicy,
    drowsy_label: String,
    frames_processed: u64,
    last_frame_drowsy: bool,
}

impl DetectionDriver {
    pub fn new(config: &Config, engine: Arc<AlertEngine>) -> Self {
        Self {
            engine,
            policy: EscalationPolicy::new(config.escalation.clone()),
            drowsy_label: config.drowsy_label.clone(),
            frames_processed: 0,
            last_frame_drowsy: false,
        }
    }

    pub fn engine(&self) -> &Arc<AlertEngine> {
        &self.engine
    }

    /// Run one cycle on detector output, stamped with the current time.
    pub fn process(&mut self, detections: &[Detection]) -> CycleReport {
        self.process_at(Instant::now(), detections)
    }

    /// Run one cycle at an explicit timestamp. Timestamps must not go
    /// backwards between calls.
    pub fn process_at(&mut self, now: Instant, detections: &[Detection]) -> CycleReport {
        let frame = DetectionFrame::classify(now, detections, &self.drowsy_label);
        let snapshot = self.engine.snapshot();
        let escalation = self.policy.evaluate(&frame, &snapshot);

        self.apply(escalation.actions, escalation.window_count, now);

        self.frames_processed += 1;
        self.last_frame_drowsy = frame.drowsy;

        trace!(
            drowsy = frame.drowsy,
            window_count = escalation.window_count,
            actions = ?escalation.actions,
            "Detection cycle"
        );

        CycleReport {
            timestamp: now,
            drowsy: frame.drowsy,
            actions: escalation.actions,
            window_count: escalation.window_count,
            render: render::annotate(detections, &self.drowsy_label),
        }
    }

    /// Run the detector on an image, then one cycle on its output.
    ///
    /// Entry point for embedders that own the model in-process; the daemon
    /// receives detector output over HTTP and uses [`Self::process`].
    ///
    /// Detector faults are returned to the caller and the alert engine is
    /// left untouched for this frame.
    pub async fn process_image(
        &mut self,
        detector: &dyn Detector,
        image: &[u8],
    ) -> Result<CycleReport> {
        let detections = detector.detect(image).await.map_err(|e| {
            warn!(error = %e, "Detector failed, skipping alert evaluation");
            match e {
                DetectorError::NotReady(msg) => Error::DetectorUnavailable(msg),
                DetectorError::InvalidImage(msg) => Error::InvalidFrame(msg),
            }
        })?;

        Ok(self.process(&detections))
    }

    fn apply(&self, actions: AlertActions, window_count: usize, now: Instant) {
        if actions.contains(AlertActions::STOP_CONTINUOUS) {
            self.engine.signal_stop();
        }

        if actions.contains(AlertActions::SINGLE_BEEP) {
            self.engine.beep_once(now);
        }

        if actions.contains(AlertActions::START_CONTINUOUS) {
            match self.engine.start_continuous() {
                StartOutcome::Started { task_id } => {
                    info!(
                        task_id,
                        window_count, "Sustained drowsiness, continuous alert escalated"
                    );
                }
                StartOutcome::AlreadyRunning { task_id } => {
                    debug!(task_id, "Continuous alert still finishing, not restarted");
                }
                StartOutcome::Skipped => {}
            }
        }
    }

    /// Silence the continuous alert but keep the event window.
    pub async fn stop_beep(&mut self) -> StopOutcome {
        let outcome = self.engine.request_stop(self.engine.stop_wait()).await;
        info!(outcome = ?outcome, "Alert silenced");
        outcome
    }

    /// Silence everything and reset the window and alert state. Safe to call
    /// repeatedly and when nothing is running.
    pub async fn stop_all(&mut self) -> StopOutcome {
        self.policy.reset();
        self.last_frame_drowsy = false;
        let outcome = self.engine.reset().await;
        info!(outcome = ?outcome, "Detection session stopped");
        outcome
    }

    pub fn status(&mut self) -> AlertStatus {
        AlertStatus {
            frames_processed: self.frames_processed,
            window_count: self.policy.window_count(Instant::now()),
            last_frame_drowsy: self.last_frame_drowsy,
            continuous_active: self.engine.is_running(),
        }
    }

    async fn handle(&mut self, cmd: DriverCommand) {
        match cmd {
            DriverCommand::ProcessDetections { detections, reply } => {
                let report = self.process(&detections);
                if reply.send(report).is_err() {
                    debug!("Detection reply dropped, caller went away");
                }
            }
            DriverCommand::Status { reply } => {
                if reply.send(self.status()).is_err() {
                    debug!("Status reply dropped, caller went away");
                }
            }
            DriverCommand::StopBeep { reply } => {
                if reply.send(self.stop_beep().await).is_err() {
                    debug!("Stop reply dropped, caller went away");
                }
            }
            DriverCommand::StopAll { reply } => {
                if reply.send(self.stop_all().await).is_err() {
                    debug!("Stop reply dropped, caller went away");
                }
            }
        }
    }
}

/// Driver actor loop.
///
/// Processes commands one at a time until `shutdown` is cancelled or every
/// sender is gone. Stops all alerts on the way out.
pub async fn task(
    mut driver: DetectionDriver,
    mut cmd_rx: mpsc::Receiver<DriverCommand>,
    shutdown: CancellationToken,
) {
    trace!("Driver task started.");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Driver shutdown requested");
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("Driver command channel closed");
                    break;
                };
                driver.handle(cmd).await;
            }
        }
    }

    driver.stop_all().await;

    trace!("Driver task stopped.");
}
