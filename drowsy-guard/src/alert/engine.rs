use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;

use super::continuous::{ContinuousAlert, ContinuousExit};
use super::player::AlertPlayer;
use crate::config::AlertConfig;
use crate::tracing::prelude::*;

/// Point-in-time view of the alert state, as seen by the escalation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertSnapshot {
    pub last_single_beep_at: Option<Instant>,
    pub continuous_active: bool,
}

/// Result of [`AlertEngine::start_continuous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { task_id: u64 },

    /// A continuous alert is still alive; nothing was launched.
    AlreadyRunning { task_id: u64 },

    /// No runtime to launch the task on. The alert is skipped this cycle.
    Skipped,
}

/// Result of [`AlertEngine::request_stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No continuous alert was alive.
    NotRunning,

    /// The task was seen to exit within the wait bound.
    Stopped { task_id: u64, exit: ContinuousExit },

    /// The task did not exit within the wait bound. Its stop flag is set and
    /// it will exit on its own after the current play, but nothing waits for
    /// it any more.
    Detached { task_id: u64 },
}

#[derive(Default)]
struct AlertState {
    last_single_beep_at: Option<Instant>,
    continuous: Option<ContinuousAlert>,
}

/// Owns the alert state for one session: the continuous alert handle and the
/// time of the last single beep.
///
/// Shared by `Arc` between the driving cycle and the API. Every read and
/// write of the state happens under one lock, so "is a task alive?" and
/// "launch a task" form a single atomic step.
pub struct AlertEngine {
    config: AlertConfig,
    player: Arc<dyn AlertPlayer>,
    asset: Arc<Path>,
    state: Mutex<AlertState>,
    next_task_id: AtomicU64,
}

impl AlertEngine {
    pub fn new(config: AlertConfig, player: Arc<dyn AlertPlayer>) -> Self {
        let asset = Arc::from(config.asset.as_path());
        Self {
            config,
            player,
            asset,
            state: Mutex::new(AlertState::default()),
            next_task_id: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        let state = self.state.lock();
        AlertSnapshot {
            last_single_beep_at: state.last_single_beep_at,
            continuous_active: state
                .continuous
                .as_ref()
                .is_some_and(ContinuousAlert::is_running),
        }
    }

    /// Whether a continuous alert task is alive right now. A task that hit
    /// its deadline reports false without anyone stopping it.
    pub fn is_running(&self) -> bool {
        self.snapshot().continuous_active
    }

    /// Bound used by [`Self::reset`] and the API's stop endpoints.
    pub fn stop_wait(&self) -> Duration {
        self.config.stop_wait
    }

    /// Launch the continuous alert unless one is already alive.
    pub fn start_continuous(&self) -> StartOutcome {
        let mut state = self.state.lock();

        if let Some(alert) = state.continuous.as_ref() {
            if alert.is_running() {
                trace!(task_id = alert.id(), "Continuous alert already running");
                return StartOutcome::AlreadyRunning {
                    task_id: alert.id(),
                };
            }
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, continuous alert skipped");
            return StartOutcome::Skipped;
        };

        let task_id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        state.continuous = Some(ContinuousAlert::spawn(
            &runtime,
            task_id,
            Arc::clone(&self.player),
            Arc::clone(&self.asset),
            &self.config,
        ));

        info!(task_id, "Continuous alert launched");
        StartOutcome::Started { task_id }
    }

    /// Set the stop flag of the running continuous alert without waiting.
    ///
    /// The handle is kept, so a new alert cannot start until this one has
    /// actually exited.
    pub fn signal_stop(&self) {
        if let Some(alert) = self.state.lock().continuous.as_ref() {
            if alert.is_running() {
                debug!(task_id = alert.id(), "Continuous alert stop requested");
            }
            alert.request_stop();
        }
    }

    /// Stop the continuous alert and wait at most `wait` for it to exit.
    ///
    /// The handle is cleared whatever happens, so the next
    /// [`start_continuous`](Self::start_continuous) is never blocked by a
    /// task that is slow to exit. Exit is only guaranteed to have happened
    /// for [`StopOutcome::Stopped`]; a [`StopOutcome::Detached`] task may
    /// still be finishing its current play.
    pub async fn request_stop(&self, wait: Duration) -> StopOutcome {
        let taken = self.state.lock().continuous.take();
        let Some(alert) = taken else {
            return StopOutcome::NotRunning;
        };

        let task_id = alert.id();
        alert.request_stop();
        if !alert.is_running() {
            return StopOutcome::NotRunning;
        }

        match tokio::time::timeout(wait, alert.into_join()).await {
            Ok(Ok(exit)) => StopOutcome::Stopped { task_id, exit },
            Ok(Err(e)) => {
                warn!(task_id, error = %e, "Continuous alert task failed while stopping");
                StopOutcome::Stopped {
                    task_id,
                    exit: ContinuousExit::Aborted,
                }
            }
            Err(_) => {
                warn!(
                    task_id,
                    wait_ms = wait.as_millis() as u64,
                    "Continuous alert did not exit in time, detaching"
                );
                StopOutcome::Detached { task_id }
            }
        }
    }

    /// Fire one beep in the background and remember when.
    ///
    /// Fire-and-forget: the beep is not tracked and may overlap with the
    /// continuous alert. Spacing between beeps is the policy's concern.
    /// Returns false when the beep could not be dispatched; the beep time is
    /// then left untouched so the next drowsy frame beeps again.
    pub fn beep_once(&self, now: Instant) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, single beep skipped");
            return false;
        };
        self.state.lock().last_single_beep_at = Some(now);

        let player = Arc::clone(&self.player);
        let asset = Arc::clone(&self.asset);
        runtime.spawn_blocking(move || {
            if let Err(e) = player.play(&asset) {
                warn!(error = %e, "Single beep failed");
            }
        });
        true
    }

    /// Stop everything and forget the session's alert history.
    pub async fn reset(&self) -> StopOutcome {
        let outcome = self.request_stop(self.config.stop_wait).await;
        self.state.lock().last_single_beep_at = None;
        outcome
    }
}

impl Drop for AlertEngine {
    fn drop(&mut self) {
        if let Some(alert) = self.state.get_mut().continuous.take() {
            alert.request_stop();
        }
    }
}
