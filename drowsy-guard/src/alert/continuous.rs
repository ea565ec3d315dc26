//! The continuous alert task.
//!
//! The task replays the alert sound until it is told to stop, its deadline
//! passes, or playback fails. It owns its own lifetime; the engine keeps only
//! a handle to query liveness and to request a stop.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::player::{AlertPlayer, PlaybackError};
use crate::config::AlertConfig;
use crate::tracing::prelude::*;

/// Why a continuous alert task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ContinuousExit {
    StopRequested,
    DeadlineReached,
    AssetMissing,
    PlaybackFailed,
    /// The playback call panicked or the runtime shut down under it.
    Aborted,
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    max_duration: Duration,
    poll_interval: Duration,
    replay_gap: Duration,
}

/// Handle to a spawned continuous alert.
pub(super) struct ContinuousAlert {
    id: u64,
    stop: CancellationToken,
    join: JoinHandle<ContinuousExit>,
}

impl ContinuousAlert {
    pub(super) fn spawn(
        runtime: &Handle,
        id: u64,
        player: Arc<dyn AlertPlayer>,
        asset: Arc<Path>,
        config: &AlertConfig,
    ) -> Self {
        let stop = CancellationToken::new();
        let timing = Timing {
            max_duration: config.max_continuous,
            poll_interval: config.poll_interval,
            replay_gap: config.replay_gap,
        };
        let join = runtime.spawn(run(id, player, asset, timing, stop.clone()));

        Self { id, stop, join }
    }

    pub(super) fn id(&self) -> u64 {
        self.id
    }

    pub(super) fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Set the stop flag. The task notices at its next check.
    pub(super) fn request_stop(&self) {
        self.stop.cancel();
    }

    pub(super) fn into_join(self) -> JoinHandle<ContinuousExit> {
        self.join
    }
}

async fn run(
    id: u64,
    player: Arc<dyn AlertPlayer>,
    asset: Arc<Path>,
    timing: Timing,
    stop: CancellationToken,
) -> ContinuousExit {
    let started = Instant::now();
    let deadline = started + timing.max_duration;
    let mut plays = 0u32;

    debug!(
        task_id = id,
        max_secs = timing.max_duration.as_secs_f32(),
        "Continuous alert started"
    );

    let exit = loop {
        if let Some(exit) = check(&stop, deadline) {
            break exit;
        }

        let play_player = Arc::clone(&player);
        let play_asset = Arc::clone(&asset);
        match tokio::task::spawn_blocking(move || play_player.play(&play_asset)).await {
            Ok(Ok(())) => plays += 1,
            Ok(Err(PlaybackError::AssetMissing(path))) => {
                error!(
                    task_id = id,
                    asset = %path.display(),
                    "Alert sound missing, continuous alert abandoned"
                );
                break ContinuousExit::AssetMissing;
            }
            Ok(Err(e)) => {
                error!(task_id = id, error = %e, "Continuous alert playback failed");
                break ContinuousExit::PlaybackFailed;
            }
            Err(e) => {
                error!(task_id = id, error = %e, "Continuous alert playback aborted");
                break ContinuousExit::Aborted;
            }
        }

        if let Some(exit) = wait_gap(&stop, deadline, timing).await {
            break exit;
        }
    };

    info!(
        task_id = id,
        exit = %exit,
        plays,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Continuous alert finished"
    );
    exit
}

fn check(stop: &CancellationToken, deadline: Instant) -> Option<ContinuousExit> {
    if stop.is_cancelled() {
        Some(ContinuousExit::StopRequested)
    } else if Instant::now() >= deadline {
        Some(ContinuousExit::DeadlineReached)
    } else {
        None
    }
}

/// Wait out the pause between two plays, checking the stop flag and the
/// deadline on every poll tick. Returns `None` when the gap elapsed and the
/// next play should start.
async fn wait_gap(
    stop: &CancellationToken,
    deadline: Instant,
    timing: Timing,
) -> Option<ContinuousExit> {
    let gap_end = Instant::now() + timing.replay_gap;
    let mut poll = tokio::time::interval(timing.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if let Some(exit) = check(stop, deadline) {
            return Some(exit);
        }
        if Instant::now() >= gap_end {
            return None;
        }

        tokio::select! {
            _ = stop.cancelled() => return Some(ContinuousExit::StopRequested),
            _ = poll.tick() => {}
        }
    }
}
