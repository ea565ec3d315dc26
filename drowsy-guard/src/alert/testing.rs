//! Player doubles for tests.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::player::{AlertPlayer, PlaybackError};

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Succeed,
    MissingAsset,
    Fail,
    Slow(Duration),
}

/// Counts play calls and answers according to its behavior.
#[derive(Debug)]
pub(crate) struct RecordingPlayer {
    behavior: Behavior,
    plays: AtomicUsize,
}

impl RecordingPlayer {
    fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            plays: AtomicUsize::new(0),
        })
    }

    pub(crate) fn ok() -> Arc<Self> {
        Self::with(Behavior::Succeed)
    }

    pub(crate) fn missing_asset() -> Arc<Self> {
        Self::with(Behavior::MissingAsset)
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::with(Behavior::Fail)
    }

    /// Blocks the calling thread for `duration` of real time per play.
    pub(crate) fn slow(duration: Duration) -> Arc<Self> {
        Self::with(Behavior::Slow(duration))
    }

    /// Number of play attempts, failed ones included.
    pub(crate) fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlertPlayer for RecordingPlayer {
    fn play(&self, asset: &Path) -> Result<(), PlaybackError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::MissingAsset => Err(PlaybackError::AssetMissing(asset.to_path_buf())),
            Behavior::Fail => Err(PlaybackError::Failed("device busy".to_string())),
            Behavior::Slow(duration) => {
                std::thread::sleep(duration);
                Ok(())
            }
        }
    }
}
