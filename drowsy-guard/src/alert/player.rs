use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::PlayerConfig;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The alert sound file does not exist. Every attempt fails the same
    /// way until the file is restored.
    #[error("Alert sound not found: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("Playback failed: {0}")]
    Failed(String),
}

/// Blocking "play this sound to completion" primitive.
///
/// Implementations block the calling thread for the duration of the sound.
/// The engine only ever calls them from tokio's blocking pool.
pub trait AlertPlayer: Send + Sync + 'static {
    fn play(&self, asset: &Path) -> Result<(), PlaybackError>;
}

/// Plays the asset by running an external audio command, e.g.
/// `mpg123 -q beep.mp3`, and waiting for it to exit.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl AlertPlayer for CommandPlayer {
    fn play(&self, asset: &Path) -> Result<(), PlaybackError> {
        if !asset.is_file() {
            return Err(PlaybackError::AssetMissing(asset.to_path_buf()));
        }

        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(asset)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PlaybackError::Failed(format!("cannot run {}: {e}", self.command)))?;

        if status.success() {
            Ok(())
        } else {
            Err(PlaybackError::Failed(format!(
                "{} exited with {status}",
                self.command
            )))
        }
    }
}
