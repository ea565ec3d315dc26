//! Crate-level error type.
//!
//! Alert playback has its own error type in [`crate::alert`]; playback
//! failures are logged where they happen and never reach the driving loop.

/// Errors surfaced to callers of the detection driver and the daemon.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external detector cannot process frames yet (model not loaded).
    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(String),

    /// The detector rejected the frame (undecodable image, wrong format).
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
