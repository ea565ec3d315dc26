//! Alert playback: the debounced single beep and the continuous alert.
//!
//! [`AlertEngine`] owns both mechanisms for one session. The continuous alert
//! moves through a small state machine:
//!
//! ```text
//!          start_continuous()
//!  Idle ─────────────────────► Running
//!   ▲                            │
//!   │  stop flag / deadline /    │
//!   │  playback failure          │
//!   └────────────────────────────┘
//! ```
//!
//! Starting while `Running` is a no-op. Stopping is cooperative: the task
//! checks its stop flag and deadline before every play and on every poll tick
//! between plays, so it exits within one poll interval, or one play if the
//! stop lands mid-sound.

mod continuous;
mod engine;
mod player;
#[cfg(test)]
pub(crate) mod testing;

pub use continuous::ContinuousExit;
pub use engine::{AlertEngine, AlertSnapshot, StartOutcome, StopOutcome};
pub use player::{AlertPlayer, CommandPlayer, PlaybackError};
