//! Drowsiness alert escalation engine.
//!
//! Turns a noisy per-frame "drowsy" signal from an external detector into a
//! debounced single beep and, when drowsiness persists, a continuous alert
//! running on a cancellable background task.

pub mod alert;
pub mod api;
pub mod api_client;
pub mod config;
pub mod detection;
pub mod driver;
pub mod error;
pub mod escalation;
pub mod render;
pub mod tracing;
