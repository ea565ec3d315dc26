//! HTTP API for the detection driver.
//!
//! Handlers never touch the driver directly; they send
//! [`commands::DriverCommand`]s to the driver task and await its reply, so
//! frames from concurrent requests are still processed one at a time.

pub mod commands;
pub mod server;
pub mod v0;

pub use server::{SharedState, router, serve, serve_on};
