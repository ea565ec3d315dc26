//! Logging setup and the prelude used throughout the crate.
//!
//! Modules import `crate::tracing::prelude::*` rather than reaching for the
//! `tracing` crate directly, so the set of macros in use stays uniform.

use time::macros::format_description;
use tracing_subscriber::{
    EnvFilter, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt,
};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Logs go to journald when the process was started by systemd (detected
/// through `JOURNAL_STREAM`), otherwise to stdout with local timestamps.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_journald_or_stdout() {
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        match tracing_journald::layer() {
            Ok(journald) => {
                let _ = tracing_subscriber::registry()
                    .with(env_filter())
                    .with(journald)
                    .try_init();
                return;
            }
            Err(e) => eprintln!("journald unavailable, logging to stdout: {e}"),
        }
    }

    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_timer(timer))
        .try_init();
}
