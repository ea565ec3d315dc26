//! Drowsiness guard daemon.
//!
//! Runs the detection driver behind the HTTP API. A frame source (camera
//! plus detector) posts each frame's detections; the daemon decides and
//! plays the alerts.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use drowsy_guard::alert::{AlertEngine, CommandPlayer};
use drowsy_guard::api::{self, SharedState};
use drowsy_guard::config::Config;
use drowsy_guard::driver::{self, DetectionDriver};
use drowsy_guard::tracing::{self as logging, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_journald_or_stdout();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        window = ?config.escalation.window,
        threshold = config.escalation.escalation_threshold,
        asset = %config.alert.asset.display(),
        player = %config.player.command,
        "Starting drowsy-guard"
    );
    if !config.alert.asset.is_file() {
        warn!(
            asset = %config.alert.asset.display(),
            "Alert asset not found; beeps will be skipped"
        );
    }

    let player = Arc::new(CommandPlayer::new(&config.player));
    let engine = Arc::new(AlertEngine::new(config.alert.clone(), player));
    let driver = DetectionDriver::new(&config, engine.clone());

    let shutdown = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(16);

    let driver_handle = tokio::spawn(driver::task(driver, cmd_rx, shutdown.clone()));

    let state = SharedState {
        driver_cmd_tx: cmd_tx,
        engine,
    };
    let mut api_handle = tokio::spawn(api::serve(config.api.clone(), state, shutdown.clone()));

    let finished_early = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        result = &mut api_handle => Some(result),
    };
    shutdown.cancel();

    // An early finish is most likely a bind failure.
    let api_result = match finished_early {
        Some(result) => result,
        None => api_handle.await,
    };

    match api_result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "API server failed"),
        Err(e) => error!(error = %e, "API server task panicked"),
    }
    if let Err(e) = driver_handle.await {
        error!(error = %e, "Driver task panicked");
    }

    info!("Exiting.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
