//! Command-line interface for drowsy-guard.
//!
//! This binary inspects and controls the daemon via the HTTP API.

use std::env;

use anyhow::Result;

use drowsy_guard::api_client::{self, types::StopResponse};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: drowsy-guard-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status      Show alert status");
        eprintln!("  stop-beep   Silence the continuous alert");
        eprintln!("  stop        Stop the session and reset the drowsy history");
        eprintln!();
        eprintln!("Environment:");
        eprintln!(
            "  DROWSY_API_URL    API base URL (default: {})",
            api_client::DEFAULT_BASE_URL
        );
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "stop-beep" => print_stop(make_client().stop_beep().await?),
        "stop" => print_stop(make_client().stop_session().await?),
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring DROWSY_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("DROWSY_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print a summary of the current alert state.
async fn cmd_status() -> Result<()> {
    let client = make_client();
    let status = client.get_alert().await?;

    println!("Frames:      {}", status.frames_processed);
    println!("Window:      {} drowsy", status.window_count);
    println!(
        "Last frame:  {}",
        if status.last_frame_drowsy { "drowsy" } else { "awake" }
    );
    println!(
        "Continuous:  {}",
        if status.continuous_active { "playing" } else { "idle" }
    );

    Ok(())
}

fn print_stop(response: StopResponse) {
    match (response.task_id, response.exit) {
        (Some(id), Some(exit)) => println!("{} (task {id}, {exit})", response.outcome),
        (Some(id), None) => println!("{} (task {id})", response.outcome),
        _ => println!("{}", response.outcome),
    }
}
