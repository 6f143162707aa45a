//! imgrelay - generate an image, rehost it on `ImgBB`, and share it on X.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod ports;
mod share;
mod workflow;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::adapters::live::browser::{PrintLink, SystemBrowser};
use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::RelayError;
use crate::ports::LinkOpener;
use crate::workflow::ImageWorkflow;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr; stdout carries only results.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "imgrelay=debug" } else { "imgrelay=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), RelayError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(RelayError::Config)?;
    tracing::debug!(path = %config_path.display(), "Config resolved");

    // Live, recording, or replaying collaborators
    let replay_path = std::env::var("IMGRELAY_REPLAY").ok();
    let is_recording = std::env::var("IMGRELAY_REC").is_ok_and(|v| v == "true" || v == "1");

    let (services, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!(cassette = %cassette_path, "Replaying from cassette");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::info!("Recording mode enabled");
        let (services, session) = ServiceContext::recording(&config)?;
        (services, Some(session))
    } else {
        (ServiceContext::live(&config)?, None)
    };

    let opener: Box<dyn LinkOpener> =
        if cli.no_browser { Box::new(PrintLink) } else { Box::new(SystemBrowser) };
    let workflow = ImageWorkflow::new(services, opener, config.upload, config.share);

    let mut states = workflow.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            tracing::debug!(state = ?*states.borrow_and_update(), "Workflow state changed");
        }
    });

    let outcome = workflow.run().await;
    tracing::debug!(state = ?workflow.state(), "Run finished");
    if let Ok(ref published) = outcome {
        println!("Image: {}", published.image_url);
        println!("Viewer: {}", published.viewer_url);
    }
    let shared = if outcome.is_ok() && cli.share { workflow.share_on_social() } else { Ok(None) };

    // Adapters hold the recorder; release them before writing the cassette.
    drop(workflow);
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => tracing::warn!(error = %e, "Failed to save cassette"),
        }
    }

    outcome?;
    shared?;
    Ok(())
}
