//! Serve command - keep the session poller running until interrupted.

use anyhow::{Context, Result};
use bodymesh_core::{Poller, ShutdownOutcome, Supervisor};
use clap::Args;
use tracing::{info, warn};

use super::wiring::{ServiceArgs, Wiring};
use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub services: ServiceArgs,
}

pub async fn run(args: &ServeArgs, config: &AppConfig) -> Result<()> {
    let wiring = Wiring::new(&args.services, config)?;
    let poller = Poller::new(
        wiring.store(),
        wiring.sessions()?,
        wiring.registration(),
        config.poller_config(),
    );
    let supervisor = Supervisor::start(poller, config.supervisor_config());
    info!(interval = ?config.poller_config().interval, "Polling pending sessions");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    match supervisor.shutdown().await {
        ShutdownOutcome::Graceful => {}
        ShutdownOutcome::Aborted => warn!("Poller was aborted"),
        ShutdownOutcome::Crashed => anyhow::bail!("Poller task crashed"),
    }
    Ok(())
}
