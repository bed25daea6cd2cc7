//! PopSpot - Main Entry Point
//!
//! Command-line front end over the PopSpot API: wires the file session
//! store, the reqwest transport and the authenticated client together,
//! then runs one subcommand and prints its result as JSON.

mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use popspot_application::{AuthenticatedClient, ClientContext};
use popspot_infrastructure::{
    ConfigLoader, FileSessionStore, LoggingNavigator, ReqwestTransport, default_session_path,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
        config.validate().context("validating --base-url")?;
    }

    let session_path = cli
        .session_file
        .clone()
        .or_else(|| config.session_file.clone())
        .or_else(default_session_path)
        .context("no session file configured and no platform config directory found")?;

    tracing::debug!(
        base_url = %config.base_url,
        session = %session_path.display(),
        "starting PopSpot v{}",
        env!("CARGO_PKG_VERSION")
    );

    let session = Arc::new(
        FileSessionStore::open(&session_path)
            .await
            .with_context(|| format!("opening session file {}", session_path.display()))?,
    );
    let transport = Arc::new(ReqwestTransport::new(&config).context("building HTTP transport")?);
    let context = ClientContext::new(session, Arc::new(LoggingNavigator));
    let client = Arc::new(AuthenticatedClient::new(transport, context, config));

    let output = commands::run(cli.command, client).await?;
    println!("{output}");
    Ok(())
}
