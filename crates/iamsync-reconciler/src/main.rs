//! # iamsync Entry Point
//!
//! Loads configuration, opens the store connection and the AWS clients, runs
//! one reconciliation, and exits 0 on success or 1 on any failure.

use std::process::ExitCode;

use anyhow::Context;
use iamsync_provider::AwsProvider;
use iamsync_reconciler::config::{env_file_failure, log_format_from_env};
use iamsync_reconciler::{LogFormat, Reconciler, SyncConfig};
use iamsync_store::PgStore;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    init_tracing(log_format_from_env());
    if let Some(e) = env_file_failure(&dotenv) {
        tracing::warn!(error = %e, "failed to load .env file");
    } else if let Ok(path) = &dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SyncConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let store = PgStore::connect(&config.store)
        .await
        .context("failed to connect to PostgreSQL")?;

    let (directory, audit) = AwsProvider::load(&config.provider).await.into_parts();

    let mut reconciler =
        Reconciler::new(store, directory, audit).with_mark_missing(config.mark_missing);
    reconciler.run().await.context("IAM sync failed")?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
