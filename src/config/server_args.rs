// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::indexer_processor_config::LogFormat;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::runtime::Handle;
use tracing::info;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct ServerArgs {
    #[clap(short, long, value_parser)]
    pub config_path: PathBuf,
}

impl ServerArgs {
    pub async fn run<C>(&self, handle: Handle) -> Result<()>
    where
        C: RunnableConfig,
    {
        let config = load::<C>(&self.config_path)?;
        setup_logging(config.log_format());
        info!(
            "🚀 Starting {} from {}",
            config.get_server_name(),
            self.config_path.display()
        );
        run_server_with_config(config, handle).await
    }
}

/// Configuration that knows how to run the server it describes.
#[async_trait]
pub trait RunnableConfig: DeserializeOwned + Send + Sync + 'static {
    async fn run(&self) -> Result<()>;

    fn get_server_name(&self) -> String;

    fn log_format(&self) -> LogFormat {
        LogFormat::Text
    }
}

pub async fn run_server_with_config<C: RunnableConfig>(config: C, handle: Handle) -> Result<()> {
    let task = handle.spawn(async move { config.run().await });
    task.await.context("Processor task panicked")?
}

pub fn load<C: DeserializeOwned>(path: &Path) -> Result<C> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn setup_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).unwrap_or("info".to_string()),
    );

    let result = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
