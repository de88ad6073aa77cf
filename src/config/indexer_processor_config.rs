// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::{processor_config::ProcessorConfig, server_args::RunnableConfig};
use crate::{processors::IndexerProcessor, source::BlockRange};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DB_POOL_SIZE: u32 = 50;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexerProcessorConfig {
    pub processor_config: ProcessorConfig,
    #[serde(default)]
    pub block_range: BlockRangeConfig,
    pub db_config: DbConfig,
    pub block_source_config: BlockSourceConfig,
    #[serde(default)]
    pub event_sink_config: EventSinkConfig,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[async_trait]
impl RunnableConfig for IndexerProcessorConfig {
    async fn run(&self) -> Result<()> {
        let processor = IndexerProcessor::new(self.clone()).await?;
        processor.run_processor().await
    }

    fn get_server_name(&self) -> String {
        self.processor_config.name().to_string()
    }

    fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Inclusive block height window to index.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlockRangeConfig {
    #[serde(default)]
    pub from: u64,
    #[serde(default)]
    pub to: Option<u64>,
}

impl From<BlockRangeConfig> for BlockRange {
    fn from(config: BlockRangeConfig) -> Self {
        BlockRange::new(config.from, config.to)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    pub postgres_connection_string: String,
    #[serde(default = "DbConfig::default_db_pool_size")]
    pub db_pool_size: u32,
}

impl DbConfig {
    pub const fn default_db_pool_size() -> u32 {
        DEFAULT_DB_POOL_SIZE
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSourceConfig {
    /// Newline-delimited JSON blocks, one per line.
    JsonLines { path: PathBuf },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSinkConfig {
    #[default]
    Noop,
    Log,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
