// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::batch_processor::BatchProcessor;
use crate::{
    common::{get_processor_status_saver, ProcessorStatusSaver},
    config::indexer_processor_config::{BlockSourceConfig, IndexerProcessorConfig},
    db::postgres::PgStore,
    error::ProcessorResult,
    event_bus::ProcessorState,
    source::{BlockRange, BlockSource, JsonLinesBlockSource},
    store::IndexerStore,
    utils::{
        chain_id::check_or_update_chain_id,
        database::{new_db_pool, run_migrations, ArcDbPool},
        starting_version::get_starting_block,
    },
};
use anyhow::Result;
use std::{sync::Arc, time::Instant};
use tracing::info;

/// Wires configuration, storage, the block feed and checkpointing around
/// [`BatchProcessor`].
pub struct IndexerProcessor {
    pub config: IndexerProcessorConfig,
    pub db_pool: ArcDbPool,
}

impl IndexerProcessor {
    pub async fn new(config: IndexerProcessorConfig) -> Result<Self> {
        let db_pool = new_db_pool(
            &config.db_config.postgres_connection_string,
            Some(config.db_config.db_pool_size),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create connection pool for PostgresConfig: {}", e))?;

        Ok(Self { config, db_pool })
    }

    pub async fn run_processor(self) -> Result<()> {
        run_migrations(self.config.db_config.postgres_connection_string.clone()).await?;

        let processor_config = self.config.processor_config.set_code();
        let chain_id = check_or_update_chain_id(processor_config.chain_id, self.db_pool.clone()).await?;
        let starting_block = get_starting_block(&self.config, self.db_pool.clone()).await?;

        let range = BlockRange::new(starting_block, self.config.block_range.to);
        let mut source = match &self.config.block_source_config {
            BlockSourceConfig::JsonLines { path } => {
                JsonLinesBlockSource::open(path, range, processor_config.batch_size).await?
            },
        };

        let store = Arc::new(PgStore::new(self.db_pool.clone()));
        let state = ProcessorState::from_config(&self.config.event_sink_config);
        let batch_processor = BatchProcessor::new(store, state, chain_id);
        let status_saver = get_processor_status_saver(self.db_pool.clone(), &self.config);

        info!(
            "🔥 {} indexing chain {} from block {}",
            self.config.processor_config.name(),
            chain_id,
            starting_block
        );
        let batches = run_batches(&batch_processor, &mut source, &status_saver).await?;
        info!("🏁 Block feed exhausted after {} batches", batches);
        Ok(())
    }
}

/// Process every batch the source yields, checkpointing after each one. Returns the
/// number of batches processed. Stops at the first failed batch, leaving the checkpoint
/// at the last good one.
pub async fn run_batches<S, B, P>(
    batch_processor: &BatchProcessor<S>,
    source: &mut B,
    status_saver: &P,
) -> ProcessorResult<usize>
where
    S: IndexerStore,
    B: BlockSource + ?Sized,
    P: ProcessorStatusSaver + ?Sized,
{
    let mut batches = 0;
    while let Some(blocks) = source.next_batch().await? {
        let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
            continue;
        };
        let (first_height, last_header) = (first.header.height, last.header.clone());
        let started = Instant::now();

        let summary = batch_processor.process_batch(&blocks).await?;
        status_saver.save_processor_status(&last_header).await?;
        batches += 1;

        info!(
            "📊 Blocks [{}, {}]: {} events recorded in {:.2}s",
            first_height,
            last_header.height,
            summary.events,
            started.elapsed().as_secs_f64()
        );
    }
    Ok(batches)
}
