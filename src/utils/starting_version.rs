// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::database::ArcDbPool;
use crate::{
    config::indexer_processor_config::IndexerProcessorConfig,
    db::{common::models::processor_status_models::ProcessorStatus, postgres::schema::processor_status},
};
use anyhow::{Context, Result};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::info;

/// First block to process: the configured range start, or the block after the last
/// checkpoint when that is further along.
pub async fn get_starting_block(
    indexer_processor_config: &IndexerProcessorConfig,
    conn_pool: ArcDbPool,
) -> Result<u64> {
    let last_success_block = get_last_success_block(
        indexer_processor_config.processor_config.name(),
        conn_pool,
    )
    .await?;
    let starting_block = resume_from(indexer_processor_config.block_range.from, last_success_block);

    info!("🚀 Starting from block {}", starting_block);
    Ok(starting_block)
}

async fn get_last_success_block(processor: &str, conn_pool: ArcDbPool) -> Result<Option<u64>> {
    let mut conn = conn_pool
        .get()
        .await
        .context("Failed to get database connection")?;

    let status = processor_status::table
        .filter(processor_status::processor.eq(processor))
        .select(ProcessorStatus::as_select())
        .first(&mut conn)
        .await
        .optional()
        .context("Failed to read processor status")?;

    Ok(status.map(|status| status.last_success_block.max(0) as u64))
}

pub fn resume_from(configured_from: u64, last_success_block: Option<u64>) -> u64 {
    match last_success_block {
        Some(last) => configured_from.max(last.saturating_add(1)),
        None => configured_from,
    }
}
