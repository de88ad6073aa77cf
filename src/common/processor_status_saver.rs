// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    config::indexer_processor_config::IndexerProcessorConfig,
    db::{
        common::models::processor_status_models::NewProcessorStatus,
        postgres::schema::processor_status,
    },
    error::{ProcessorError, ProcessorResult},
    store::StoreError,
    types::BlockHeader,
    utils::database::ArcDbPool,
};
use async_trait::async_trait;
use chrono::DateTime;
use diesel::{
    pg::Pg,
    query_builder::{QueryFragment, QueryId},
    query_dsl::methods::FilterDsl,
    upsert::excluded,
    ExpressionMethods,
};
use diesel_async::RunQueryDsl;
use tracing::debug;

#[async_trait]
pub trait ProcessorStatusSaver: Send + Sync {
    /// Record `last_block` as the newest fully processed block.
    async fn save_processor_status(&self, last_block: &BlockHeader) -> ProcessorResult<()>;
}

pub fn get_processor_status_saver(
    db_pool: ArcDbPool,
    config: &IndexerProcessorConfig,
) -> PgProcessorStatusSaver {
    PgProcessorStatusSaver {
        db_pool,
        processor_name: config.processor_config.name().to_string(),
    }
}

pub struct PgProcessorStatusSaver {
    db_pool: ArcDbPool,
    processor_name: String,
}

fn new_status(processor: &str, last_block: &BlockHeader) -> ProcessorResult<NewProcessorStatus> {
    let last_success_block = i64::try_from(last_block.height).map_err(|_| {
        ProcessorError::MalformedInput(format!(
            "block {}: height {} out of range",
            last_block.id, last_block.height
        ))
    })?;
    Ok(NewProcessorStatus {
        processor: processor.to_string(),
        last_success_block,
        last_block_timestamp: DateTime::from_timestamp_millis(last_block.timestamp),
    })
}

/// Upsert that never moves the checkpoint backwards.
fn status_upsert(status: &NewProcessorStatus) -> impl QueryFragment<Pg> + QueryId + Send + '_ {
    diesel::insert_into(processor_status::table)
        .values(status)
        .on_conflict(processor_status::processor)
        .do_update()
        .set((
            processor_status::last_success_block.eq(excluded(processor_status::last_success_block)),
            processor_status::last_updated.eq(diesel::dsl::now),
            processor_status::last_block_timestamp
                .eq(excluded(processor_status::last_block_timestamp)),
        ))
        .filter(processor_status::last_success_block.le(excluded(processor_status::last_success_block)))
}

#[async_trait]
impl ProcessorStatusSaver for PgProcessorStatusSaver {
    async fn save_processor_status(&self, last_block: &BlockHeader) -> ProcessorResult<()> {
        let status = new_status(&self.processor_name, last_block)?;

        let mut conn = self.db_pool.get().await.map_err(|e| {
            StoreError::unavailable(format!("Failed to get database connection: {}", e))
        })?;

        status_upsert(&status)
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to save processor status: {}", e)))?;

        debug!(
            "🔄 {} processed successfully up to block {}",
            self.processor_name, last_block.height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(height: u64) -> BlockHeader {
        BlockHeader {
            id: "B1".to_string(),
            height,
            hash: "0xb1".to_string(),
            timestamp: 1_731_618_108_000,
        }
    }

    #[test]
    fn test_status_upsert_only_moves_forward() {
        let status = new_status("setcode_processor", &header(10)).unwrap();
        let sql = diesel::debug_query::<Pg, _>(&status_upsert(&status)).to_string();

        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("DO UPDATE SET"));
        assert!(sql.contains("WHERE"));
        assert!(sql.contains("<= excluded"));
    }

    #[test]
    fn test_new_status_rejects_out_of_range_height() {
        let err = new_status("setcode_processor", &header(u64::MAX)).unwrap_err();
        assert!(matches!(err, ProcessorError::MalformedInput(_)));

        let status = new_status("setcode_processor", &header(10)).unwrap();
        assert_eq!(status.last_success_block, 10);
        assert_eq!(
            status.last_block_timestamp.map(|ts| ts.timestamp()),
            Some(1_731_618_108)
        );
    }

    #[test]
    fn test_connection_failure_is_store_unavailable() {
        let err: ProcessorError =
            StoreError::unavailable("Failed to get database connection: timed out").into();
        assert!(matches!(err, ProcessorError::StoreUnavailable(_)));
    }
}
