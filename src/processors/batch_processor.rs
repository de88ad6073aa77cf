// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::set_code_handler::SetCodeTransactionHandler;
use crate::{
    cache::BatchContext,
    db::common::models::block_models::Block,
    error::ProcessorResult,
    event_bus::ProcessorState,
    store::IndexerStore,
    types::{BlockData, Transaction},
    utils::entity_ids::{account_id, designator_id},
};
use std::sync::Arc;
use tracing::{error, info};

/// Counts for one processed batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub blocks: usize,
    pub transactions: usize,
    pub qualifying: usize,
    pub accounts: usize,
    pub designators: usize,
    pub events: usize,
}

/// Runs one batch of blocks through the handler and persists the result.
///
/// A batch is all-or-nothing: nothing is saved unless every qualifying transaction was
/// handled, and replaying a batch converges to the same rows.
pub struct BatchProcessor<S: IndexerStore> {
    store: Arc<S>,
    state: ProcessorState,
    handler: SetCodeTransactionHandler,
}

impl<S: IndexerStore> BatchProcessor<S> {
    pub fn new(store: Arc<S>, state: ProcessorState, chain_id: u64) -> Self {
        Self {
            store,
            state,
            handler: SetCodeTransactionHandler::new(chain_id),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn process_batch(&self, blocks: &[BlockData]) -> ProcessorResult<BatchSummary> {
        let mut ctx = BatchContext::new(self.store.clone(), &self.state);
        let result = self.run(&mut ctx, blocks).await;
        ctx.reset_all();

        match &result {
            Ok(summary) => info!(
                "✅ Batch done: {} blocks, {} transactions, {} set-code, {} accounts, {} designators",
                summary.blocks,
                summary.transactions,
                summary.qualifying,
                summary.accounts,
                summary.designators
            ),
            Err(e) => error!("❌ Batch aborted, nothing saved: {}", e),
        }
        result
    }

    async fn run(
        &self,
        ctx: &mut BatchContext<S>,
        blocks: &[BlockData],
    ) -> ProcessorResult<BatchSummary> {
        for block in blocks {
            ctx.blocks.add(Block::from_header(&block.header)?);
        }

        let transactions: Vec<&Transaction> =
            blocks.iter().flat_map(|block| &block.transactions).collect();
        let qualifying: Vec<&Transaction> = transactions
            .iter()
            .copied()
            .filter(|tx| SetCodeTransactionHandler::is_qualifying(tx))
            .collect();

        self.prefetch(ctx, &qualifying).await?;

        for transaction in &qualifying {
            self.handler.handle(ctx, transaction).await?;
        }

        let summary = BatchSummary {
            blocks: blocks.len(),
            transactions: transactions.len(),
            qualifying: qualifying.len(),
            accounts: ctx.accounts.len(),
            designators: ctx.designators.len(),
            events: ctx.events.len(),
        };

        ctx.save_all().await?;
        ctx.flush_events().await?;
        Ok(summary)
    }

    /// Bulk-load the accounts and designators the batch is about to touch.
    async fn prefetch(
        &self,
        ctx: &mut BatchContext<S>,
        qualifying: &[&Transaction],
    ) -> ProcessorResult<()> {
        let chain_id = self.handler.chain_id();
        for transaction in qualifying {
            if let Some(to) = SetCodeTransactionHandler::account_address(transaction) {
                ctx.accounts.add_prefetch_item_id(account_id(chain_id, &to));
            }
            if let Some(delegate) = SetCodeTransactionHandler::delegate_address(transaction) {
                ctx.designators
                    .add_prefetch_item_id(designator_id(chain_id, &delegate));
            }
        }
        ctx.accounts.prefetch_entities().await?;
        ctx.designators.prefetch_entities().await?;
        Ok(())
    }
}
