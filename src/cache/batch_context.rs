// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::EntityCache;
use crate::{
    db::common::models::{
        account_models::Account, block_models::Block, designator_models::Designator,
        event_models::Event,
    },
    error::ProcessorResult,
    event_bus::{EventSink, ProcessorState},
    store::IndexerStore,
};
use std::sync::Arc;
use tracing::debug;

/// One cache per entity kind plus the outbound event sink, for a single batch.
pub struct BatchContext<S: IndexerStore> {
    pub designators: EntityCache<Designator, S>,
    pub accounts: EntityCache<Account, S>,
    pub blocks: EntityCache<Block, S>,
    pub events: EntityCache<Event, S>,
    event_sink: Arc<dyn EventSink>,
}

impl<S: IndexerStore> BatchContext<S> {
    pub fn new(store: Arc<S>, state: &ProcessorState) -> Self {
        Self {
            designators: EntityCache::new(store.clone()),
            accounts: EntityCache::new(store.clone()),
            blocks: EntityCache::new(store.clone()),
            events: EntityCache::new(store),
            event_sink: state.event_sink.clone(),
        }
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.add(event);
    }

    /// Publish every cached event in recording order. The event cache is left intact.
    pub async fn flush_events(&self) -> ProcessorResult<()> {
        let events: Vec<Event> = self.events.values().cloned().collect();
        if events.is_empty() {
            return Ok(());
        }
        self.event_sink.publish(&events).await?;
        debug!("Flushed {} events", events.len());
        Ok(())
    }

    /// Persist every cache, referenced kinds before their dependents.
    pub async fn save_all(&self) -> ProcessorResult<()> {
        self.designators.save_all().await?;
        self.accounts.save_all().await?;
        self.blocks.save_all().await?;
        self.events.save_all().await?;
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.designators.reset_all();
        self.accounts.reset_all();
        self.blocks.reset_all();
        self.events.reset_all();
    }

    /// The designator an account currently points at, loaded through the designator
    /// cache. `None` when the account is unknown or has no delegation.
    pub async fn account_designator(
        &mut self,
        account_id: &str,
    ) -> ProcessorResult<Option<&mut Designator>> {
        let designator_id = match self.accounts.get(account_id).await? {
            Some(account) => account.designator_id.clone(),
            None => None,
        };
        match designator_id {
            Some(designator_id) => self.designators.get(&designator_id).await,
            None => Ok(None),
        }
    }
}
