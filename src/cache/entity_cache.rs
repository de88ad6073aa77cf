// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::{ProcessorError, ProcessorResult},
    store::{Entity, EntityStore},
};
use ahash::{AHashMap, AHashSet};
use std::{collections::hash_map::Entry, marker::PhantomData, sync::Arc};
use tracing::debug;

/// Ids per `find_by_ids` call issued by [`EntityCache::prefetch_entities`].
pub const PREFETCH_CHUNK_SIZE: usize = 1000;

/// Per-batch write-through cache for one entity kind.
///
/// The cache is the single owner of every entity it hands out: within a batch there
/// is at most one instance per id, and mutations go through `&mut` references into
/// the cache until [`EntityCache::save_all`] writes them back in one bulk upsert.
///
/// Lookups and creation are check-then-act against the map and are only sound while
/// a batch is handled by a single task. Concurrent handlers would need per-id locking.
pub struct EntityCache<E, S> {
    store: Arc<S>,
    entities: AHashMap<String, E>,
    /// Insertion order, so saves and event publishing follow processing order.
    order: Vec<String>,
    prefetch_item_ids: Vec<String>,
    _kind: PhantomData<fn() -> E>,
}

impl<E, S> EntityCache<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            entities: AHashMap::new(),
            order: Vec::new(),
            prefetch_item_ids: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Insert or overwrite the cached slot for `entity.id()`. Never touches storage.
    pub fn add(&mut self, entity: E) -> &mut E {
        match self.entities.entry(entity.id().to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(entity);
                slot.into_mut()
            },
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(entity)
            },
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Cached entity without consulting the store.
    pub fn peek(&self, id: &str) -> Option<&E> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Cached entities in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &E> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Cached entity, or the stored one (which is then cached). `None` when absent
    /// everywhere.
    pub async fn get(&mut self, id: &str) -> ProcessorResult<Option<&mut E>> {
        if self.entities.contains_key(id) {
            return Ok(self.entities.get_mut(id));
        }

        match self.store.find_one(id).await? {
            Some(entity) => {
                debug!("{} {} loaded from store", E::NAME, id);
                Ok(Some(self.add(entity)))
            },
            None => Ok(None),
        }
    }

    /// Like [`EntityCache::get`], for ids the caller guarantees to exist.
    pub async fn get_or_throw(&mut self, id: &str) -> ProcessorResult<&mut E> {
        self.get(id).await?.ok_or_else(|| ProcessorError::NotFound {
            entity: E::NAME,
            id: id.to_string(),
        })
    }

    /// Cached or stored entity, otherwise a new one from `creator` with its id forced
    /// to `id`. `creator` runs at most once per id per batch.
    pub async fn get_or_create<F>(&mut self, id: &str, creator: F) -> ProcessorResult<&mut E>
    where
        F: FnOnce() -> E,
    {
        if !self.entities.contains_key(id) {
            let entity = match self.store.find_one(id).await? {
                Some(entity) => entity,
                None => {
                    debug!("{} {} created", E::NAME, id);
                    let mut entity = creator();
                    entity.set_id(id.to_string());
                    entity
                },
            };
            return Ok(self.add(entity));
        }
        self.get_or_throw(id).await
    }

    /// Evict `id` and delete it from the store if it exists there.
    pub async fn remove(&mut self, id: &str, soft: bool) -> ProcessorResult<()> {
        if self.get(id).await?.is_none() {
            return Ok(());
        }
        self.entities.remove(id);
        self.order.retain(|cached| cached != id);

        if self.store.remove(id, soft).await? {
            debug!("{} {} removed from store (soft: {})", E::NAME, id, soft);
        }
        Ok(())
    }

    /// Upsert every cached entity in one bulk call. Run once per batch, after all
    /// mutations.
    pub async fn save_all(&self) -> ProcessorResult<()> {
        if self.entities.is_empty() {
            return Ok(());
        }
        let entities: Vec<E> = self.values().cloned().collect();
        self.store.save(&entities).await?;
        debug!("Saved {} {} entities", entities.len(), E::NAME);
        Ok(())
    }

    /// Drop every cached entity. Storage is left untouched.
    pub fn reset_all(&mut self) {
        self.entities.clear();
        self.order.clear();
    }

    /// Queue ids for the next [`EntityCache::prefetch_entities`] call.
    pub fn add_prefetch_item_id(&mut self, id: impl Into<String>) {
        self.prefetch_item_ids.push(id.into());
    }

    pub fn add_prefetch_item_ids<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.prefetch_item_ids
            .extend(ids.into_iter().map(Into::into));
    }

    pub fn reset_prefetch_item_ids_list(&mut self) {
        self.prefetch_item_ids.clear();
    }

    pub fn prefetch_item_ids(&self) -> &[String] {
        &self.prefetch_item_ids
    }

    /// Load every queued id that is not cached yet, [`PREFETCH_CHUNK_SIZE`] ids per
    /// store call, then clear the queue.
    pub async fn prefetch_entities(&mut self) -> ProcessorResult<()> {
        if self.prefetch_item_ids.is_empty() {
            return Ok(());
        }

        let mut seen = AHashSet::new();
        let pending: Vec<String> = std::mem::take(&mut self.prefetch_item_ids)
            .into_iter()
            .filter(|id| !self.entities.contains_key(id) && seen.insert(id.clone()))
            .collect();

        let mut loaded = 0;
        for chunk in pending.chunks(PREFETCH_CHUNK_SIZE) {
            for entity in self.store.find_by_ids(chunk).await? {
                // An entity created or loaded meanwhile wins over the stored copy.
                if !self.entities.contains_key(entity.id()) {
                    self.add(entity);
                    loaded += 1;
                }
            }
        }

        debug!(
            "Prefetched {} of {} requested {} entities",
            loaded,
            pending.len(),
            E::NAME
        );
        Ok(())
    }
}
