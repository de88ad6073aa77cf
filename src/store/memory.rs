// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::{Entity, EntityStore, StoreError, StoreResult};
use ahash::AHashMap;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};
use tracing::debug;

/// Call counters, used to assert on lookup batching and on the absence of writes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub find_one_calls: usize,
    /// Number of ids requested by each `find_by_ids` call, in call order.
    pub find_by_ids_calls: Vec<usize>,
    pub save_calls: usize,
    /// Entity kind of each `save` call, in call order.
    pub saved_kinds: Vec<&'static str>,
    pub saved_rows: usize,
    pub remove_calls: usize,
}

struct StoredRow {
    value: serde_json::Value,
    removed: bool,
}

#[derive(Default)]
struct Inner {
    tables: AHashMap<&'static str, BTreeMap<String, StoredRow>>,
    stats: StoreStats,
}

/// Store keeping each entity as a serde_json row.
///
/// Entities are copied in and out, so the store never aliases a cached instance.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().map(|inner| inner.stats.clone()).unwrap_or_default()
    }

    pub fn reset_stats(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.stats = StoreStats::default();
        }
    }

    /// Every live row of kind `E`, ordered by id.
    pub fn rows<E>(&self) -> StoreResult<Vec<E>>
    where
        E: Entity + DeserializeOwned,
    {
        let inner = self.lock()?;
        let Some(table) = inner.tables.get(E::NAME) else {
            return Ok(vec![]);
        };
        table
            .values()
            .filter(|row| !row.removed)
            .map(|row| serde_json::from_value(row.value.clone()).map_err(StoreError::from))
            .collect()
    }

    /// Number of rows of kind `E`, soft-removed ones included.
    pub fn row_count<E: Entity>(&self) -> usize {
        self.lock()
            .ok()
            .and_then(|inner| inner.tables.get(E::NAME).map(|table| table.len()))
            .unwrap_or(0)
    }

    pub fn is_soft_removed<E: Entity>(&self, id: &str) -> bool {
        self.lock()
            .ok()
            .and_then(|inner| {
                inner
                    .tables
                    .get(E::NAME)
                    .and_then(|table| table.get(id))
                    .map(|row| row.removed)
            })
            .unwrap_or(false)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::unavailable(format!("in-memory store poisoned: {}", e)))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl<E> EntityStore<E> for InMemoryStore
where
    E: Entity + Serialize + DeserializeOwned,
{
    async fn find_one(&self, id: &str) -> StoreResult<Option<E>> {
        self.check_available()?;
        let mut inner = self.lock()?;
        inner.stats.find_one_calls += 1;

        match inner.tables.get(E::NAME).and_then(|table| table.get(id)) {
            Some(row) if !row.removed => Ok(Some(serde_json::from_value(row.value.clone())?)),
            _ => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[String]) -> StoreResult<Vec<E>> {
        self.check_available()?;
        let mut inner = self.lock()?;
        inner.stats.find_by_ids_calls.push(ids.len());

        let Some(table) = inner.tables.get(E::NAME) else {
            return Ok(vec![]);
        };
        let mut found = Vec::new();
        for id in ids {
            if let Some(row) = table.get(id).filter(|row| !row.removed) {
                found.push(serde_json::from_value(row.value.clone())?);
            }
        }
        Ok(found)
    }

    async fn save(&self, entities: &[E]) -> StoreResult<()> {
        self.check_available()?;
        let rows = entities
            .iter()
            .map(|entity| {
                serde_json::to_value(entity)
                    .map(|value| (entity.id().to_string(), value))
                    .map_err(StoreError::from)
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let mut inner = self.lock()?;
        inner.stats.save_calls += 1;
        inner.stats.saved_kinds.push(E::NAME);
        inner.stats.saved_rows += rows.len();

        let table = inner.tables.entry(E::NAME).or_default();
        for (id, value) in rows {
            table.insert(
                id,
                StoredRow {
                    value,
                    removed: false,
                },
            );
        }
        debug!("Saved {} {} rows in memory", entities.len(), E::NAME);
        Ok(())
    }

    async fn remove(&self, id: &str, soft: bool) -> StoreResult<bool> {
        self.check_available()?;
        let mut inner = self.lock()?;
        inner.stats.remove_calls += 1;

        let Some(table) = inner.tables.get_mut(E::NAME) else {
            return Ok(false);
        };
        if !table.get(id).is_some_and(|row| !row.removed) {
            return Ok(false);
        }
        if soft {
            if let Some(row) = table.get_mut(id) {
                row.removed = true;
            }
        } else {
            table.remove(id);
        }
        Ok(true)
    }
}
