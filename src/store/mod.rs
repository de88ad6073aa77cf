// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Persistence Seam
//!
//! The batch pipeline only talks to storage through [`EntityStore`], one
//! implementation per entity kind. Two backends exist:
//!
//! - [`crate::db::postgres::PgStore`]: diesel-async on PostgreSQL, used in production
//! - [`InMemoryStore`]: serde_json rows behind a mutex, used by tests
//!
//! Every `save` is an upsert keyed by entity id, so replaying a batch converges to the
//! same rows instead of duplicating them.

use crate::db::common::models::{
    account_models::Account, block_models::Block, designator_models::Designator,
    event_models::Event,
};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryStore;

/// A row type addressed by an opaque, stable string id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Entity kind, used in error messages and as the in-memory table name.
    const NAME: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, pool or query failure.
    #[error("{message}")]
    Unavailable { message: String },

    /// A stored row could not be mapped to or from its entity.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// ORM-style primitives for one entity kind.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Load a single live (not soft-removed) entity.
    async fn find_one(&self, id: &str) -> StoreResult<Option<E>>;

    /// Load every live entity whose id is in `ids`. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[String]) -> StoreResult<Vec<E>>;

    /// Insert-or-update by id.
    async fn save(&self, entities: &[E]) -> StoreResult<()>;

    /// Delete the row for `id`, or mark it removed when `soft` is set.
    /// Returns whether a live row existed.
    async fn remove(&self, id: &str, soft: bool) -> StoreResult<bool>;
}

/// A store holding every entity kind the batch pipeline touches.
pub trait IndexerStore:
    EntityStore<Block> + EntityStore<Account> + EntityStore<Designator> + EntityStore<Event> + 'static
{
}

impl<T> IndexerStore for T where
    T: EntityStore<Block>
        + EntityStore<Account>
        + EntityStore<Designator>
        + EntityStore<Event>
        + 'static
{
}
