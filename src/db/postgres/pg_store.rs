// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    db::{
        common::models::{
            account_models::Account,
            block_models::Block,
            designator_models::Designator,
            event_models::{Event, EventRow},
        },
        postgres::schema::{account, block, designator, event},
    },
    store::{Entity, EntityStore, StoreError, StoreResult},
    utils::database::{get_config_table_chunk_size, ArcDbPool, DbPoolConnection},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    pg::Pg, upsert::excluded, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::{debug, error};

/// Maps an entity onto the row diesel reads and writes.
pub trait PgRow: Entity + Sized {
    type Row;

    fn to_row(&self) -> StoreResult<Self::Row>;

    fn from_row(row: Self::Row) -> StoreResult<Self>;
}

macro_rules! identity_row {
    ($entity:ty) => {
        impl PgRow for $entity {
            type Row = $entity;

            fn to_row(&self) -> StoreResult<Self::Row> {
                Ok(self.clone())
            }

            fn from_row(row: Self::Row) -> StoreResult<Self> {
                Ok(row)
            }
        }
    };
}

identity_row!(Block);
identity_row!(Account);
identity_row!(Designator);

impl PgRow for Event {
    type Row = EventRow;

    fn to_row(&self) -> StoreResult<Self::Row> {
        EventRow::try_from(self)
    }

    fn from_row(row: Self::Row) -> StoreResult<Self> {
        Event::try_from(row)
    }
}

/// PostgreSQL-backed [`EntityStore`] for every entity kind.
///
/// Soft-removed rows (`deleted_at` set) are invisible to reads; an upsert revives them.
#[derive(Clone)]
pub struct PgStore {
    connection_pool: ArcDbPool,
}

impl PgStore {
    pub fn new(connection_pool: ArcDbPool) -> Self {
        Self { connection_pool }
    }

    pub fn pool(&self) -> &ArcDbPool {
        &self.connection_pool
    }

    async fn conn(&self) -> StoreResult<DbPoolConnection<'_>> {
        self.connection_pool.get().await.map_err(|e| {
            StoreError::unavailable(format!("Failed to get database connection: {}", e))
        })
    }
}

fn query_error(entity: &str, action: &str, err: diesel::result::Error) -> StoreError {
    error!("❌ Failed to {} {}: {}", action, entity, err);
    StoreError::unavailable(format!("Failed to {} {}: {}", action, entity, err))
}

fn from_rows<E: PgRow>(rows: Vec<E::Row>) -> StoreResult<Vec<E>> {
    rows.into_iter().map(E::from_row).collect()
}

macro_rules! pg_entity_store {
    ($entity:ty, $table:ident, [$($column:ident),* $(,)?]) => {
        #[async_trait]
        impl EntityStore<$entity> for PgStore {
            async fn find_one(&self, id: &str) -> StoreResult<Option<$entity>> {
                let mut conn = self.conn().await?;
                let row = $table::table
                    .filter($table::id.eq(id))
                    .filter($table::deleted_at.is_null())
                    .select(<<$entity as PgRow>::Row as SelectableHelper<Pg>>::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(|e| query_error(<$entity>::NAME, "load", e))?;
                row.map(<$entity as PgRow>::from_row).transpose()
            }

            async fn find_by_ids(&self, ids: &[String]) -> StoreResult<Vec<$entity>> {
                if ids.is_empty() {
                    return Ok(vec![]);
                }
                let mut conn = self.conn().await?;
                let rows = $table::table
                    .filter($table::id.eq_any(ids))
                    .filter($table::deleted_at.is_null())
                    .select(<<$entity as PgRow>::Row as SelectableHelper<Pg>>::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(|e| query_error(<$entity>::NAME, "prefetch", e))?;
                from_rows::<$entity>(rows)
            }

            async fn save(&self, entities: &[$entity]) -> StoreResult<()> {
                if entities.is_empty() {
                    return Ok(());
                }
                let rows = entities
                    .iter()
                    .map(PgRow::to_row)
                    .collect::<StoreResult<Vec<_>>>()?;

                let mut conn = self.conn().await?;
                let chunk_size = get_config_table_chunk_size::<<$entity as PgRow>::Row>();
                for chunk in rows.chunks(chunk_size) {
                    diesel::insert_into($table::table)
                        .values(chunk)
                        .on_conflict($table::id)
                        .do_update()
                        .set((
                            $($table::$column.eq(excluded($table::$column)),)*
                            $table::deleted_at.eq(None::<DateTime<Utc>>),
                        ))
                        .execute(&mut conn)
                        .await
                        .map_err(|e| query_error(<$entity>::NAME, "upsert", e))?;
                }
                debug!("💾 Upserted {} {} rows", rows.len(), <$entity>::NAME);
                Ok(())
            }

            async fn remove(&self, id: &str, soft: bool) -> StoreResult<bool> {
                let mut conn = self.conn().await?;
                let live = $table::table
                    .filter($table::id.eq(id))
                    .filter($table::deleted_at.is_null());
                let affected = if soft {
                    diesel::update(live)
                        .set($table::deleted_at.eq(Some(Utc::now())))
                        .execute(&mut conn)
                        .await
                } else {
                    diesel::delete(live).execute(&mut conn).await
                }
                .map_err(|e| query_error(<$entity>::NAME, "remove", e))?;
                Ok(affected > 0)
            }
        }
    };
}

pg_entity_store!(Block, block, [number, timestamp]);
pg_entity_store!(Designator, designator, [address]);
pg_entity_store!(Account, account, [address, designator_id]);
pg_entity_store!(
    Event,
    event,
    [
        block_id,
        transaction_hash,
        event_type,
        payload,
        from_,
        designator_id,
        account_id,
    ]
);
