// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::database::ArcDbPool;
use crate::db::{common::models::processor_status_models::LedgerInfo, postgres::schema::ledger_infos};
use anyhow::{bail, Context, Result};
use diesel::{OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::info;

/// Make sure the database was created for `chain_id`. The first run records it.
pub async fn check_or_update_chain_id(chain_id: u64, db_pool: ArcDbPool) -> Result<u64> {
    info!("🔍 Checking if chain id is correct");
    let mut conn = db_pool
        .get()
        .await
        .context("Failed to get database connection")?;

    let stored = ledger_infos::table
        .select(ledger_infos::chain_id)
        .first::<i64>(&mut conn)
        .await
        .optional()
        .context("Failed to read chain id from ledger_infos")?;

    let configured = i64::try_from(chain_id).context("Chain id does not fit into BIGINT")?;
    match stored {
        Some(stored) => ensure_same_chain(stored, configured)?,
        None => {
            info!("📝 Recording chain id {} in ledger_infos", chain_id);
            diesel::insert_into(ledger_infos::table)
                .values(LedgerInfo {
                    chain_id: configured,
                })
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await
                .context("Failed to record chain id")?;
        },
    }

    info!("✅ Chain id {} matches the database", chain_id);
    Ok(chain_id)
}

fn ensure_same_chain(stored: i64, configured: i64) -> Result<()> {
    if stored != configured {
        bail!(
            "Wrong chain id detected! Database holds chain {}, configuration says {}",
            stored,
            configured
        );
    }
    Ok(())
}
