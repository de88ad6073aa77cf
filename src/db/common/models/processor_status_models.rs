// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::extra_unused_lifetimes)]

use crate::db::postgres::schema::{ledger_infos, processor_status};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Queryable, Selectable)]
#[diesel(table_name = processor_status)]
pub struct ProcessorStatus {
    pub processor: String,
    pub last_success_block: i64,
    pub last_updated: NaiveDateTime,
    pub last_block_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Insertable)]
#[diesel(table_name = processor_status)]
pub struct NewProcessorStatus {
    pub processor: String,
    pub last_success_block: i64,
    pub last_block_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Queryable, Insertable)]
#[diesel(table_name = ledger_infos)]
pub struct LedgerInfo {
    pub chain_id: i64,
}
