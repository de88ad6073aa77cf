// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::extra_unused_lifetimes)]

use crate::{
    db::postgres::schema::block,
    error::{ProcessorError, ProcessorResult},
    store::Entity,
    types::BlockHeader,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use field_count::FieldCount;
use serde::{Deserialize, Serialize};

/// One processed chain block. Written once per block and never mutated.
#[derive(
    Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Queryable, Selectable, Insertable, FieldCount,
)]
#[diesel(table_name = block)]
pub struct Block {
    pub id: String,
    pub number: i64,
    pub timestamp: DateTime<Utc>,
}

impl Block {
    /// Fails on a height or timestamp the `block` table cannot hold.
    pub fn from_header(header: &BlockHeader) -> ProcessorResult<Self> {
        let number = i64::try_from(header.height).map_err(|_| {
            ProcessorError::MalformedInput(format!(
                "block {}: height {} out of range",
                header.id, header.height
            ))
        })?;
        let timestamp = DateTime::from_timestamp_millis(header.timestamp).ok_or_else(|| {
            ProcessorError::MalformedInput(format!(
                "block {}: timestamp {} out of range",
                header.id, header.timestamp
            ))
        })?;
        Ok(Self {
            id: header.id.clone(),
            number,
            timestamp,
        })
    }
}

impl Entity for Block {
    const NAME: &'static str = "Block";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
