// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::extra_unused_lifetimes)]

use crate::{db::postgres::schema::account, store::Entity};
use diesel::prelude::*;
use field_count::FieldCount;
use serde::{Deserialize, Serialize};

/// An address tracked by the indexer.
///
/// `designator_id` is a weak reference: it is rewritten on every observed set-code
/// transaction and cleared when a transaction carries no delegation.
#[derive(
    Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Queryable, Selectable, Insertable, FieldCount,
)]
#[diesel(table_name = account)]
pub struct Account {
    pub id: String,
    pub address: String,
    pub designator_id: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            designator_id: None,
        }
    }
}

impl Entity for Account {
    const NAME: &'static str = "Account";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
