// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::extra_unused_lifetimes)]

use crate::{db::postgres::schema::designator, store::Entity};
use diesel::prelude::*;
use field_count::FieldCount;
use serde::{Deserialize, Serialize};

/// A delegate contract some account has pointed its code at. Immutable once created.
#[derive(
    Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Queryable, Selectable, Insertable, FieldCount,
)]
#[diesel(table_name = designator)]
pub struct Designator {
    pub id: String,
    pub address: String,
}

impl Designator {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

impl Entity for Designator {
    const NAME: &'static str = "Designator";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
