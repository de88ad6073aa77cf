// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

pub mod pg_store;
pub mod schema;

pub use pg_store::PgStore;
