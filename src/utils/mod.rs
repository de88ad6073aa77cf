// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Utility Functions and Shared Components
//!
//! - `database`: connection pool, TLS setup, embedded migrations
//! - `chain_id`: guards against indexing into a database created for another chain
//! - `starting_version`: resume point from the last checkpoint
//! - `entity_ids` / `address`: id derivation and address validation used by the handler

pub mod address;
pub mod chain_id;
pub mod database;
pub mod entity_ids;
pub mod starting_version;
