// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # EIP-7702 Set-Code Indexer
//!
//! Tracks which accounts delegated their code to which contracts. Every batch of
//! blocks goes through [`processors::BatchProcessor`]: block entities are cached,
//! qualifying set-code transactions are handled in order, and accounts, designators,
//! blocks and events are upserted together before the batch's events are published.

pub mod cache;
pub mod common;
pub mod config;
pub mod db;
pub mod error;
pub mod event_bus;
pub mod processors;
pub mod source;
pub mod store;
pub mod types;
pub mod utils;
