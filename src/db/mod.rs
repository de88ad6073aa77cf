// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Database Layer
//!
//! Models, schema and the PostgreSQL store backing the batch pipeline.
//!
//! ## Database Schema
//!
//! - `block`: one row per processed block
//! - `account`: tracked addresses and their current designator
//! - `designator`: every delegate contract ever observed
//! - `event`: one row per qualifying set-code transaction
//! - `ledger_infos`: chain id the database was created for
//! - `processor_status`: last successfully processed block
//!
//! A batch is saved one entity kind at a time, each kind in its own statement and not
//! inside a shared transaction. Referenced kinds are written before their dependents
//! (designators, accounts, blocks, events) so every foreign key resolves when the row
//! lands. The foreign keys are declared `DEFERRABLE INITIALLY DEFERRED` but nothing
//! relies on deferral today.

/// Common database models and shared data structures
pub mod common;

/// PostgreSQL-specific implementation including the entity store and schema
pub mod postgres;
