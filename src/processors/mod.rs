// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Set-Code Transaction Processing
//!
//! ```text
//! BlockSource → IndexerProcessor → BatchProcessor → SetCodeTransactionHandler
//!                     ↓                   ↓
//!             processor_status      BatchContext → EntityStore / EventSink
//! ```

pub mod batch_processor;
pub mod indexer_processor;
pub mod set_code_handler;

pub use batch_processor::{BatchProcessor, BatchSummary};
pub use indexer_processor::IndexerProcessor;
pub use set_code_handler::{SetCodeTransactionHandler, TransactionState};
