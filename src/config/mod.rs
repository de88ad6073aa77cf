// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Configuration Management
//!
//! The indexer is configured from a single YAML file passed with `--config-path`:
//!
//! - **IndexerProcessorConfig**: top-level container, also the runnable entry point
//! - **ProcessorConfig**: processor type and chain settings
//! - **DbConfig**: PostgreSQL connection and pooling
//! - **BlockSourceConfig** / **EventSinkConfig**: where blocks come from and where
//!   recorded events go

pub mod indexer_processor_config;
pub mod processor_config;
pub mod server_args;

pub use indexer_processor_config::IndexerProcessorConfig;
pub use server_args::{RunnableConfig, ServerArgs};
