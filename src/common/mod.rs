// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Processor Status
//!
//! After every successful batch the last processed block is written to
//! `processor_status`, so a restart resumes right after it instead of replaying the
//! whole range.

pub mod processor_status_saver;

pub use processor_status_saver::{
    get_processor_status_saver, PgProcessorStatusSaver, ProcessorStatusSaver,
};
