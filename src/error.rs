// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Error types for batch processing.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that abort the current batch.
///
/// Expected conditions (a malformed `to` address, an empty authorization list) never
/// show up here: the transaction classifier absorbs them by ignoring the transaction.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// An entity the pipeline guarantees to exist is missing. Indicates an ordering
    /// bug (for example a transaction handled before its block was cached).
    #[error("{entity} with id {id} expected to exist")]
    NotFound { entity: &'static str, id: String },

    /// The persistent store could not be reached or rejected a query.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Chain data could not be decoded into the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The outbound event sink rejected a publish.
    #[error("failed to publish events: {0}")]
    EventPublish(String),

    #[error("{message}")]
    ProcessError { message: String },
}

impl ProcessorError {
    pub fn process(message: impl Into<String>) -> Self {
        ProcessorError::ProcessError {
            message: message.into(),
        }
    }
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;
