// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! # Outbound Event Bus
//!
//! Events recorded during a batch are handed to an [`EventSink`] once the batch has
//! been saved. The sink is built once per process from configuration and shared by
//! every batch through [`ProcessorState`].

use crate::{
    config::indexer_processor_config::EventSinkConfig, db::common::models::event_models::Event,
    error::ProcessorResult,
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod sinks;

pub use sinks::{ChannelEventSink, NoopEventSink, TracingEventSink};

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver `events` in order. An error aborts the batch.
    async fn publish(&self, events: &[Event]) -> ProcessorResult<()>;
}

/// Process-wide state shared by every batch. Holds no batch-specific data.
#[derive(Clone)]
pub struct ProcessorState {
    pub event_sink: Arc<dyn EventSink>,
}

impl ProcessorState {
    pub fn new(event_sink: Arc<dyn EventSink>) -> Self {
        Self { event_sink }
    }

    pub fn from_config(config: &EventSinkConfig) -> Self {
        match config {
            EventSinkConfig::Noop => Self::new(Arc::new(NoopEventSink)),
            EventSinkConfig::Log => Self::new(Arc::new(TracingEventSink)),
        }
    }
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self::new(Arc::new(NoopEventSink))
    }
}
