// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::EventSink;
use crate::{
    db::common::models::event_models::Event,
    error::{ProcessorError, ProcessorResult},
};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

/// Drops every event. Used when no external bus is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish(&self, _events: &[Event]) -> ProcessorResult<()> {
        Ok(())
    }
}

/// Logs one line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, events: &[Event]) -> ProcessorResult<()> {
        for event in events {
            info!(
                event_id = %event.id,
                block_id = %event.block_id,
                event_type = %event.event_type,
                "📨 Published event"
            );
        }
        Ok(())
    }
}

/// Forwards each published slice as one message on a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::Sender<Vec<Event>>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::Sender<Vec<Event>>) -> Self {
        Self { sender }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Vec<Event>>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn publish(&self, events: &[Event]) -> ProcessorResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.sender
            .send(events.to_vec())
            .await
            .map_err(|e| ProcessorError::EventPublish(format!("receiver dropped: {}", e)))
    }
}
