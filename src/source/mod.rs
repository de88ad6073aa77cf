// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Upstream block feeds.

use crate::{error::ProcessorResult, types::BlockData};
use async_trait::async_trait;

pub mod json_lines;

pub use json_lines::JsonLinesBlockSource;

/// Ordered batches of decoded blocks. Blocks arrive in height order and transactions
/// keep their in-block order.
#[async_trait]
pub trait BlockSource: Send {
    /// Next batch, or `None` once the feed is exhausted.
    async fn next_batch(&mut self) -> ProcessorResult<Option<Vec<BlockData>>>;
}

/// Inclusive block height window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: Option<u64>,
}

impl BlockRange {
    pub fn new(from: u64, to: Option<u64>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, height: u64) -> bool {
        height >= self.from && self.to.map_or(true, |to| height <= to)
    }

    pub fn is_past_end(&self, height: u64) -> bool {
        self.to.is_some_and(|to| height > to)
    }
}
