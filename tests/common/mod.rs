// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use setcode_indexer::{
    event_bus::ProcessorState,
    processors::BatchProcessor,
    store::InMemoryStore,
    types::{Authorization, BlockData, BlockHeader, Transaction},
};
use std::sync::Arc;

pub const CHAIN_ID: u64 = 1;

pub const ACCOUNT_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const SENDER_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const DELEGATE_C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";
pub const DELEGATE_D: &str = "0xdddddddddddddddddddddddddddddddddddddddd";

pub const TIMESTAMP_MS: i64 = 1_731_618_108_000;

pub fn header(id: &str, height: u64) -> BlockHeader {
    BlockHeader {
        id: id.to_string(),
        height,
        hash: format!("0x{}", id),
        timestamp: TIMESTAMP_MS,
    }
}

pub fn set_code_tx(id: &str, to: &str, delegates: &[&str]) -> Transaction {
    Transaction {
        id: id.to_string(),
        hash: format!("0x{}", id),
        from: SENDER_B.to_string(),
        to: Some(to.to_string()),
        transaction_index: 0,
        authorization_list: Some(
            delegates
                .iter()
                .map(|address| Authorization {
                    address: address.to_string(),
                    ..Default::default()
                })
                .collect(),
        ),
        block: BlockHeader::default(),
    }
}

pub fn block(id: &str, height: u64, transactions: Vec<Transaction>) -> BlockData {
    BlockData::new(header(id, height), transactions)
}

pub fn address(i: usize) -> String {
    format!("0x{:040x}", i + 1)
}

pub fn processor(store: &Arc<InMemoryStore>) -> BatchProcessor<InMemoryStore> {
    BatchProcessor::new(store.clone(), ProcessorState::default(), CHAIN_ID)
}
