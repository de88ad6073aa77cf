// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Decoded chain data as delivered by the upstream block fetcher.
//!
//! Field names follow the EVM archive's camelCase JSON so the structures can be
//! deserialized straight from its output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub id: String,
    pub height: u64,
    #[serde(default)]
    pub hash: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
}

/// One entry of an EIP-7702 authorization list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    /// Delegate contract the signer points its code at.
    pub address: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub nonce: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub transaction_index: u32,
    #[serde(default)]
    pub authorization_list: Option<Vec<Authorization>>,
    /// Containing block. Filled in from the enclosing [`BlockData`] by
    /// [`BlockData::link_transactions`] when absent from the source payload.
    #[serde(default)]
    pub block: BlockHeader,
}

impl Transaction {
    pub fn has_authorizations(&self) -> bool {
        self.authorization_list
            .as_ref()
            .is_some_and(|list| !list.is_empty())
    }

    /// Only the first authorization is consulted; multi-delegate semantics are not modelled.
    pub fn first_authorization(&self) -> Option<&Authorization> {
        self.authorization_list.as_ref().and_then(|list| list.first())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub header: BlockHeader,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl BlockData {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        let mut block = Self {
            header,
            transactions,
        };
        block.link_transactions();
        block
    }

    /// Point every transaction at this block's header.
    pub fn link_transactions(&mut self) {
        for transaction in &mut self.transactions {
            transaction.block = self.header.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_archive_block() {
        let raw = r#"{
            "header": {"id": "0000000010-abcde", "height": 10, "hash": "0xabc", "timestamp": 1731618108000},
            "transactions": [{
                "id": "0000000010-abcde-000000",
                "hash": "0xdeadbeef",
                "from": "0x1111111111111111111111111111111111111111",
                "to": "0x2222222222222222222222222222222222222222",
                "authorizationList": [{"address": "0x3333333333333333333333333333333333333333", "chainId": 1, "nonce": 0}]
            }]
        }"#;

        let mut block: BlockData = serde_json::from_str(raw).unwrap();
        block.link_transactions();

        let tx = &block.transactions[0];
        assert_eq!(tx.block.id, "0000000010-abcde");
        assert_eq!(tx.block.height, 10);
        assert!(tx.has_authorizations());
        assert_eq!(
            tx.first_authorization().map(|a| a.address.as_str()),
            Some("0x3333333333333333333333333333333333333333")
        );
    }

    #[test]
    fn test_missing_authorization_list() {
        let tx = Transaction {
            authorization_list: Some(vec![]),
            ..Default::default()
        };
        assert!(!tx.has_authorizations());
        assert!(tx.first_authorization().is_none());

        let tx = Transaction::default();
        assert!(!tx.has_authorizations());
    }
}
