// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    cache::BatchContext,
    db::common::models::{
        account_models::Account,
        designator_models::Designator,
        event_models::{Event, EventPayload, EventType, SetCodeTxTypePayload},
    },
    error::ProcessorResult,
    store::IndexerStore,
    types::Transaction,
    utils::{
        address::{canonical_address, canonical_delegate, is_address},
        entity_ids::{account_id, designator_id},
    },
};
use strum::Display;
use tracing::debug;

/// Where a transaction ended up after classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransactionState {
    /// Not a set-code transaction, or its destination is not a valid address.
    Ignored,
    /// Qualifies for handling. Entities are resolved in the same step that records.
    Evaluated,
    /// Account and designator resolved, event appended to the batch.
    Recorded,
}

/// Records EIP-7702 set-code transactions: which account delegated to which contract.
#[derive(Debug, Clone, Copy)]
pub struct SetCodeTransactionHandler {
    chain_id: u64,
}

impl SetCodeTransactionHandler {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// A transaction qualifies when it targets a valid address and carries at least one
    /// authorization.
    pub fn is_qualifying(transaction: &Transaction) -> bool {
        transaction.to.as_deref().is_some_and(is_address) && transaction.has_authorizations()
    }

    pub fn classify(transaction: &Transaction) -> TransactionState {
        if Self::is_qualifying(transaction) {
            TransactionState::Evaluated
        } else {
            TransactionState::Ignored
        }
    }

    /// Lowercase destination of a qualifying transaction. Account ids are built from it,
    /// so every spelling of one address lands on the same account.
    pub fn account_address(transaction: &Transaction) -> Option<String> {
        if !Self::is_qualifying(transaction) {
            return None;
        }
        transaction.to.as_deref().and_then(canonical_address)
    }

    /// Lowercase delegate of the first authorization. `None` when it names no contract,
    /// including the zero address, which resets the account's code.
    pub fn delegate_address(transaction: &Transaction) -> Option<String> {
        transaction
            .first_authorization()
            .and_then(|authorization| canonical_delegate(&authorization.address))
    }

    /// Resolve the account and designator touched by `transaction` and append its event.
    ///
    /// The transaction's block must already be in the batch's block cache. A later
    /// transaction for the same account overwrites the delegation set by an earlier one,
    /// and a transaction without a delegate clears it.
    pub async fn handle<S: IndexerStore>(
        &self,
        ctx: &mut BatchContext<S>,
        transaction: &Transaction,
    ) -> ProcessorResult<TransactionState> {
        let to = match Self::account_address(transaction) {
            Some(to) => to,
            None => {
                debug!("Ignoring transaction {}", transaction.id);
                return Ok(TransactionState::Ignored);
            },
        };

        let block_id = ctx.blocks.get_or_throw(&transaction.block.id).await?.id.clone();

        let account_id = account_id(self.chain_id, &to);
        let account = ctx
            .accounts
            .get_or_create(&account_id, || Account::new(account_id.clone(), to.as_str()))
            .await?;

        let designator = match Self::delegate_address(transaction) {
            Some(delegate) => {
                let designator_id = designator_id(self.chain_id, &delegate);
                let designator = ctx
                    .designators
                    .get_or_create(&designator_id, || {
                        Designator::new(designator_id.clone(), delegate.as_str())
                    })
                    .await?;
                Some(designator.clone())
            },
            None => None,
        };
        account.designator_id = designator.as_ref().map(|designator| designator.id.clone());

        debug!(
            "Account {} delegates to {:?} (tx {})",
            account_id, account.designator_id, transaction.hash
        );

        ctx.add_event(Event {
            id: transaction.id.clone(),
            block_id,
            transaction_hash: transaction.hash.clone(),
            event_type: EventType::SetCodeTxType,
            payload: EventPayload::SetCodeTxTypePayload(SetCodeTxTypePayload {
                from: transaction.from.clone(),
                designator_address: designator
                    .as_ref()
                    .map(|designator| designator.address.clone())
                    .unwrap_or_default(),
            }),
            from: Some(transaction.from.clone()),
            designator_id: designator.map(|designator| designator.id),
            account_id: Some(account_id),
        });

        Ok(TransactionState::Recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::common::models::block_models::Block,
        error::ProcessorError,
        event_bus::ProcessorState,
        store::InMemoryStore,
        types::{Authorization, BlockHeader},
    };
    use std::sync::Arc;

    const TO: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const FROM: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const DELEGATE: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn header() -> BlockHeader {
        BlockHeader {
            id: "B1".to_string(),
            height: 10,
            hash: "0xb1".to_string(),
            timestamp: 1_731_618_108_000,
        }
    }

    fn transaction(id: &str, to: Option<&str>, delegates: &[&str]) -> Transaction {
        Transaction {
            id: id.to_string(),
            hash: format!("0x{}", id),
            from: FROM.to_string(),
            to: to.map(str::to_string),
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
            block: header(),
        }
    }

    fn context() -> BatchContext<InMemoryStore> {
        let mut ctx = BatchContext::new(Arc::new(InMemoryStore::new()), &ProcessorState::default());
        ctx.blocks.add(Block::from_header(&header()).unwrap());
        ctx
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            SetCodeTransactionHandler::classify(&transaction("t", Some(TO), &[DELEGATE])),
            TransactionState::Evaluated
        );
        // Empty authorization list.
        assert_eq!(
            SetCodeTransactionHandler::classify(&transaction("t", Some(TO), &[])),
            TransactionState::Ignored
        );
        // Contract creation.
        assert_eq!(
            SetCodeTransactionHandler::classify(&transaction("t", None, &[DELEGATE])),
            TransactionState::Ignored
        );
        // Malformed destination.
        assert_eq!(
            SetCodeTransactionHandler::classify(&transaction("t", Some("0xAAA"), &[DELEGATE])),
            TransactionState::Ignored
        );

        let mut legacy = transaction("t", Some(TO), &[]);
        legacy.authorization_list = None;
        assert!(!SetCodeTransactionHandler::is_qualifying(&legacy));
    }

    #[test]
    fn test_only_first_authorization_is_used() {
        let tx = transaction("t", Some(TO), &[DELEGATE, FROM]);
        assert_eq!(
            SetCodeTransactionHandler::delegate_address(&tx).as_deref(),
            Some(DELEGATE)
        );

        let tx = transaction("t", Some(TO), &["", DELEGATE]);
        assert_eq!(SetCodeTransactionHandler::delegate_address(&tx), None);
    }

    #[tokio::test]
    async fn test_handle_records_event() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = context();

        let state = handler
            .handle(&mut ctx, &transaction("T1", Some(TO), &[DELEGATE]))
            .await
            .unwrap();
        assert_eq!(state, TransactionState::Recorded);

        let account = ctx.accounts.peek(&account_id(1, TO)).unwrap();
        assert_eq!(account.address, TO);
        assert_eq!(account.designator_id, Some(designator_id(1, DELEGATE)));

        let designator = ctx.designators.peek(&designator_id(1, DELEGATE)).unwrap();
        assert_eq!(designator.address, DELEGATE);

        let event = ctx.events.peek("T1").unwrap();
        assert_eq!(event.block_id, "B1");
        assert_eq!(event.transaction_hash, "0xT1");
        assert_eq!(event.from.as_deref(), Some(FROM));
        assert_eq!(event.account_id, Some(account_id(1, TO)));
        assert_eq!(
            event.payload,
            EventPayload::SetCodeTxTypePayload(SetCodeTxTypePayload {
                from: FROM.to_string(),
                designator_address: DELEGATE.to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_handle_without_delegate_clears_designator() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = context();

        handler
            .handle(&mut ctx, &transaction("T1", Some(TO), &[DELEGATE]))
            .await
            .unwrap();
        handler
            .handle(&mut ctx, &transaction("T2", Some(TO), &[""]))
            .await
            .unwrap();

        assert_eq!(ctx.accounts.len(), 1);
        assert_eq!(ctx.accounts.peek(&account_id(1, TO)).unwrap().designator_id, None);

        let event = ctx.events.peek("T2").unwrap();
        assert_eq!(event.designator_id, None);
        let EventPayload::SetCodeTxTypePayload(payload) = &event.payload;
        assert_eq!(payload.designator_address, "");
    }

    #[tokio::test]
    async fn test_handle_merges_address_spellings() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = context();
        let checksummed = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let lowercase = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

        handler
            .handle(&mut ctx, &transaction("T1", Some(lowercase), &[DELEGATE]))
            .await
            .unwrap();
        handler
            .handle(&mut ctx, &transaction("T2", Some(checksummed), &[""]))
            .await
            .unwrap();

        assert_eq!(ctx.accounts.len(), 1);
        let account = ctx.accounts.peek(&account_id(1, lowercase)).unwrap();
        assert_eq!(account.address, lowercase);
        assert_eq!(account.designator_id, None);
        assert_eq!(
            ctx.events.peek("T2").unwrap().account_id,
            Some(account_id(1, lowercase))
        );
    }

    #[tokio::test]
    async fn test_handle_zero_delegate_clears_designator() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = context();
        let zero = "0x0000000000000000000000000000000000000000";

        handler
            .handle(&mut ctx, &transaction("T1", Some(TO), &[DELEGATE]))
            .await
            .unwrap();
        handler
            .handle(&mut ctx, &transaction("T2", Some(TO), &[zero]))
            .await
            .unwrap();

        assert_eq!(ctx.accounts.peek(&account_id(1, TO)).unwrap().designator_id, None);
        assert_eq!(ctx.designators.len(), 1);
        assert!(ctx.designators.peek(&designator_id(1, zero)).is_none());

        let event = ctx.events.peek("T2").unwrap();
        assert_eq!(event.designator_id, None);
        let EventPayload::SetCodeTxTypePayload(payload) = &event.payload;
        assert_eq!(payload.designator_address, "");
    }

    #[test]
    fn test_delegate_address_is_lowercase() {
        let tx = transaction("t", Some(TO), &["0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC"]);
        assert_eq!(
            SetCodeTransactionHandler::delegate_address(&tx).as_deref(),
            Some(DELEGATE)
        );
    }

    #[tokio::test]
    async fn test_handle_skips_ignored_transaction() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = context();

        let state = handler
            .handle(&mut ctx, &transaction("T1", Some(TO), &[]))
            .await
            .unwrap();

        assert_eq!(state, TransactionState::Ignored);
        assert!(ctx.accounts.is_empty());
        assert!(ctx.events.is_empty());
    }

    #[tokio::test]
    async fn test_handle_without_cached_block_is_not_found() {
        let handler = SetCodeTransactionHandler::new(1);
        let mut ctx = BatchContext::new(Arc::new(InMemoryStore::new()), &ProcessorState::default());

        let err = handler
            .handle(&mut ctx, &transaction("T1", Some(TO), &[DELEGATE]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessorError::NotFound { entity: "Block", .. }));
        assert!(ctx.accounts.is_empty());
    }
}
