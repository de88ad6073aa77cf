// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

pub mod account_models;
pub mod block_models;
pub mod designator_models;
pub mod event_models;
pub mod processor_status_models;

pub use account_models::Account;
pub use block_models::Block;
pub use designator_models::Designator;
pub use event_models::{Event, EventPayload, EventType, SetCodeTxTypePayload};
