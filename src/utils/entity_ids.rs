// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Stable entity ids. Both helpers scope an address by chain id, so replaying a
//! transaction always lands on the same rows.

pub fn account_id(chain_id: u64, address: &str) -> String {
    format!("{}-{}", chain_id, address)
}

pub fn designator_id(chain_id: u64, address: &str) -> String {
    format!("{}-{}", chain_id, address)
}
