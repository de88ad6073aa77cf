// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{hex, Address};
use std::str::FromStr;

/// Whether `value` is a 20-byte hex account address.
///
/// All-lowercase and all-uppercase forms are accepted as-is; mixed case must carry a
/// valid EIP-55 checksum.
pub fn is_address(value: &str) -> bool {
    let Some(hex) = value.strip_prefix("0x") else {
        return false;
    };
    if hex.len() != 40 || Address::from_str(value).is_err() {
        return false;
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(value, None).is_ok();
    }
    true
}

/// Lowercase `0x`-prefixed form of `value`, the spelling every entity id is built from.
/// `None` when `value` is not a valid address.
pub fn canonical_address(value: &str) -> Option<String> {
    if !is_address(value) {
        return None;
    }
    Address::from_str(value).ok().map(|address| lower_hex(&address))
}

/// Canonical delegate address, or `None` when `value` is empty, malformed or the zero
/// address. Delegating to the zero address resets the account's code.
pub fn canonical_delegate(value: &str) -> Option<String> {
    if value.is_empty() || !is_address(value) {
        return None;
    }
    let address = Address::from_str(value).ok()?;
    if address == Address::ZERO {
        return None;
    }
    Some(lower_hex(&address))
}

fn lower_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_lowercase_and_checksummed() {
        assert!(is_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(is_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(is_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_address(""));
        assert!(!is_address("0xAAA"));
        assert!(!is_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaedff"));
        assert!(!is_address("0xzaaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        // Mixed case with a broken checksum.
        assert!(!is_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"));
    }

    #[test]
    fn test_canonical_address_is_lowercase() {
        let canonical = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        assert_eq!(canonical_address(canonical).as_deref(), Some(canonical));
        assert_eq!(
            canonical_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").as_deref(),
            Some(canonical)
        );
        assert_eq!(
            canonical_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").as_deref(),
            Some(canonical)
        );
        assert_eq!(canonical_address("0xAAA"), None);
    }

    #[test]
    fn test_canonical_delegate_drops_zero_address() {
        assert_eq!(canonical_delegate(""), None);
        assert_eq!(canonical_delegate("0x0000000000000000000000000000000000000000"), None);
        assert_eq!(canonical_delegate("0xccc"), None);
        assert_eq!(
            canonical_delegate("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").as_deref(),
            Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
        );
    }
}
