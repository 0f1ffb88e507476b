// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Personal-message signature recovery (EIP-191).
//!
//! Recovery only binds a message to the key that signed it. It says nothing
//! about whether that key may perform the requested action; callers compare
//! the returned address against whatever they expect.

use alloy::primitives::{Address, Signature};

use super::client::ChainError;

/// Length of an `r || s || v` signature.
const SIGNATURE_LEN: usize = 65;

/// Recover the address that signed `message` with `personal_sign`.
///
/// `signature` is hex (with or without `0x`) of 65 bytes; `v` may be 0/1 or
/// 27/28. A well-formed signature over a different message is not an error:
/// it recovers some other address.
pub fn recover_address(message: &str, signature: &str) -> Result<Address, ChainError> {
    let hex = signature.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);

    let bytes = alloy::hex::decode(hex)
        .map_err(|e| ChainError::InvalidSignature(format!("Invalid hex: {}", e)))?;

    if bytes.len() != SIGNATURE_LEN {
        return Err(ChainError::InvalidSignature(format!(
            "Expected {} bytes, got {}",
            SIGNATURE_LEN,
            bytes.len()
        )));
    }

    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;

    signature
        .recover_address_from_msg(message)
        .map_err(|e| ChainError::InvalidSignature(format!("Recovery failed: {}", e)))
}
