// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed bindings for the deployed contracts.
//!
//! Each binding wraps a `sol!`-generated instance for view calls and builds
//! calldata for writes, which are relayed under the admin signer.

use std::str::FromStr;

use alloy::{
    primitives::Address,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};

use super::client::ChainError;

pub mod message_board;
pub mod nft;
pub mod token;

pub use message_board::{IMessageBoard, MessageBoard};
pub use nft::{ISimpleNft, SimpleNft};
pub use token::{IRelayToken, RelayToken};

/// Parse a hex address supplied by a client or the environment.
///
/// `what` names the value in the error message.
pub fn parse_address(value: &str, what: &str) -> Result<Address, ChainError> {
    Address::from_str(value.trim())
        .map_err(|e| ChainError::InvalidArgument(format!("Invalid {} address: {}", what, e)))
}

/// Transaction request invoking `call` on the contract at `to`.
fn call_request<C: SolCall>(to: Address, call: C) -> TransactionRequest {
    TransactionRequest::default()
        .to(to)
        .input(call.abi_encode().into())
}

/// Map a failed view call.
fn view_error(method: &str, e: alloy::contract::Error) -> ChainError {
    ChainError::Rpc(format!("{} failed: {}", method, e))
}

#[cfg(test)]
fn target(request: &TransactionRequest) -> Option<Address> {
    match request.to {
        Some(alloy::primitives::TxKind::Call(address)) => Some(address),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn parses_checksummed_and_lowercase_addresses() {
        let expected = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(
            parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266", "owner").unwrap(),
            expected
        );
        assert_eq!(
            parse_address(" 0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266 ", "owner").unwrap(),
            expected
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "0x", "0x1234", "hello", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb922667"] {
            let err = parse_address(bad, "recipient").unwrap_err();
            match err {
                ChainError::InvalidArgument(message) => assert!(message.contains("recipient")),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
