// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the bindings, the relay and the API layer.

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, SecondsFormat, Utc};

/// One board entry as returned by `getMessage(index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Account that executed `postMessage` on-chain.
    pub sender: Address,
    pub content: String,
    /// Block timestamp in seconds since the epoch.
    pub timestamp: U256,
}

impl MessageRecord {
    /// Render the timestamp as RFC 3339 with millisecond precision (`...T..:..:..000Z`).
    ///
    /// Returns `None` when the on-chain value does not fit a calendar date.
    pub fn timestamp_rfc3339(&self) -> Option<String> {
        let secs = u64::try_from(self.timestamp).ok()?;
        let secs = i64::try_from(secs).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// An NFT held by an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub token_id: U256,
    pub token_uri: String,
}

/// EIP-1559 fee parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Max fee per gas (base fee + priority fee)
    pub max_fee_per_gas: u128,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: u128,
}

/// Correlation handle for a transaction the node accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub tx_hash: TxHash,
    /// Admin account nonce the transaction was signed with.
    pub nonce: u64,
}

/// Transaction receipt after inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether execution succeeded
    pub success: bool,
}

/// Outcome of a relayed write.
///
/// `confirmed == false` means the transaction was broadcast but no receipt
/// arrived within the confirmation timeout; it may still be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxResult {
    pub tx_hash: TxHash,
    pub confirmed: bool,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

impl TxResult {
    pub fn confirmed(receipt: &TxReceipt) -> Self {
        Self {
            tx_hash: receipt.tx_hash,
            confirmed: true,
            block_number: Some(receipt.block_number),
            gas_used: Some(receipt.gas_used),
        }
    }

    pub fn pending(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            confirmed: false,
            block_number: None,
            gas_used: None,
        }
    }
}

/// Current on-chain state of a transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// No receipt yet (unknown, queued, or dropped).
    Pending,
    Confirmed(TxReceipt),
    Reverted(TxReceipt),
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed(_) => "confirmed",
            TxStatus::Reverted(_) => "reverted",
        }
    }

    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            TxStatus::Pending => None,
            TxStatus::Confirmed(r) | TxStatus::Reverted(r) => Some(r),
        }
    }
}
