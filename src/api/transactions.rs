// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Status lookup for transactions the relay broadcast.

use alloy::primitives::TxHash;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{blockchain::TxStatus, error::ApiError, state::AppState};

/// Transaction status response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    pub tx_hash: String,
    /// "pending", "confirmed", or "reverted"
    pub status: String,
    /// Block number (if mined)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Gas used (if mined)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl TransactionStatusResponse {
    fn new(tx_hash: TxHash, status: &TxStatus) -> Self {
        let receipt = status.receipt();
        Self {
            tx_hash: tx_hash.to_string(),
            status: status.as_str().to_string(),
            block_number: receipt.map(|r| r.block_number),
            gas_used: receipt.map(|r| r.gas_used),
        }
    }
}

/// Get the current status of a transaction.
///
/// An unknown hash reports "pending": the node cannot tell a queued
/// transaction from one it never saw.
#[utoipa::path(
    get,
    path = "/tx/{tx_hash}",
    tag = "Transactions",
    params(
        ("tx_hash" = String, Path, description = "Transaction hash")
    ),
    responses(
        (status = 200, description = "Transaction status", body = TransactionStatusResponse),
        (status = 400, description = "Malformed transaction hash"),
        (status = 502, description = "RPC node unavailable")
    )
)]
pub async fn get_transaction_status(
    Path(tx_hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionStatusResponse>, ApiError> {
    let hash: TxHash = tx_hash
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid transaction hash: {}", tx_hash)))?;

    let status = state.chain.relay.status(hash).await?;
    Ok(Json(TransactionStatusResponse::new(hash, &status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::blockchain::TxReceipt;
    use crate::state::test_support::offline_state;

    #[test]
    fn mined_status_carries_receipt_fields() {
        let receipt = TxReceipt {
            tx_hash: TxHash::repeat_byte(0xab),
            block_number: 12,
            gas_used: 51_234,
            success: true,
        };
        let json = serde_json::to_value(TransactionStatusResponse::new(
            receipt.tx_hash,
            &TxStatus::Confirmed(receipt),
        ))
        .unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["blockNumber"], 12);
        assert_eq!(json["gasUsed"], 51_234);
        assert_eq!(json["txHash"], format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn pending_status_omits_receipt_fields() {
        let json = serde_json::to_value(TransactionStatusResponse::new(
            TxHash::ZERO,
            &TxStatus::Pending,
        ))
        .unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("blockNumber").is_none());
        assert!(json.get("gasUsed").is_none());
    }

    #[tokio::test]
    async fn malformed_hash_is_bad_request() {
        for bad in ["0x1234", "hello", ""] {
            let err = get_transaction_status(Path(bad.to_string()), State(offline_state()))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn unreachable_node_is_bad_gateway() {
        let err = get_transaction_status(
            Path(format!("0x{}", "11".repeat(32))),
            State(offline_state()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
