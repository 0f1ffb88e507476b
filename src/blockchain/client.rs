// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for the configured EVM endpoint.

use alloy::{
    consensus::TxEnvelope,
    eips::{eip2718::Encodable2718, BlockNumberOrTag},
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
};

use super::relay::RelayBackend;
use super::types::{FeeEstimate, TxReceipt};

/// HTTP provider type for the relay endpoint (with all fillers).
pub type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Fallback base fee when the latest block carries none (pre-London chains).
const DEFAULT_BASE_FEE: u128 = 25_000_000_000; // 25 gwei

/// Tip offered on every relayed transaction.
const DEFAULT_PRIORITY_FEE: u128 = 1_500_000_000; // 1.5 gwei

/// Client for the single RPC endpoint this server talks to.
#[derive(Clone)]
pub struct ChainClient {
    rpc_url: String,
    provider: HttpProvider,
}

impl ChainClient {
    /// Create a client for the given endpoint. No request is made until first use.
    pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            provider,
        })
    }

    /// The underlying alloy provider, shared by the contract bindings.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

impl RelayBackend for ChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get chain id: {}", e)))
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get nonce: {}", e)))
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, ChainError> {
        self.provider
            .estimate_gas(request)
            .await
            .map_err(|e| {
                classify_node_error(e.to_string(), e.as_error_resp().is_some(), RpcStage::Estimate)
            })
    }

    async fn fee_estimate(&self) -> Result<FeeEstimate, ChainError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get block: {}", e)))?
            .ok_or_else(|| ChainError::Rpc("No latest block".to_string()))?;

        let base_fee: u128 = block
            .header
            .base_fee_per_gas
            .map(|f| f as u128)
            .unwrap_or(DEFAULT_BASE_FEE);

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee_per_gas = base_fee
            .saturating_mul(2)
            .saturating_add(DEFAULT_PRIORITY_FEE);

        Ok(FeeEstimate {
            max_fee_per_gas,
            max_priority_fee_per_gas: DEFAULT_PRIORITY_FEE,
        })
    }

    async fn broadcast(&self, envelope: TxEnvelope) -> Result<TxHash, ChainError> {
        let raw = envelope.encoded_2718();
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| {
                classify_node_error(e.to_string(), e.as_error_resp().is_some(), RpcStage::Broadcast)
            })?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash,
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            success: r.status(),
        }))
    }
}

/// Which RPC round trip produced an error; the same node message means
/// different things before and at broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RpcStage {
    Estimate,
    Broadcast,
}

/// Map an RPC failure to the error taxonomy.
///
/// `node_responded` is true when the node answered with a JSON-RPC error
/// object, as opposed to a transport failure.
pub(crate) fn classify_node_error(
    message: String,
    node_responded: bool,
    stage: RpcStage,
) -> ChainError {
    let lower = message.to_ascii_lowercase();

    if lower.contains("insufficient funds") {
        return ChainError::InsufficientFunds(message);
    }
    if !node_responded {
        return ChainError::Rpc(message);
    }

    match stage {
        RpcStage::Estimate if lower.contains("revert") => ChainError::Reverted {
            tx_hash: None,
            reason: message,
        },
        RpcStage::Estimate => ChainError::Rpc(message),
        RpcStage::Broadcast => ChainError::BroadcastRejected(message),
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    #[error("Transaction reverted: {reason}")]
    Reverted {
        tx_hash: Option<TxHash>,
        reason: String,
    },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction {tx_hash} was broadcast but is not confirmed yet")]
    ConfirmationTimeout { tx_hash: TxHash },
}
