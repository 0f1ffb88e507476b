// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin signer: the single identity every relayed write is executed under.
//!
//! The key is loaded once at startup. Writes from all clients share this
//! account, so nonce assignment goes through [`NonceSequencer`], which allows
//! one lease at a time.

use std::future::Future;

use alloy::{
    consensus::TxEnvelope,
    network::{EthereumWallet, TransactionBuilder},
    primitives::Address,
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use k256::SecretKey;
use tokio::sync::{Mutex, MutexGuard};

use super::client::ChainError;

/// Holder of the admin private key.
pub struct AdminSigner {
    wallet: EthereumWallet,
    address: Address,
    nonces: NonceSequencer,
}

impl AdminSigner {
    /// Create a signer from a hex private key (64 characters, `0x` optional).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainError> {
        let trimmed = private_key_hex.trim();
        let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self::from_signer(signer))
    }

    /// Create a signer from a SEC1 or PKCS#8 PEM private key.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, ChainError> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key)
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self {
            wallet: EthereumWallet::from(signer),
            address,
            nonces: NonceSequencer::default(),
        }
    }

    /// Address derived from the admin key.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn nonces(&self) -> &NonceSequencer {
        &self.nonces
    }

    /// Sign a fully populated transaction request (nonce, gas, fees, chain id).
    pub async fn sign(&self, request: TransactionRequest) -> Result<TxEnvelope, ChainError> {
        request
            .with_from(self.address)
            .build(&self.wallet)
            .await
            .map_err(|e| ChainError::InvalidArgument(format!("Failed to sign transaction: {}", e)))
    }
}

impl std::fmt::Debug for AdminSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminSigner({})", self.address)
    }
}

/// Serializes nonce assignment for the admin account.
///
/// The next nonce is cached after each accepted broadcast and reconciled with
/// the node's pending transaction count on every lease: the larger value wins,
/// so transactions sent from the same key elsewhere are skipped over. After a
/// failed broadcast the cache is cleared and the node's count is used as is.
#[derive(Default)]
pub struct NonceSequencer {
    next: Mutex<Option<u64>>,
}

impl NonceSequencer {
    /// Wait for exclusive access and return the nonce to sign with.
    ///
    /// `fetch_pending` is awaited under the lock. The lease must be held until
    /// the node has accepted or refused the transaction.
    pub async fn lease<F>(&self, fetch_pending: F) -> Result<NonceLease<'_>, ChainError>
    where
        F: Future<Output = Result<u64, ChainError>>,
    {
        let slot = self.next.lock().await;
        let pending = fetch_pending.await?;
        let nonce = slot.map_or(pending, |cached| cached.max(pending));

        Ok(NonceLease {
            slot,
            nonce,
            committed: false,
        })
    }

    /// The cached next nonce, if known.
    pub async fn cached(&self) -> Option<u64> {
        *self.next.lock().await
    }
}

/// Exclusive hold on the admin nonce.
///
/// Dropping the lease without [`NonceLease::commit`] forgets the cached
/// value, so the next lease resynchronizes with the node.
pub struct NonceLease<'a> {
    slot: MutexGuard<'a, Option<u64>>,
    nonce: u64,
    committed: bool,
}

impl NonceLease<'_> {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Record that the node accepted a transaction with this nonce.
    pub fn commit(mut self) -> u64 {
        *self.slot = Some(self.nonce + 1);
        self.committed = true;
        self.nonce
    }
}

impl Drop for NonceLease<'_> {
    fn drop(&mut self) {
        if !self.committed {
            *self.slot = None;
        }
    }
}

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}
