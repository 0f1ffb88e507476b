// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction relay: sign under the admin identity, broadcast, await inclusion.
//!
//! Broadcast and confirmation are separate steps. [`TransactionRelay::submit`]
//! returns as soon as the node accepts the raw transaction;
//! [`TransactionRelay::await_confirmation`] waits for the receipt with a
//! bounded timeout. A timeout is not a failure: the transaction may still be
//! mined, so it must never be resubmitted blindly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::{
    consensus::TxEnvelope,
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    rpc::types::TransactionRequest,
};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::client::ChainError;
use super::signing::AdminSigner;
use super::types::{FeeEstimate, TxHandle, TxReceipt, TxResult, TxStatus};

/// Node operations the relay depends on.
pub trait RelayBackend: Send + Sync {
    fn chain_id(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    /// Transaction count of `address` including pending transactions.
    fn pending_nonce(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<u64, ChainError>> + Send;

    fn estimate_gas(
        &self,
        request: TransactionRequest,
    ) -> impl Future<Output = Result<u64, ChainError>> + Send;

    fn fee_estimate(&self) -> impl Future<Output = Result<FeeEstimate, ChainError>> + Send;

    /// Submit a signed transaction; resolves once the node accepted it.
    ///
    /// `ChainError::Rpc` means the node never answered and the transaction
    /// may or may not have been received.
    fn broadcast(
        &self,
        envelope: TxEnvelope,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;

    fn receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TxReceipt>, ChainError>> + Send;
}

/// Confirmation timing, see [`crate::config::Config::relay_settings`].
#[derive(Debug, Clone, Copy)]
pub struct RelaySettings {
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

/// Relays state-mutating calls under the admin signer.
pub struct TransactionRelay<B> {
    backend: B,
    signer: Arc<AdminSigner>,
    settings: RelaySettings,
    chain_id: OnceCell<u64>,
}

impl<B: RelayBackend> TransactionRelay<B> {
    pub fn new(backend: B, signer: Arc<AdminSigner>, settings: RelaySettings) -> Self {
        Self {
            backend,
            signer,
            settings,
            chain_id: OnceCell::new(),
        }
    }

    pub fn signer(&self) -> &AdminSigner {
        &self.signer
    }

    /// Populate, sign and broadcast `request` (target + calldata) under the admin key.
    ///
    /// Gas and fees are estimated before the nonce is leased; signing and
    /// broadcast happen while the lease is held so no two submissions can
    /// share a nonce.
    pub async fn submit(&self, request: TransactionRequest) -> Result<TxHandle, ChainError> {
        let chain_id = *self
            .chain_id
            .get_or_try_init(|| self.backend.chain_id())
            .await?;

        let admin = self.signer.address();
        let request = request.with_from(admin).with_chain_id(chain_id);

        let gas_limit = self.backend.estimate_gas(request.clone()).await?;
        let fees = self.backend.fee_estimate().await?;
        let request = request
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);

        let lease = self
            .signer
            .nonces()
            .lease(self.backend.pending_nonce(admin))
            .await?;
        let envelope = self
            .signer
            .sign(request.with_nonce(lease.nonce()))
            .await?;

        let local_hash = *envelope.tx_hash();

        match self.backend.broadcast(envelope).await {
            Ok(tx_hash) => {
                let nonce = lease.commit();
                info!(%tx_hash, nonce, gas_limit, "Transaction broadcast");
                Ok(TxHandle { tx_hash, nonce })
            }
            Err(ChainError::Rpc(reason)) => {
                // The node may have received it; track the hash and let the
                // next lease re-read the pending nonce.
                let nonce = lease.nonce();
                drop(lease);
                warn!(
                    tx_hash = %local_hash,
                    nonce,
                    error = %reason,
                    "Broadcast outcome unknown, tracking as pending"
                );
                Ok(TxHandle {
                    tx_hash: local_hash,
                    nonce,
                })
            }
            Err(e) => {
                warn!(nonce = lease.nonce(), error = %e, "Broadcast failed, nonce will resync");
                Err(e)
            }
        }
    }

    /// Wait until `handle` is included in a block, up to `timeout`.
    ///
    /// Returns `Reverted` when the receipt reports failed execution and
    /// `ConfirmationTimeout` when no receipt arrived in time.
    pub async fn await_confirmation(
        &self,
        handle: TxHandle,
        timeout: Duration,
    ) -> Result<TxResult, ChainError> {
        let receipt = match tokio::time::timeout(timeout, self.poll_receipt(handle.tx_hash)).await {
            Ok(receipt) => receipt,
            Err(_) => {
                warn!(tx_hash = %handle.tx_hash, ?timeout, "Confirmation timed out");
                return Err(ChainError::ConfirmationTimeout {
                    tx_hash: handle.tx_hash,
                });
            }
        };

        if receipt.success {
            info!(
                tx_hash = %receipt.tx_hash,
                block = receipt.block_number,
                gas_used = receipt.gas_used,
                "Transaction confirmed"
            );
            Ok(TxResult::confirmed(&receipt))
        } else {
            warn!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "Transaction reverted");
            Err(ChainError::Reverted {
                tx_hash: Some(receipt.tx_hash),
                reason: format!("execution reverted in block {}", receipt.block_number),
            })
        }
    }

    /// Submit and wait for one confirmation using the configured timeout.
    ///
    /// A confirmation timeout yields `Ok` with `confirmed == false`; every
    /// other failure is an error.
    pub async fn submit_and_confirm(
        &self,
        request: TransactionRequest,
    ) -> Result<TxResult, ChainError> {
        let handle = self.submit(request).await?;
        match self
            .await_confirmation(handle, self.settings.confirmation_timeout)
            .await
        {
            Err(ChainError::ConfirmationTimeout { tx_hash }) => Ok(TxResult::pending(tx_hash)),
            other => other,
        }
    }

    /// Current state of a previously broadcast transaction.
    pub async fn status(&self, tx_hash: TxHash) -> Result<TxStatus, ChainError> {
        Ok(match self.backend.receipt(tx_hash).await? {
            None => TxStatus::Pending,
            Some(receipt) if receipt.success => TxStatus::Confirmed(receipt),
            Some(receipt) => TxStatus::Reverted(receipt),
        })
    }

    /// Poll until a receipt appears. Read errors are transient here: the
    /// transaction is already out, so only the caller's timeout ends the wait.
    async fn poll_receipt(&self, tx_hash: TxHash) -> TxReceipt {
        loop {
            match self.backend.receipt(tx_hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => {}
                Err(e) => warn!(%tx_hash, error = %e, "Receipt poll failed, retrying"),
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use alloy::consensus::Transaction;
    use alloy::primitives::{address, Bytes};

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// In-memory node: accepts broadcasts, mines on demand.
    #[derive(Default)]
    struct FakeNode {
        pending_count: u64,
        reject_broadcast: Option<String>,
        revert_estimate: bool,
        /// Receipts are reported after this many polls (None = never).
        mine_after_polls: Option<usize>,
        mined_success: bool,
        /// The node receives the transaction but the response is lost.
        drop_broadcast_response: bool,
        /// Number of upcoming `receipt` calls that fail.
        receipt_failures: AtomicUsize,
        broadcasts: Mutex<Vec<TxEnvelope>>,
        nonce_fetches: AtomicUsize,
        polls: Mutex<HashMap<TxHash, usize>>,
    }

    impl FakeNode {
        fn mining() -> Self {
            Self {
                mine_after_polls: Some(0),
                mined_success: true,
                ..Self::default()
            }
        }

        fn used_nonces(&self) -> Vec<u64> {
            self.broadcasts
                .lock()
                .unwrap()
                .iter()
                .map(|tx| tx.nonce())
                .collect()
        }
    }

    impl RelayBackend for FakeNode {
        async fn chain_id(&self) -> Result<u64, ChainError> {
            Ok(31337)
        }

        async fn pending_nonce(&self, _address: Address) -> Result<u64, ChainError> {
            self.nonce_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.pending_count)
        }

        async fn estimate_gas(&self, _request: TransactionRequest) -> Result<u64, ChainError> {
            if self.revert_estimate {
                return Err(ChainError::Reverted {
                    tx_hash: None,
                    reason: "execution reverted: not allowed".to_string(),
                });
            }
            Ok(60_000)
        }

        async fn fee_estimate(&self) -> Result<FeeEstimate, ChainError> {
            Ok(FeeEstimate {
                max_fee_per_gas: 3_000_000_000,
                max_priority_fee_per_gas: 1_000_000_000,
            })
        }

        async fn broadcast(&self, envelope: TxEnvelope) -> Result<TxHash, ChainError> {
            if let Some(reason) = &self.reject_broadcast {
                return Err(ChainError::BroadcastRejected(reason.clone()));
            }
            tokio::task::yield_now().await;
            let tx_hash = *envelope.tx_hash();
            self.broadcasts.lock().unwrap().push(envelope);
            if self.drop_broadcast_response {
                return Err(ChainError::Rpc("error sending request: connection reset".into()));
            }
            Ok(tx_hash)
        }

        async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
            let failing = self
                .receipt_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(ChainError::Rpc("Failed to get receipt: connection reset".into()));
            }

            let known = self
                .broadcasts
                .lock()
                .unwrap()
                .iter()
                .any(|tx| *tx.tx_hash() == tx_hash);
            let Some(after) = self.mine_after_polls.filter(|_| known) else {
                return Ok(None);
            };

            let mut polls = self.polls.lock().unwrap();
            let seen = polls.entry(tx_hash).or_insert(0);
            if *seen < after {
                *seen += 1;
                return Ok(None);
            }
            Ok(Some(TxReceipt {
                tx_hash,
                block_number: 42,
                gas_used: 51_234,
                success: self.mined_success,
            }))
        }
    }

    fn relay_with(node: FakeNode) -> TransactionRelay<FakeNode> {
        let signer = Arc::new(AdminSigner::from_hex(DEV_KEY).unwrap());
        TransactionRelay::new(
            node,
            signer,
            RelaySettings {
                confirmation_timeout: Duration::from_millis(200),
                poll_interval: Duration::from_millis(5),
            },
        )
    }

    fn call_request() -> TransactionRequest {
        TransactionRequest::default()
            .with_to(address!("5FbDB2315678afecb367f032d93F642f64180aa3"))
            .with_input(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
    }

    #[tokio::test]
    async fn submit_signs_with_admin_and_next_nonce() {
        let relay = relay_with(FakeNode {
            pending_count: 7,
            ..FakeNode::mining()
        });

        let first = relay.submit(call_request()).await.unwrap();
        let second = relay.submit(call_request()).await.unwrap();

        assert_eq!(first.nonce, 7);
        assert_eq!(second.nonce, 8);
        assert_ne!(first.tx_hash, second.tx_hash);
        // pending count is re-read on every lease; the cache wins over a lagging node
        assert_eq!(relay.backend.nonce_fetches.load(Ordering::SeqCst), 2);

        let broadcasts = relay.backend.broadcasts.lock().unwrap();
        assert_eq!(broadcasts[0].chain_id(), Some(31337));
        assert_eq!(broadcasts[0].gas_limit(), 60_000);
        assert_eq!(broadcasts[0].input().to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_use_distinct_nonces() {
        let relay = Arc::new(relay_with(FakeNode::mining()));
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let relay = Arc::clone(&relay);
            tasks.push(tokio::spawn(async move { relay.submit(call_request()).await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut nonces = relay.backend.used_nonces();
        nonces.sort_unstable();
        nonces.dedup();
        assert_eq!(nonces, (0..20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn rejected_broadcast_is_reported_and_nonce_resyncs() {
        let relay = relay_with(FakeNode {
            reject_broadcast: Some("nonce too low".to_string()),
            ..FakeNode::default()
        });

        let err = relay.submit(call_request()).await.unwrap_err();
        assert!(matches!(err, ChainError::BroadcastRejected(ref m) if m == "nonce too low"));
        assert_eq!(relay.signer().nonces().cached().await, None);

        let _ = relay.submit(call_request()).await;
        assert_eq!(relay.backend.nonce_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn revert_during_estimation_never_broadcasts() {
        let relay = relay_with(FakeNode {
            revert_estimate: true,
            ..FakeNode::mining()
        });

        let err = relay.submit(call_request()).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted { tx_hash: None, .. }));
        assert!(relay.backend.broadcasts.lock().unwrap().is_empty());
        assert_eq!(relay.backend.nonce_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirmation_waits_for_receipt() {
        let relay = relay_with(FakeNode {
            mine_after_polls: Some(3),
            mined_success: true,
            ..FakeNode::default()
        });

        let result = relay.submit_and_confirm(call_request()).await.unwrap();
        assert!(result.confirmed);
        assert_eq!(result.block_number, Some(42));
        assert_eq!(result.gas_used, Some(51_234));
    }

    #[tokio::test]
    async fn mined_revert_is_an_error_with_hash() {
        let relay = relay_with(FakeNode {
            mine_after_polls: Some(0),
            mined_success: false,
            ..FakeNode::default()
        });

        let handle = relay.submit(call_request()).await.unwrap();
        let err = relay
            .await_confirmation(handle, Duration::from_millis(100))
            .await
            .unwrap_err();
        match err {
            ChainError::Reverted { tx_hash, .. } => assert_eq!(tx_hash, Some(handle.tx_hash)),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = relay.submit_and_confirm(call_request()).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted { .. }));
    }

    #[tokio::test]
    async fn timeout_is_distinct_from_failure() {
        let relay = relay_with(FakeNode::default());

        let handle = relay.submit(call_request()).await.unwrap();
        let err = relay
            .await_confirmation(handle, Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ChainError::ConfirmationTimeout { tx_hash } if tx_hash == handle.tx_hash)
        );

        let result = relay.submit_and_confirm(call_request()).await.unwrap();
        assert!(!result.confirmed);
        assert!(result.block_number.is_none());
    }

    #[tokio::test]
    async fn receipt_read_errors_do_not_fail_a_broadcast_write() {
        let relay = relay_with(FakeNode {
            receipt_failures: AtomicUsize::new(2),
            ..FakeNode::mining()
        });

        let result = relay.submit_and_confirm(call_request()).await.unwrap();
        assert!(result.confirmed);
        assert_eq!(result.block_number, Some(42));
        assert_eq!(relay.backend.broadcasts.lock().unwrap().len(), 1);
        assert_eq!(relay.backend.receipt_failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn persistent_receipt_errors_end_as_pending_with_hash() {
        let relay = relay_with(FakeNode {
            receipt_failures: AtomicUsize::new(usize::MAX),
            ..FakeNode::mining()
        });

        let result = relay.submit_and_confirm(call_request()).await.unwrap();
        assert!(!result.confirmed);
        let sent = *relay.backend.broadcasts.lock().unwrap()[0].tx_hash();
        assert_eq!(result.tx_hash, sent);
    }

    #[tokio::test]
    async fn lost_broadcast_response_is_tracked_by_local_hash() {
        let relay = relay_with(FakeNode {
            drop_broadcast_response: true,
            pending_count: 3,
            ..FakeNode::mining()
        });

        let handle = relay.submit(call_request()).await.unwrap();
        let sent = *relay.backend.broadcasts.lock().unwrap()[0].tx_hash();
        assert_eq!(handle.tx_hash, sent);
        assert_eq!(handle.nonce, 3);
        // outcome unknown: the next lease takes the node's count
        assert_eq!(relay.signer().nonces().cached().await, None);

        let result = relay.await_confirmation(handle, Duration::from_millis(100)).await.unwrap();
        assert!(result.confirmed);
        assert_eq!(result.tx_hash, sent);
    }

    #[tokio::test]
    async fn status_reflects_receipt() {
        let relay = relay_with(FakeNode::mining());
        assert_eq!(relay.status(TxHash::ZERO).await.unwrap(), TxStatus::Pending);

        let handle = relay.submit(call_request()).await.unwrap();
        match relay.status(handle.tx_hash).await.unwrap() {
            TxStatus::Confirmed(receipt) => assert_eq!(receipt.block_number, 42),
            other => panic!("unexpected status: {other:?}"),
        }
    }
}
