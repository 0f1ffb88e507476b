// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message board contract: an append-only list of posts.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol,
};

use super::{call_request, view_error};
use crate::blockchain::client::ChainError;
use crate::blockchain::pagination::IndexedCollection;
use crate::blockchain::relay::{RelayBackend, TransactionRelay};
use crate::blockchain::types::{MessageRecord, TxResult};

sol! {
    #[sol(rpc)]
    interface IMessageBoard {
        function postMessage(string content) external;
        function getMessageCount() external view returns (uint256);
        function getMessage(uint256 index) external view returns (address sender, string content, uint256 timestamp);
    }
}

/// Message board contract wrapper.
pub struct MessageBoard<P> {
    contract: IMessageBoard::IMessageBoardInstance<P>,
    address: Address,
}

impl<P: Provider + Clone> MessageBoard<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        let contract = IMessageBoard::new(address, provider.clone());

        Self { contract, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of posts on the board.
    pub async fn message_count(&self) -> Result<U256, ChainError> {
        self.contract
            .getMessageCount()
            .call()
            .await
            .map_err(|e| view_error("getMessageCount", e))
    }

    /// Post at `index` (zero-based).
    pub async fn message_at(&self, index: U256) -> Result<MessageRecord, ChainError> {
        let message = self
            .contract
            .getMessage(index)
            .call()
            .await
            .map_err(|e| view_error("getMessage", e))?;

        Ok(MessageRecord {
            sender: message.sender,
            content: message.content,
            timestamp: message.timestamp,
        })
    }

    /// Post `content` under the admin identity and wait for confirmation.
    pub async fn post_message<B: RelayBackend>(
        &self,
        relay: &TransactionRelay<B>,
        content: &str,
    ) -> Result<TxResult, ChainError> {
        relay
            .submit_and_confirm(self.post_message_request(content))
            .await
    }

    fn post_message_request(&self, content: &str) -> TransactionRequest {
        call_request(
            self.address,
            IMessageBoard::postMessageCall {
                content: content.to_string(),
            },
        )
    }
}

impl<P: Provider + Clone> IndexedCollection for MessageBoard<P> {
    type Item = MessageRecord;

    async fn count(&self) -> Result<U256, ChainError> {
        self.message_count().await
    }

    async fn item_at(&self, index: U256) -> Result<MessageRecord, ChainError> {
        self.message_at(index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, keccak256};
    use alloy::sol_types::SolCall;

    use crate::blockchain::client::ChainClient;
    use crate::blockchain::contracts::target;

    fn board() -> MessageBoard<crate::blockchain::client::HttpProvider> {
        let client = ChainClient::new("http://127.0.0.1:1").unwrap();
        MessageBoard::new(
            client.provider(),
            address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
        )
    }

    #[test]
    fn post_request_targets_board_with_encoded_content() {
        let board = board();
        let request = board.post_message_request("gm, chain");

        assert_eq!(target(&request), Some(board.address()));
        let input = request.input.input().unwrap();
        assert_eq!(&input[..4], &keccak256("postMessage(string)")[..4]);

        let decoded = IMessageBoard::postMessageCall::abi_decode(input).unwrap();
        assert_eq!(decoded.content, "gm, chain");
    }

    #[tokio::test]
    async fn unreachable_node_is_an_rpc_error() {
        let err = board().message_count().await.unwrap_err();
        assert!(matches!(err, ChainError::Rpc(ref m) if m.contains("getMessageCount")));
    }
}
