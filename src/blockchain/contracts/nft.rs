// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NFT contract whose token media lives off-chain behind `tokenURI`.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol,
};
use futures::future::try_join_all;

use super::{call_request, view_error};
use crate::blockchain::client::ChainError;
use crate::blockchain::relay::{RelayBackend, TransactionRelay};
use crate::blockchain::types::{OwnedToken, TxResult};

sol! {
    #[sol(rpc)]
    interface ISimpleNft {
        function mint(string tokenURI) external returns (uint256);
        function tokensOfOwner(address owner) external view returns (uint256[]);
        function tokenURI(uint256 tokenId) external view returns (string);
    }
}

/// NFT contract wrapper.
pub struct SimpleNft<P> {
    contract: ISimpleNft::ISimpleNftInstance<P>,
    address: Address,
}

impl<P: Provider + Clone> SimpleNft<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        let contract = ISimpleNft::new(address, provider.clone());

        Self { contract, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Mint a token pointing at `token_uri`.
    ///
    /// The contract mints to `msg.sender`, so the token lands on the relay's
    /// admin address.
    pub async fn mint<B: RelayBackend>(
        &self,
        relay: &TransactionRelay<B>,
        token_uri: &str,
    ) -> Result<TxResult, ChainError> {
        relay.submit_and_confirm(self.mint_request(token_uri)).await
    }

    pub async fn token_uri(&self, token_id: U256) -> Result<String, ChainError> {
        self.contract
            .tokenURI(token_id)
            .call()
            .await
            .map_err(|e| view_error("tokenURI", e))
    }

    /// All tokens held by `owner` with their URIs, in contract order.
    pub async fn tokens_of_owner(&self, owner: Address) -> Result<Vec<OwnedToken>, ChainError> {
        let token_ids = self
            .contract
            .tokensOfOwner(owner)
            .call()
            .await
            .map_err(|e| view_error("tokensOfOwner", e))?;

        try_join_all(token_ids.into_iter().map(|token_id| async move {
            let token_uri = self.token_uri(token_id).await?;
            Ok::<_, ChainError>(OwnedToken { token_id, token_uri })
        }))
        .await
    }

    fn mint_request(&self, token_uri: &str) -> TransactionRequest {
        call_request(
            self.address,
            ISimpleNft::mintCall {
                tokenURI: token_uri.to_string(),
            },
        )
    }
}
