// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fungible token contract (ERC-20 subset with an owner-only `mint`).

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol,
};

use tokio::sync::OnceCell;

use super::{call_request, view_error};
use crate::blockchain::client::ChainError;
use crate::blockchain::relay::{RelayBackend, TransactionRelay};
use crate::blockchain::types::TxResult;

sol! {
    #[sol(rpc)]
    interface IRelayToken {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function mint(address to, uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Relay token contract wrapper.
pub struct RelayToken<P> {
    contract: IRelayToken::IRelayTokenInstance<P>,
    address: Address,
    decimals: OnceCell<u8>,
}

impl<P: Provider + Clone> RelayToken<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        let contract = IRelayToken::new(address, provider.clone());

        Self {
            contract,
            address,
            decimals: OnceCell::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Balance of `owner` in the smallest unit.
    pub async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| view_error("balanceOf", e))
    }

    /// Token decimals, read once and cached.
    pub async fn decimals(&self) -> Result<u8, ChainError> {
        self.decimals
            .get_or_try_init(|| async {
                self.contract
                    .decimals()
                    .call()
                    .await
                    .map_err(|e| view_error("decimals", e))
            })
            .await
            .copied()
    }

    /// Mint `amount` (smallest unit) to `to`. Only succeeds if the admin owns the token.
    pub async fn mint<B: RelayBackend>(
        &self,
        relay: &TransactionRelay<B>,
        to: Address,
        amount: U256,
    ) -> Result<TxResult, ChainError> {
        relay.submit_and_confirm(self.mint_request(to, amount)).await
    }

    /// Transfer `amount` (smallest unit) from the admin account to `to`.
    pub async fn transfer<B: RelayBackend>(
        &self,
        relay: &TransactionRelay<B>,
        to: Address,
        amount: U256,
    ) -> Result<TxResult, ChainError> {
        relay
            .submit_and_confirm(self.transfer_request(to, amount))
            .await
    }

    fn mint_request(&self, to: Address, amount: U256) -> TransactionRequest {
        call_request(self.address, IRelayToken::mintCall { to, amount })
    }

    fn transfer_request(&self, to: Address, amount: U256) -> TransactionRequest {
        call_request(self.address, IRelayToken::transferCall { to, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;

    use crate::blockchain::client::{ChainClient, HttpProvider};
    use crate::blockchain::contracts::target;

    fn token() -> RelayToken<HttpProvider> {
        let client = ChainClient::new("http://127.0.0.1:1").unwrap();
        RelayToken::new(
            client.provider(),
            address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
        )
    }

    #[test]
    fn zero_transfer_encodes_exact_zero() {
        let token = token();
        let to = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let request = token.transfer_request(to, U256::ZERO);

        assert_eq!(target(&request), Some(token.address()));
        let decoded =
            IRelayToken::transferCall::abi_decode(request.input.input().unwrap()).unwrap();
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.amount, U256::ZERO);
    }

    #[test]
    fn mint_request_carries_recipient_and_amount() {
        let token = token();
        let to = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
        let amount = U256::from(10u64).pow(U256::from(18));
        let request = token.mint_request(to, amount);

        let input = request.input.input().unwrap();
        assert_eq!(&input[..4], IRelayToken::mintCall::SELECTOR.as_slice());
        let decoded = IRelayToken::mintCall::abi_decode(input).unwrap();
        assert_eq!((decoded.to, decoded.amount), (to, amount));
    }

    #[tokio::test]
    async fn balance_against_unreachable_node_fails() {
        let err = token().balance_of(Address::ZERO).await.unwrap_err();
        assert!(matches!(err, ChainError::Rpc(_)));
    }
}
