// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::blockchain::{
    ChainClient, ChainError, HttpProvider, MessageBoard, RelayToken, SimpleNft, TransactionRelay,
};
use crate::config::{Config, ConfigError};
use crate::store::InMemoryStore;

/// Chain-facing services, built once at startup and shared by all requests.
pub struct ChainServices {
    pub client: ChainClient,
    pub relay: TransactionRelay<ChainClient>,
    pub message_board: MessageBoard<HttpProvider>,
    pub token: RelayToken<HttpProvider>,
    pub nft: SimpleNft<HttpProvider>,
}

impl ChainServices {
    /// Load the admin key and bind the contracts. Makes no network request.
    pub fn connect(config: &Config) -> Result<Self, ConfigError> {
        let signer = Arc::new(config.admin_key.load()?);
        let client = ChainClient::new(&config.rpc_url).map_err(invalid_rpc_url)?;

        let provider = client.provider();
        let message_board = MessageBoard::new(provider, config.message_board_address);
        let token = RelayToken::new(provider, config.token_address);
        let nft = SimpleNft::new(provider, config.nft_address);
        let relay = TransactionRelay::new(client.clone(), signer, config.relay_settings());

        Ok(Self {
            client,
            relay,
            message_board,
            token,
            nft,
        })
    }
}

fn invalid_rpc_url(e: ChainError) -> ConfigError {
    ConfigError::InvalidValue {
        key: crate::config::RPC_URL_ENV,
        reason: e.to_string(),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ChainServices>,
    pub store: Arc<RwLock<InMemoryStore>>,
}

impl AppState {
    pub fn new(chain: ChainServices, store: InMemoryStore) -> Self {
        Self {
            chain: Arc::new(chain),
            store: Arc::new(RwLock::new(store)),
        }
    }
}
