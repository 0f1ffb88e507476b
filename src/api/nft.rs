// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{extract::ApiJson, write_status},
    blockchain::{parse_address, OwnedToken},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MintNftRequest {
    /// Requesting wallet. Validated, but the contract mints to the admin.
    pub address: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintNftResponse {
    pub tx_hash: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NftView {
    /// Token id as a decimal string.
    #[serde(rename = "tokenId")]
    pub token_id: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
}

impl From<OwnedToken> for NftView {
    fn from(token: OwnedToken) -> Self {
        Self {
            token_id: token.token_id.to_string(),
            token_uri: token.token_uri,
        }
    }
}

#[utoipa::path(
    post,
    path = "/nft/mint",
    request_body = MintNftRequest,
    tag = "NFT",
    responses(
        (status = 200, description = "Minted and confirmed", body = MintNftResponse),
        (status = 202, description = "Broadcast but not yet confirmed", body = MintNftResponse),
        (status = 400, description = "Malformed address"),
        (status = 502, description = "Broadcast failed or transaction reverted")
    )
)]
pub async fn mint_nft(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MintNftRequest>,
) -> Result<(StatusCode, Json<MintNftResponse>), ApiError> {
    let requested_by = parse_address(&request.address, "address")?;
    let result = state
        .chain
        .nft
        .mint(&state.chain.relay, &request.token_uri)
        .await?;

    info!(
        tx_hash = %result.tx_hash,
        %requested_by,
        owner = %state.chain.relay.signer().address(),
        "Relayed NFT mint"
    );
    Ok((
        write_status(&result),
        Json(MintNftResponse {
            tx_hash: result.tx_hash.to_string(),
            pending: !result.confirmed,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/nft/nfts/{address}",
    params(
        ("address" = String, Path, description = "Owner to list tokens for")
    ),
    tag = "NFT",
    responses(
        (status = 200, body = [NftView]),
        (status = 400, description = "Malformed address"),
        (status = 502, description = "RPC node unavailable")
    )
)]
pub async fn list_nfts(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<NftView>>, ApiError> {
    let owner = parse_address(&address, "address")?;
    let tokens = state.chain.nft.tokens_of_owner(owner).await?;
    Ok(Json(tokens.into_iter().map(NftView::from).collect()))
}
