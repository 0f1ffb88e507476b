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
    api::{extract::ApiJson, write_status, WriteResponse},
    blockchain::{format_amount, parse_address, DecimalAmount},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub address: String,
    /// Balance in whole tokens as a decimal string, e.g. `"12.5"`.
    pub balance: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MintTokensRequest {
    pub to: String,
    /// Decimal amount in whole tokens.
    pub amount: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferTokensRequest {
    /// Must be the relay's admin address; the relay only spends its own balance.
    pub from: String,
    pub to: String,
    /// Decimal amount in whole tokens.
    pub amount: String,
}

#[utoipa::path(
    get,
    path = "/token/balance/{address}",
    params(
        ("address" = String, Path, description = "Account to query")
    ),
    tag = "Token",
    responses(
        (status = 200, body = BalanceResponse),
        (status = 400, description = "Malformed address"),
        (status = 502, description = "RPC node unavailable")
    )
)]
pub async fn get_balance(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let owner = parse_address(&address, "address")?;
    let token = &state.chain.token;

    let (decimals, balance) = tokio::try_join!(token.decimals(), token.balance_of(owner))?;

    Ok(Json(BalanceResponse {
        address: owner.to_checksum(None),
        balance: format_amount(balance, decimals),
    }))
}

#[utoipa::path(
    post,
    path = "/token/mint",
    request_body = MintTokensRequest,
    tag = "Token",
    responses(
        (status = 200, description = "Minted and confirmed", body = WriteResponse),
        (status = 202, description = "Broadcast but not yet confirmed", body = WriteResponse),
        (status = 400, description = "Malformed address or amount"),
        (status = 502, description = "Broadcast failed or transaction reverted")
    )
)]
pub async fn mint_tokens(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MintTokensRequest>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let to = parse_address(&request.to, "to")?;
    let amount: DecimalAmount = request.amount.parse()?;

    let token = &state.chain.token;
    let units = amount.to_units(token.decimals().await?)?;
    let result = token.mint(&state.chain.relay, to, units).await?;

    info!(tx_hash = %result.tx_hash, %to, amount = %request.amount, "Relayed token mint");
    Ok((write_status(&result), Json(WriteResponse::from(&result))))
}

#[utoipa::path(
    post,
    path = "/token/transfer",
    request_body = TransferTokensRequest,
    tag = "Token",
    responses(
        (status = 200, description = "Transferred and confirmed", body = WriteResponse),
        (status = 202, description = "Broadcast but not yet confirmed", body = WriteResponse),
        (status = 400, description = "Malformed address or amount"),
        (status = 403, description = "`from` is not the relay's admin account"),
        (status = 422, description = "Admin account cannot pay"),
        (status = 502, description = "Broadcast failed or transaction reverted")
    )
)]
pub async fn transfer_tokens(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransferTokensRequest>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let from = parse_address(&request.from, "from")?;
    let to = parse_address(&request.to, "to")?;
    let amount: DecimalAmount = request.amount.parse()?;

    let admin = state.chain.relay.signer().address();
    if from != admin {
        return Err(ApiError::forbidden(format!(
            "Transfers can only be made from the relay account {}",
            admin.to_checksum(None)
        )));
    }

    let token = &state.chain.token;
    let units = amount.to_units(token.decimals().await?)?;
    let result = token.transfer(&state.chain.relay, to, units).await?;

    info!(tx_hash = %result.tx_hash, %to, amount = %request.amount, "Relayed token transfer");
    Ok((write_status(&result), Json(WriteResponse::from(&result))))
}
