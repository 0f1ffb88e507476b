// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::TxResult,
    models::{CreateUserRequest, UpdateUserRequest, User},
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod messages;
pub mod nft;
pub mod token;
pub mod transactions;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route("/token/balance/{address}", get(token::get_balance))
        .route("/token/mint", post(token::mint_tokens))
        .route("/token/transfer", post(token::transfer_tokens))
        .route("/nft/mint", post(nft::mint_nft))
        .route("/nft/nfts/{address}", get(nft::list_nfts))
        .route("/tx/{tx_hash}", get(transactions::get_transaction_status))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Body of a relayed write.
///
/// `pending == true` (HTTP 202) means the transaction was broadcast but not
/// confirmed within the timeout. It may still be mined: poll `/tx/{txHash}`
/// instead of resubmitting.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub success: bool,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl From<&TxResult> for WriteResponse {
    fn from(result: &TxResult) -> Self {
        Self {
            success: result.confirmed,
            tx_hash: result.tx_hash.to_string(),
            pending: !result.confirmed,
        }
    }
}

/// 200 once included in a block, 202 while still pending.
pub(crate) fn write_status(result: &TxResult) -> StatusCode {
    if result.confirmed {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        messages::list_messages,
        messages::post_message,
        token::get_balance,
        token::mint_tokens,
        token::transfer_tokens,
        nft::mint_nft,
        nft::list_nfts,
        transactions::get_transaction_status,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            WriteResponse,
            messages::MessageView,
            messages::MessagesResponse,
            messages::PostMessageRequest,
            messages::PostMessageResponse,
            token::BalanceResponse,
            token::MintTokensRequest,
            token::TransferTokensRequest,
            nft::MintNftRequest,
            nft::MintNftResponse,
            nft::NftView,
            transactions::TransactionStatusResponse,
            User,
            CreateUserRequest,
            UpdateUserRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Messages", description = "Paginated message board and signed posts"),
        (name = "Token", description = "Fungible token balance, mint and transfer"),
        (name = "NFT", description = "NFT minting and ownership queries"),
        (name = "Transactions", description = "Status of relayed transactions"),
        (name = "Users", description = "Off-chain user records"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
