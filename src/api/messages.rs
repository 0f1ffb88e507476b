// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use alloy::primitives::Address;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{
        extract::{ApiJson, ApiQuery},
        write_status,
    },
    blockchain::{paginate, parse_address, recover_address, MessageRecord, PageRequest},
    error::ApiError,
    state::AppState,
};

/// Prefix the front end signs in front of the message content.
const POST_MESSAGE_PREFIX: &str = "Post message: ";

#[derive(Debug, Deserialize, IntoParams)]
pub struct MessagesQuery {
    /// 1-based page number (default 1).
    pub page: Option<i64>,
    /// Items per page, at least 1 (default 10).
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub sender: String,
    pub content: String,
    /// RFC 3339 UTC time the message was mined.
    pub timestamp: String,
}

impl From<MessageRecord> for MessageView {
    fn from(record: MessageRecord) -> Self {
        let timestamp = record
            .timestamp_rfc3339()
            .unwrap_or_else(|| record.timestamp.to_string());
        Self {
            sender: record.sender.to_checksum(None),
            content: record.content,
            timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub content: String,
    /// 65-byte personal_sign signature, hex.
    pub signature: String,
    /// The exact text that was signed: `"Post message: " + content`.
    pub message: String,
    /// Address the client claims signed the message.
    #[serde(default)]
    pub sender: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageResponse {
    pub success: bool,
    pub tx_hash: String,
    /// Recovered signer of the request.
    pub sender: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

/// Recover the signer of a post request and check it may post `content`.
fn authorize_post(request: &PostMessageRequest) -> Result<Address, ApiError> {
    let claimed = request
        .sender
        .as_deref()
        .map(|sender| parse_address(sender, "sender"))
        .transpose()?;

    let signer = recover_address(&request.message, &request.signature)?;

    if request.message != format!("{POST_MESSAGE_PREFIX}{}", request.content) {
        return Err(ApiError::forbidden(
            "Signed message does not match the posted content",
        ));
    }

    if let Some(claimed) = claimed {
        if claimed != signer {
            return Err(ApiError::forbidden(format!(
                "Signature was produced by {}, not {}",
                signer.to_checksum(None),
                claimed.to_checksum(None)
            )));
        }
    }

    Ok(signer)
}

#[utoipa::path(
    get,
    path = "/messages",
    params(MessagesQuery),
    tag = "Messages",
    responses(
        (status = 200, body = MessagesResponse),
        (status = 400, description = "Invalid page or limit"),
        (status = 502, description = "RPC node unavailable")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessagesQuery>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let request = PageRequest::from_query(query.page, query.limit)?;
    let page = paginate(&state.chain.message_board, request).await?;

    let total = u64::try_from(page.total)
        .map_err(|_| ApiError::bad_gateway(format!("Message count {} out of range", page.total)))?;

    Ok(Json(MessagesResponse {
        messages: page.items.into_iter().map(MessageView::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    post,
    path = "/messages",
    request_body = PostMessageRequest,
    tag = "Messages",
    responses(
        (status = 200, description = "Message posted and confirmed", body = PostMessageResponse),
        (status = 202, description = "Broadcast but not yet confirmed; poll /tx/{txHash}", body = PostMessageResponse),
        (status = 400, description = "Malformed signature or sender"),
        (status = 403, description = "Signature does not authorize this post"),
        (status = 502, description = "Broadcast failed or transaction reverted")
    )
)]
pub async fn post_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<PostMessageResponse>), ApiError> {
    let signer = authorize_post(&request).inspect_err(|e| {
        warn!(status = %e.status, error = %e.message, "Rejected message post");
    })?;

    let result = state
        .chain
        .message_board
        .post_message(&state.chain.relay, &request.content)
        .await?;

    info!(
        tx_hash = %result.tx_hash,
        signer = %signer,
        confirmed = result.confirmed,
        "Relayed message post"
    );

    Ok((
        write_status(&result),
        Json(PostMessageResponse {
            success: result.confirmed,
            tx_hash: result.tx_hash.to_string(),
            sender: signer.to_checksum(None),
            pending: !result.confirmed,
        }),
    ))
}
