// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::ChainError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Chain failures keep their reason; callers need revert messages to debug.
impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        let message = err.to_string();
        match err {
            ChainError::InvalidArgument(_) | ChainError::InvalidSignature(_) => {
                Self::bad_request(message)
            }
            ChainError::InsufficientFunds(_) => Self::unprocessable(message),
            ChainError::Rpc(_)
            | ChainError::BroadcastRejected(_)
            | ChainError::Reverted { .. } => Self::bad_gateway(message),
            ChainError::ConfirmationTimeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                format!("{}; it may still be mined, do not resubmit", message),
            ),
            ChainError::InvalidRpcUrl(_) | ChainError::InvalidPrivateKey(_) => {
                Self::internal(message)
            }
        }
    }
}

/// Body and query rejections keep axum's status (400, 415 or 422).
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::TxHash;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let denied = ApiError::forbidden("nope");
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");
    }

    #[test]
    fn chain_errors_map_to_statuses() {
        let cases = [
            (ChainError::InvalidArgument("page".into()), StatusCode::BAD_REQUEST),
            (ChainError::InvalidSignature("len".into()), StatusCode::BAD_REQUEST),
            (ChainError::Rpc("down".into()), StatusCode::BAD_GATEWAY),
            (ChainError::BroadcastRejected("nonce too low".into()), StatusCode::BAD_GATEWAY),
            (
                ChainError::Reverted {
                    tx_hash: None,
                    reason: "Ownable: caller is not the owner".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (ChainError::InsufficientFunds("gas".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ChainError::ConfirmationTimeout { tx_hash: TxHash::ZERO },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn revert_reason_reaches_the_caller() {
        let err = ApiError::from(ChainError::Reverted {
            tx_hash: None,
            reason: "execution reverted: Ownable: caller is not the owner".into(),
        });
        assert!(err.message.contains("caller is not the owner"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
