// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User record endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::extract::ApiJson,
    error::ApiError,
    models::{CreateUserRequest, UpdateUserRequest, User},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let store = state.store.read().await;
    Json(store.list_users())
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Identifier of the user")
    ),
    tag = "Users",
    responses(
        (status = 200, body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.find_user(&user_id)?))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    tag = "Users",
    responses(
        (status = 201, body = User),
        (status = 400, description = "Invalid name or email")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let mut store = state.store.write().await;
    let user = store.create_user(request)?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Identifier of the user")
    ),
    request_body = UpdateUserRequest,
    tag = "Users",
    responses(
        (status = 200, body = User),
        (status = 400, description = "Invalid name or email"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let mut store = state.store.write().await;
    Ok(Json(store.update_user(&user_id, request)?))
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Identifier of the user to delete")
    ),
    tag = "Users",
    responses(
        (status = 204),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_user(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
