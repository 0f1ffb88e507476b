// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory document store for user records.
//!
//! Records are keyed by an opaque identifier and reached only through
//! create/find/update/delete. Nothing here touches the chain.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, User>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users, oldest first.
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        users
    }

    pub fn find_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn create_user(&mut self, request: CreateUserRequest) -> Result<User, ApiError> {
        let name = validate_name(&request.name)?;
        let email = validate_email(&request.email)?;

        let id = Uuid::new_v4().to_string();
        let user = User {
            id: id.clone(),
            name,
            email,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn update_user(
        &mut self,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        let name = request.name.as_deref().map(validate_name).transpose()?;
        let email = request.email.as_deref().map(validate_email).transpose()?;

        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        Ok(user.clone())
    }

    pub fn delete_user(&mut self, user_id: &str) -> Result<(), ApiError> {
        if self.users.remove(user_id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("User not found"))
        }
    }
}

fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_string()),
        _ => Err(ApiError::bad_request("email must look like user@domain")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn ada() -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn create_find_and_list_users() {
        let mut store = InMemoryStore::new();
        let ada = store.create_user(ada()).unwrap();
        let bob = store
            .create_user(CreateUserRequest {
                name: " Bob ".into(),
                email: "bob@example.com".into(),
            })
            .unwrap();

        assert!(!ada.id.is_empty());
        assert_ne!(ada.id, bob.id);
        assert_eq!(bob.name, "Bob");
        assert_eq!(store.find_user(&ada.id).unwrap(), ada);

        let listed = store.list_users();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
    }

    #[test]
    fn create_validates_fields() {
        let mut store = InMemoryStore::new();
        let err = store
            .create_user(CreateUserRequest {
                name: "  ".into(),
                email: "x@example.com".into(),
            })
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        for email in ["", "no-at-sign", "@example.com", "ada@"] {
            let err = store
                .create_user(CreateUserRequest {
                    name: "Ada".into(),
                    email: email.into(),
                })
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "accepted {email:?}");
        }
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut store = InMemoryStore::new();
        let user = store.create_user(ada()).unwrap();

        let updated = store
            .update_user(
                &user.id,
                UpdateUserRequest {
                    email: Some("ada@lovelace.dev".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.email, "ada@lovelace.dev");
        assert_eq!(updated.created_at, user.created_at);

        let err = store
            .update_user(
                &user.id,
                UpdateUserRequest {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(store.find_user(&user.id).unwrap().name, "Ada");
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.find_user("missing").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(
            store
                .update_user("missing", UpdateUserRequest::default())
                .unwrap_err()
                .status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(store.delete_user("missing").unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn delete_removes_user() {
        let mut store = InMemoryStore::new();
        let user = store.create_user(ada()).unwrap();
        store.delete_user(&user.id).unwrap();
        assert!(store.find_user(&user.id).is_err());
        assert!(store.list_users().is_empty());
    }
}
