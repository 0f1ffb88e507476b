// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain Relay Server - REST relay over EVM contracts
//!
//! Serves paginated reads of an on-chain message board and relays signed
//! client intents (posts, token mints and transfers, NFT mints) as
//! transactions paid for by one server-held admin key.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Contract bindings, signature recovery, transaction relay
//! - `config` - Environment configuration
//! - `store` - In-memory user records

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
