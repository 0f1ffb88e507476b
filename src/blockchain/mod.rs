// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the relay.
//!
//! This module provides functionality for:
//! - Contract bindings for the message board, token and NFT contracts
//! - Personal-message signature recovery
//! - The admin signer and its nonce sequencing
//! - Pagination over counter-indexed collections
//! - Transaction broadcasting and confirmation tracking

pub mod client;
pub mod contracts;
pub mod pagination;
pub mod relay;
pub mod signature;
pub mod signing;
pub mod types;
pub mod units;

pub use client::{ChainClient, ChainError, HttpProvider};
pub use contracts::{parse_address, MessageBoard, RelayToken, SimpleNft};
pub use pagination::{paginate, Page, PageRequest};
pub use relay::{RelaySettings, TransactionRelay};
pub use signature::recover_address;
pub use signing::AdminSigner;
pub use types::*;
pub use units::{format_amount, DecimalAmount};
