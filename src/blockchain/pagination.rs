// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offset pagination over counter-indexed on-chain collections.
//!
//! Contracts expose a `count()` accessor and an `item(index)` accessor but no
//! range queries. A page is fetched by re-reading the count, computing the
//! `[start, end)` window and reading each index individually. Reads run
//! concurrently, at most [`MAX_CONCURRENT_READS`] at a time; results keep
//! index order.

use std::future::Future;

use alloy::primitives::U256;
use futures::{stream, StreamExt, TryStreamExt};

use super::client::ChainError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Item reads in flight at once for a single page.
pub const MAX_CONCURRENT_READS: usize = 16;

/// A collection readable by zero-based index.
pub trait IndexedCollection: Sync {
    type Item: Send;

    /// Current number of items.
    fn count(&self) -> impl Future<Output = Result<U256, ChainError>> + Send;

    fn item_at(&self, index: U256) -> impl Future<Output = Result<Self::Item, ChainError>> + Send;
}

/// Validated page coordinates (1-based page, items per page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Result<Self, ChainError> {
        if page < 1 {
            return Err(ChainError::InvalidArgument(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if limit < 1 {
            return Err(ChainError::InvalidArgument(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }

        Ok(Self {
            page: page as u64,
            limit: limit as u64,
        })
    }

    /// Build from optional query values, applying the defaults.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Result<Self, ChainError> {
        Self::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Zero-based start offset of this page.
    pub fn start(&self) -> U256 {
        U256::from(self.page - 1) * U256::from(self.limit)
    }

    /// Indices of this page within a collection of `total` items, ascending.
    ///
    /// Empty when the page lies past the end.
    pub fn indices(&self, total: U256) -> impl Iterator<Item = U256> {
        let start = self.start();
        (0..self.limit)
            .map(move |offset| start + U256::from(offset))
            .take_while(move |index| *index < total)
    }
}

/// One page of results with the collection total at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: U256,
    pub page: u64,
    pub limit: u64,
}

/// Fetch one page of `collection`.
///
/// A failed read of any index fails the whole page.
pub async fn paginate<C>(collection: &C, request: PageRequest) -> Result<Page<C::Item>, ChainError>
where
    C: IndexedCollection,
{
    let total = collection.count().await?;
    let items: Vec<C::Item> = stream::iter(request.indices(total))
        .map(|index| collection.item_at(index))
        .buffered(MAX_CONCURRENT_READS)
        .try_collect()
        .await?;

    Ok(Page {
        items,
        total,
        page: request.page(),
        limit: request.limit(),
    })
}
