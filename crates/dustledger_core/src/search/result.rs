//! Paged search result.
//!
//! # Invariants
//! - `last_page = max(1, ceil(total / per_page))`.
//! - `items` holds only the requested page; `total` counts every match.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult<E> {
    items: Vec<E>,
    total: u64,
    current_page: u32,
    per_page: u32,
    last_page: u32,
}

impl<E> SearchResult<E> {
    pub fn new(items: Vec<E>, total: u64, current_page: u32, per_page: u32) -> Self {
        Self {
            items,
            total,
            current_page,
            per_page,
            last_page: last_page(total, per_page),
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    /// Maps page items while keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(E) -> U) -> SearchResult<U> {
        SearchResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
            last_page: self.last_page,
        }
    }
}

/// `max(1, ceil(total / per_page))`, saturating at `u32::MAX`.
pub fn last_page(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(per_page)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
