//! Pagination utilities

use serde::{Deserialize, Serialize};

/// Pagination configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

impl Pagination {
    pub fn new() -> Self {
        Self {
            limit: None,
            offset: None,
        }
    }

    /// Limit/offset window for a 1-based page number
    pub fn for_page(page: u64, per_page: u32) -> Self {
        let page = page.max(1);
        let per_page = i64::from(per_page.max(1));
        let offset = i64::try_from(page - 1)
            .unwrap_or(i64::MAX)
            .saturating_mul(per_page);
        Self::new().with_limit(per_page).with_offset(offset)
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One page of results together with the totals needed to render pagers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, per_page: u32, current_page: u64) -> Self {
        let per_page_u64 = u64::from(per_page.max(1));
        let last_page = total.div_ceil(per_page_u64).max(1);
        Self {
            data,
            total,
            per_page,
            current_page: current_page.max(1),
            last_page,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Convert the items while keeping the page metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}
