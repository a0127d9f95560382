//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// A resolved page window over an ordered result set.
///
/// Built from the optional `limit`/`page` pair carried by list queries:
/// a missing or zero limit means "no pagination at all", and a page below 1
/// is treated as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Resolve optional query parameters into a page window.
    ///
    /// Returns `None` when every row should be returned.
    pub fn from_query(limit: Option<u64>, page: Option<u64>) -> Option<Self> {
        match limit {
            Some(limit) if limit > 0 => Some(Self::new(page.unwrap_or(1), limit)),
            _ => None,
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}
