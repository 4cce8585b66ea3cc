//! Page-numbered pagination shared by every list endpoint.
//!
//! A page is addressed by a 1-indexed page number (`start`) and a page size
//! (`limit`). Whether neighbouring pages exist is derived from
//! `(start, limit, total_count)` alone, so the navigation logic never looks at
//! the items themselves.

use std::future::Future;

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_PAGE_START: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            start: DEFAULT_PAGE_START,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(start: u64, limit: u64) -> AppResult<Self> {
        if start == 0 || limit == 0 {
            return Err(AppError::ValidationError(
                "start and limit must be positive integers".to_string(),
            ));
        }
        Ok(Self { start, limit })
    }

    /// Number of items preceding this page.
    pub fn skip(&self) -> u64 {
        (self.start - 1).saturating_mul(self.limit)
    }

    /// The following page, if any item lies beyond this one.
    pub fn next(&self, total_count: u64) -> Option<PageRequest> {
        (total_count > self.start.saturating_mul(self.limit)).then(|| PageRequest {
            start: self.start + 1,
            limit: self.limit,
        })
    }

    /// The preceding page, present for every page after the first.
    pub fn prev(&self) -> Option<PageRequest> {
        (self.skip() > 0).then(|| PageRequest {
            start: self.start - 1,
            limit: self.limit,
        })
    }
}

/// One page of items plus opaque locators for its neighbours.
///
/// Serializes as `{ <key>: [...], "next": ..., "prev": ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    key: String,
    items: Vec<T>,
    next: Option<String>,
    prev: Option<String>,
}

impl<T> PageResult<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn prev(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Serialize> Serialize for PageResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.key, &self.items)?;
        map.serialize_entry("next", &self.next)?;
        map.serialize_entry("prev", &self.prev)?;
        map.end()
    }
}

/// Fetches one page through `query(skip, take)` and builds its locators.
///
/// `locator` turns a page request into whatever the client should resubmit
/// to fetch that page; it is only called for pages that exist.
pub async fn paginate<T, Q, Fut, L>(
    query: Q,
    total_count: u64,
    locator: L,
    key: &str,
    page: PageRequest,
) -> AppResult<PageResult<T>>
where
    Q: FnOnce(u64, u64) -> Fut,
    Fut: Future<Output = AppResult<Vec<T>>>,
    L: Fn(PageRequest) -> String,
{
    let mut items = query(page.skip(), page.limit).await?;
    items.truncate(page.limit as usize);

    Ok(PageResult {
        key: key.to_string(),
        items,
        next: page.next(total_count).map(&locator),
        prev: page.prev().map(&locator),
    })
}

/// Locator builder that re-targets `path` with new `start`/`limit` values.
pub fn path_locator(path: &str) -> impl Fn(PageRequest) -> String {
    let path = path.to_string();
    move |page| format!("{}?start={}&limit={}", path, page.start, page.limit)
}
