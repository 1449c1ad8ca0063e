//! Lazily paginated list resources.
//!
//! A [`Collection`] presents a list endpoint (for example
//! `/api/v1/tickets`) as an index-addressable sequence. Pages are fetched on
//! first use and memoized, so every page is requested at most once per
//! collection, even when several tasks ask for it at the same time.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::Client;
use crate::error::{Result, UserVoiceError};
use crate::models::Page;

/// Largest page size the API serves.
pub const PER_PAGE: usize = 100;

/// A remote list resource with at-most-once page fetches.
///
/// The collection holds a clone of its [`Client`], which shares the
/// connection pool. `total_records` is learned from the first page fetched
/// and never refreshed.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let suggestions = client.collection("/api/v1/suggestions?sort=newest", Some(250));
/// println!("{} suggestions", suggestions.size().await?);
///
/// let mut items = std::pin::pin!(suggestions.items());
/// while let Some(item) = items.next().await {
///     println!("{}", item?["title"]);
/// }
/// ```
pub struct Collection {
    client: Client,
    path: String,
    limit: usize,
    per_page: usize,
    cache: Mutex<PageCache>,
}

#[derive(Default)]
struct PageCache {
    total_records: Option<usize>,
    pages: HashMap<usize, Arc<Vec<Value>>>,
}

impl Collection {
    /// Creates a collection over `path`, capped at `limit` items if given.
    pub fn new(client: Client, path: impl Into<String>, limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(usize::MAX);
        Self {
            client,
            path: path.into(),
            limit,
            per_page: limit.clamp(1, PER_PAGE),
            cache: Mutex::new(PageCache::default()),
        }
    }

    /// The list endpoint path, without pagination parameters.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The item cap (`usize::MAX` when unbounded).
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Items requested per page: `min(limit, 100)`.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of items, `min(total_records, limit)`.
    ///
    /// Fetches the first page if nothing has been fetched yet.
    pub async fn size(&self) -> Result<usize> {
        let known = self.cache.lock().await.total_records;
        let total = match known {
            Some(total) => total,
            None => {
                self.load_page(1).await?;
                self.cache.lock().await.total_records.unwrap_or_default()
            }
        };
        Ok(total.min(self.limit))
    }

    /// True when the collection has no items.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.size().await? == 0)
    }

    /// Returns the item at `index`.
    ///
    /// # Errors
    ///
    /// `UserVoiceError::OutOfRange` unless `index < size()`.
    pub async fn get(&self, index: usize) -> Result<Value> {
        let size = self.size().await?;
        if index >= size {
            return Err(UserVoiceError::OutOfRange { index, size });
        }

        let page = self.load_page(index / self.per_page + 1).await?;
        page.get(index % self.per_page)
            .cloned()
            .ok_or(UserVoiceError::OutOfRange { index, size })
    }

    /// Returns the items of page `page` (1-based), fetching it if needed.
    ///
    /// The cache lock is held across the fetch, so concurrent callers wait
    /// for the first one instead of issuing their own request.
    ///
    /// # Errors
    ///
    /// `UserVoiceError::NotFound` if the response is not a list envelope,
    /// plus any error from the request itself.
    pub async fn load_page(&self, page: usize) -> Result<Arc<Vec<Value>>> {
        let mut cache = self.cache.lock().await;
        if let Some(items) = cache.pages.get(&page) {
            return Ok(Arc::clone(items));
        }

        let url = self.page_url(page);
        let parsed = Page::from_value(self.client.get(&url).await?)?;

        tracing::debug!(
            path = %self.path,
            page = page,
            items = parsed.items.len(),
            total_records = parsed.response_data.total_records,
            "Loaded collection page"
        );

        cache
            .total_records
            .get_or_insert(parsed.response_data.total_records);
        let items = Arc::new(parsed.items);
        cache.pages.insert(page, Arc::clone(&items));
        Ok(items)
    }

    /// Lazily yields every item in order, starting from index 0.
    ///
    /// Each call returns a fresh stream. A failed fetch is yielded as an
    /// `Err` and ends the stream.
    pub fn items(&self) -> impl Stream<Item = Result<Value>> + '_ {
        stream::unfold(Some(0usize), move |next| async move {
            let index = next?;
            let size = match self.size().await {
                Ok(size) => size,
                Err(e) => return Some((Err(e), None)),
            };
            if index >= size {
                return None;
            }
            match self.get(index).await {
                Ok(item) => Some((Ok(item), Some(index + 1))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Fetches every item into a vector.
    ///
    /// The vector grows one page at a time; `total_records` is only a claim
    /// made by the server.
    pub async fn to_vec(&self) -> Result<Vec<Value>> {
        let size = self.size().await?;
        let mut items = Vec::with_capacity(size.min(self.per_page));
        for index in 0..size {
            items.push(self.get(index).await?);
        }
        Ok(items)
    }

    fn page_url(&self, page: usize) -> String {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}per_page={}&page={}",
            self.path, separator, self.per_page, page
        )
    }
}
