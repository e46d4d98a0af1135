//! Cursor-based pagination.
//!
//! Two layers:
//!
//! 1. [`PageSource::fetch_page`] performs exactly one request: token in,
//!    items and the next token out. [`Page`] wraps it as an explicit cursor.
//! 2. [`paginate`] turns a source into a lazy stream of items, built only on
//!    top of `fetch_page`. It keeps one fetch in flight and emits items in the
//!    order the service declared them.
//!
//! Continuation tokens are opaque and never inspected.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};

use crate::{Error, Result, TRACING_TARGET_PAGES};

/// Items of one fetched page and the token for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse<T> {
    /// Items in service order.
    pub items: Vec<T>,
    /// Token for the next page; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

impl<T> PageResponse<T> {
    /// Creates a response. An empty token is treated as exhausted.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items,
            next_token: next_token.filter(|token| !token.is_empty()),
        }
    }
}

/// Single-request page fetch.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync + 'static {
    /// Item type of the listing.
    type Item: Send + 'static;

    /// Fetches the page identified by `token`, or the first page for `None`.
    async fn fetch_page(
        &self,
        token: Option<String>,
        page_size: u32,
    ) -> Result<PageResponse<Self::Item>>;
}

/// Shared handle to a page source.
pub type SharedPageSource<T> = Arc<dyn PageSource<Item = T>>;

/// One fetched page plus the cursor to the next one.
///
/// A page must not be advanced by more than one caller at a time; concurrent
/// [`next_page`](Self::next_page) calls on the same page each issue their own
/// fetch and the outcome is unspecified.
pub struct Page<T> {
    items: Vec<T>,
    next_token: Option<String>,
    page_size: u32,
    source: SharedPageSource<T>,
}

impl<T: Send + 'static> Page<T> {
    /// Fetches the first page of `source`.
    pub async fn first(source: SharedPageSource<T>, page_size: u32) -> Result<Self> {
        validate_page_size(page_size)?;
        Self::fetch(source, None, page_size).await
    }

    async fn fetch(
        source: SharedPageSource<T>,
        token: Option<String>,
        page_size: u32,
    ) -> Result<Self> {
        let response = source.fetch_page(token, page_size).await?;

        tracing::debug!(
            target: TRACING_TARGET_PAGES,
            count = response.items.len(),
            has_more = response.next_token.is_some(),
            "Page fetched"
        );

        Ok(Self {
            items: response.items,
            next_token: response.next_token,
            page_size,
            source,
        })
    }

    /// Items of this page in service order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Whether another page can be fetched.
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }

    /// Page size bound used for every fetch of this cursor.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches the following page.
    ///
    /// Fails with a configuration error, without touching the transport,
    /// when this is the last page.
    pub async fn next_page(&self) -> Result<Self> {
        let Some(token) = self.next_token.clone() else {
            return Err(Error::configuration(
                "no further pages: the listing is exhausted",
            ));
        };
        Self::fetch(self.source.clone(), Some(token), self.page_size).await
    }
}

impl<T: fmt::Debug> fmt::Debug for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("items", &self.items)
            .field("has_more", &self.next_token.is_some())
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily streams every item of `source`, page by page.
///
/// Nothing is fetched until the stream is polled. Each returned stream starts
/// from the first page; a stream cannot be resumed mid-way.
pub fn paginate<T: Send + 'static>(
    source: SharedPageSource<T>,
    page_size: u32,
) -> BoxStream<'static, Result<T>> {
    if let Err(err) = validate_page_size(page_size) {
        return stream::once(async move { Err(err) }).boxed();
    }

    stream::try_unfold(Cursor::Start, move |cursor| advance(source.clone(), cursor, page_size))
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
        .try_flatten()
        .boxed()
}

async fn advance<T: Send + 'static>(
    source: SharedPageSource<T>,
    cursor: Cursor,
    page_size: u32,
) -> Result<Option<(Vec<T>, Cursor)>> {
    let token = match cursor {
        Cursor::Start => None,
        Cursor::Next(token) => Some(token),
        Cursor::Done => return Ok(None),
    };

    let response = source.fetch_page(token, page_size).await?;
    let next = match response.next_token {
        Some(token) => Cursor::Next(token),
        None => Cursor::Done,
    };
    Ok(Some((response.items, next)))
}

fn validate_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 {
        return Err(Error::configuration("page size must be at least 1"));
    }
    Ok(())
}
