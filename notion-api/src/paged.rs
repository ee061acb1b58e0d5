//! Paginated and Stream results for list and query methods.
//!
//! `PaginatedResponse<T>` is one page of a list, with the cursor for the next page.
//!
//! `PagedResult<T>` wraps a `PaginatedResponse<T>` with methods to
//! fetch all pages as a stream [`into_stream()`](PagedResult::into_stream),
//! or collect them into a vector, with [`collect_all()`](PagedResult::collect_all).
//!
use std::{fmt, ops::Deref, sync::Arc};

use futures::{
    StreamExt,
    stream::{BoxStream, unfold},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned, ser::Serializer};

use crate::{
    Result,
    http_client::{HttpClient, HttpRequest},
};

/// A paginated result converted to a stream of all items.
///
/// `PagedResult<T>` wraps a `PaginatedResponse<T>` and retains the information
/// needed to fetch subsequent pages. It implements `Deref` to `PaginatedResponse<T>`,
/// so you can access `.results`, `.has_more`, `.len()`, etc. directly.
///
/// # Example
///
/// ```rust,no_run
/// use notion_api::prelude::*;
/// use futures::StreamExt;
///
/// # async fn example(client: &NotionClient) -> Result<(), NotionError> {
/// let db_id = "668d797c76fa49349b05ad288df2d136";
/// // Access first page directly via Deref
/// let result = client.query_database(db_id).list().await?;
/// println!("First page: {} rows, more: {}", result.len(), result.has_more);
///
/// // Stream all rows from all pages
/// let mut stream = client.query_database(db_id).list().await?.into_stream();
/// while let Some(page) = stream.next().await {
///     let page = page?;
///     println!("Row: {}", page.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PagedResult<T> {
    response: PaginatedResponse<T>,
    refill: Option<Refill>,
}

// client and request object needed to get next PaginatedResponse
#[derive(Clone)]
struct Refill {
    client: Arc<HttpClient>,
    request: HttpRequest,
}

impl<T> PagedResult<T> {
    /// Creates a new PagedResult from a response, client, and the original request.
    pub(crate) fn new(
        response: PaginatedResponse<T>,
        client: Arc<HttpClient>,
        request: HttpRequest,
    ) -> Self {
        Self {
            response,
            refill: Some(Refill { client, request }),
        }
    }

    /// Creates a paged result from a complete list of items.
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            response: PaginatedResponse {
                results: items,
                next_cursor: None,
                has_more: false,
            },
            refill: None,
        }
    }

    /// Consumes this result and returns the underlying `PaginatedResponse<T>`.
    pub fn into_response(self) -> PaginatedResponse<T> {
        self.response
    }
}

impl<T> Deref for PagedResult<T> {
    type Target = PaginatedResponse<T>;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl<T: fmt::Debug> fmt::Debug for PagedResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedResult")
            .field("response", &self.response)
            .finish()
    }
}

// Serialize as the inner PaginatedResponse, so CLI output shows the page as received
impl<T: Serialize> Serialize for PagedResult<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.response.serialize(serializer)
    }
}

// unfold state: items remaining on current page, cursor for next page, refill, errored
type StreamState<T> = (std::vec::IntoIter<T>, Option<String>, Option<Refill>, bool);

/// cursor for the next page, if the server says there is one
fn next_cursor<T>(response: &PaginatedResponse<T>) -> Option<String> {
    if response.has_more {
        response.next_cursor.clone()
    } else {
        None
    }
}

impl<T: DeserializeOwned + Send + 'static> PagedResult<T> {
    /// Converts this paginated result into a stream of all items across all pages.
    ///
    /// The stream yields items from the first page immediately, then fetches
    /// subsequent pages with `start_cursor` as needed, while `has_more` is true.
    /// After an error the stream ends.
    pub fn into_stream(self) -> BoxStream<'static, Result<T>> {
        let cursor = next_cursor(&self.response);
        let initial: StreamState<T> = (
            self.response.results.into_iter(),
            cursor,
            self.refill,
            false,
        );

        unfold(
            initial,
            |(mut items, cursor, refill, errored)| async move {
                if errored {
                    return None;
                }
                if let Some(item) = items.next() {
                    return Some((Ok(item), (items, cursor, refill, false)));
                }

                // Current page exhausted, fetch next page if available.
                // Loop skips over (unusual) empty pages that still report has_more.
                let refill = refill?;
                let mut cursor = cursor;
                while let Some(start) = cursor.take() {
                    let next_request = match refill.request.with_cursor(&start) {
                        Ok(request) => request,
                        Err(e) => return Some((Err(e), (items, None, None, true))),
                    };
                    match refill
                        .client
                        .send::<PaginatedResponse<T>>(next_request)
                        .await
                    {
                        Ok(next_response) => {
                            cursor = next_cursor(&next_response);
                            let mut new_items = next_response.results.into_iter();
                            if let Some(item) = new_items.next() {
                                return Some((Ok(item), (new_items, cursor, Some(refill), false)));
                            }
                        }
                        Err(e) => return Some((Err(e), (items, None, None, true))),
                    }
                }
                None
            },
        )
        .boxed()
    }

    /// Collects all items from all pages into a vector.
    /// Stops on the first error encountered.
    pub async fn collect_all(self) -> Result<Vec<T>> {
        let mut stream = self.into_stream();
        let mut items = Vec::new();

        while let Some(result) = stream.next().await {
            items.push(result?);
        }

        Ok(items)
    }
}

// Implement IntoIterator for the first page only (delegates to PaginatedResponse)
impl<'a, T> IntoIterator for &'a PagedResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.response.results.iter()
    }
}

/// One page of a list response:
/// `{"object":"list","results":[..],"next_cursor":"..","has_more":true}`
#[derive(Debug, Deserialize, Serialize)]
pub struct PaginatedResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if there are no items in this page.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the items in this response (may need to get next page for all).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }
}

impl<'a, T> IntoIterator for &'a PaginatedResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
