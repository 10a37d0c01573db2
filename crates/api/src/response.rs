//! Shared response envelope types for API handlers.
//!
//! List endpoints return a page-number envelope:
//!
//! ```text
//! { "count": 42, "next": "/api/v1/titles?page=3", "previous": "/api/v1/titles", "results": [...] }
//! ```
//!
//! `next` and `previous` are the request's own path and query with only the
//! `page` parameter rewritten; the link to page 1 drops `page` altogether.

use axum::http::Uri;
use serde::Serialize;
use yamdb_core::pagination::PageRequest;

/// One page of results plus navigation links.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    /// Wrap `results` (already limited to `page`) from a collection of `total` items.
    pub fn new(results: Vec<T>, total: i64, page: &PageRequest, uri: &Uri) -> Self {
        let next = page
            .has_next(total)
            .then(|| page_link(uri, Some(page.page + 1)));
        let previous = page.has_previous().then(|| {
            let target = page.page - 1;
            page_link(uri, (target > 1).then_some(target))
        });
        Self {
            count: total,
            next,
            previous,
            results,
        }
    }
}

/// `uri` with its `page` parameter replaced by `page`, or removed if `None`.
fn page_link(uri: &Uri, page: Option<i64>) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    if let Some(page) = page {
        params.push(format!("page={page}"));
    }

    if params.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), params.join("&"))
    }
}
