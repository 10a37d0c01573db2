//! Shared query parameter types for API handlers.

use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::PageRequest;

/// Page-number pagination parameter (`?page=`).
///
/// Kept as a raw string so a non-numeric page is a 404 (like any other
/// page that does not exist) rather than a query-parse 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    /// Validate the requested page against the configured page size.
    pub fn page_request(&self, page_size: i64) -> Result<PageRequest, CoreError> {
        let page = match self.page.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| CoreError::not_found("Page", raw))?,
            ),
        };
        PageRequest::new(page, page_size)
    }
}
