//! Page-number pagination arithmetic.
//!
//! Pages are 1-based. Asking for page 0, a negative page, or a page past the
//! last one is a `NotFound`, except that page 1 of an empty collection is
//! always valid. A page whose offset would not fit in an `i64` is past the
//! end of any collection, so it is rejected up front.

use crate::error::CoreError;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound on the configurable page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a request for `page` (defaulting to 1).
    pub fn new(page: Option<i64>, page_size: i64) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        if page < 1 || page.checked_mul(page_size).is_none() {
            return Err(invalid_page(page));
        }
        Ok(Self { page, page_size })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Reject pages beyond the end of a collection of `total` items.
    pub fn ensure_in_range(&self, total: i64) -> Result<(), CoreError> {
        if self.page > 1 && self.offset() >= total {
            return Err(invalid_page(self.page));
        }
        Ok(())
    }

    pub fn has_next(&self, total: i64) -> bool {
        self.page * self.page_size < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

fn invalid_page(page: i64) -> CoreError {
    CoreError::not_found("Page", page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_to_first_page() {
        let req = PageRequest::new(None, 10).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn offset_follows_page() {
        let req = PageRequest::new(Some(3), 10).unwrap();
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn page_zero_is_not_found() {
        assert_matches!(PageRequest::new(Some(0), 10), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn page_with_unrepresentable_offset_is_not_found() {
        assert_matches!(
            PageRequest::new(Some(i64::MAX), 10),
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            PageRequest::new(Some(i64::MAX / 10 + 1), 10),
            Err(CoreError::NotFound { .. })
        );

        let last = PageRequest::new(Some(i64::MAX / 10), 10).unwrap();
        assert!(last.ensure_in_range(0).is_err());
        assert!(!last.has_next(i64::MAX));
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let req = PageRequest::new(Some(3), 10).unwrap();
        assert!(req.ensure_in_range(21).is_ok());
        assert!(req.ensure_in_range(20).is_err());
    }

    #[test]
    fn first_page_of_empty_collection_is_valid() {
        let req = PageRequest::new(Some(1), 10).unwrap();
        assert!(req.ensure_in_range(0).is_ok());
        assert!(!req.has_next(0));
        assert!(!req.has_previous());
    }

    #[test]
    fn next_and_previous() {
        let req = PageRequest::new(Some(2), 10).unwrap();
        assert!(req.has_previous());
        assert!(req.has_next(21));
        assert!(!req.has_next(20));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(None, 0).unwrap().page_size, 1);
        assert_eq!(PageRequest::new(None, 10_000).unwrap().page_size, MAX_PAGE_SIZE);
    }
}
