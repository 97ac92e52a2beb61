//! Pagination parameters and metadata arithmetic.

use thiserror::Error;

use sightline_api_types::Pagination;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageQueryError {
    #[error("page must be >= 1")]
    PageOutOfRange,
    #[error("page_size must be between 1 and {MAX_PAGE_SIZE}")]
    PageSizeOutOfRange,
    #[error("keyword must not be empty")]
    EmptyKeyword,
}

/// Validated pagination parameters. Page is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    page: u32,
    page_size: u32,
}

impl PageQuery {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, PageQueryError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(PageQueryError::PageOutOfRange);
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(PageQueryError::PageSizeOutOfRange);
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before this page starts.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// `total_pages = ceil(total / page_size)`.
    pub fn meta(&self, total: u64) -> Pagination {
        Pagination {
            total,
            page_size: self.page_size,
            current_page: self.page,
            total_pages: total.div_ceil(u64::from(self.page_size)),
        }
    }
}

/// Reject empty (or all-whitespace) search keywords before the cache is
/// touched. The keyword itself is passed through verbatim.
pub fn validate_keyword(keyword: &str) -> Result<(), PageQueryError> {
    if keyword.trim().is_empty() {
        Err(PageQueryError::EmptyKeyword)
    } else {
        Ok(())
    }
}
