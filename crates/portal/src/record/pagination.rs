//! Page windows over filtered collections.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A requested page: 1-based page number and page size, both non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: NonZeroUsize,
    page_size: NonZeroUsize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Result<Self, StoreError> {
        match (NonZeroUsize::new(page), NonZeroUsize::new(page_size)) {
            (Some(page), Some(page_size)) => Ok(Self { page, page_size }),
            _ => Err(StoreError::InvalidPageRequest { page, page_size }),
        }
    }

    /// Page 1 at the given size.
    pub fn first(page_size: NonZeroUsize) -> Self {
        Self {
            page: NonZeroUsize::MIN,
            page_size,
        }
    }

    pub fn page(&self) -> usize {
        self.page.get()
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Index range of this page within a collection of `total` items.
    fn window(&self, total: usize) -> std::ops::Range<usize> {
        let start = (self.page() - 1).saturating_mul(self.page_size()).min(total);
        let end = start.saturating_add(self.page_size()).min(total);
        start..end
    }
}

/// Pagination descriptor returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub page_size: usize,
}

impl Pagination {
    /// Describes `total_records` split into pages of `request.page_size()`.
    /// An empty collection still reports one page.
    pub fn describe(request: &PageRequest, total_records: usize) -> Self {
        Self {
            current_page: request.page(),
            total_pages: total_records.div_ceil(request.page_size()).max(1),
            total_records,
            page_size: request.page_size(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of records plus its descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub pagination: Pagination,
}

/// Slices `items` to the requested page. A page past the end yields an
/// empty slice; the page number is not clamped.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> Page<T> {
    let pagination = Pagination::describe(request, items.len());
    let window = request.window(items.len());
    let records = items
        .into_iter()
        .skip(window.start)
        .take(window.len())
        .collect();
    Page {
        records,
        pagination,
    }
}
