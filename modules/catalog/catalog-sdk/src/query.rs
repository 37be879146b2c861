use serde::{Deserialize, Serialize};

/// Optional, conjunctive title filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    /// Exact category slug.
    pub category: Option<String>,
    /// Exact genre slug.
    pub genre: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

/// Largest offset or page size a storage backend is asked to bind
/// (`i64::MAX`).
pub const MAX_OFFSET: u64 = u64::MAX >> 1;

/// One-based page-number request. Construct with [`PageRequest::new`] to
/// get normalised values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Normalise raw query values: missing page is `1`, missing size is
    /// `default_size`, and size is capped at `max_size`. A page whose offset
    /// would pass [`MAX_OFFSET`] is pulled back to the last page that fits;
    /// both are empty.
    #[must_use]
    pub fn new(page: Option<u64>, page_size: Option<u64>, default_size: u64, max_size: u64) -> Self {
        let page_size = page_size
            .unwrap_or(default_size)
            .clamp(1, max_size.clamp(1, MAX_OFFSET));
        let last_page = MAX_OFFSET / page_size + 1;
        Self {
            page: page.unwrap_or(1).clamp(1, last_page),
            page_size,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(MAX_OFFSET)
    }
}

/// A page of results with the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        Self {
            count,
            page: request.page,
            page_size: request.page_size,
            results,
        }
    }

    /// Transform the items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
