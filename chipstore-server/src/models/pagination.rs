//! Pagination types shared by all list endpoints

use serde::{Deserialize, Serialize};

/// Maximum items per page
const MAX_PER_PAGE: u32 = 100;

/// Default items per page (storefront grid size)
const DEFAULT_PER_PAGE: u32 = 12;

/// Pagination parameters
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of documents to skip for the current page.
    ///
    /// Widened before multiplying; `page * per_page` can exceed `u32`.
    pub fn skip(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.per_page)
    }

    /// Cursor limit for the current page.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: u64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Map the items into another type, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            (self.total + u64::from(self.per_page) - 1) / u64::from(self.per_page)
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_calculation() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.skip(), 0);

        let p = Pagination::new(2, 10);
        assert_eq!(p.skip(), 10);

        let p = Pagination::new(3, 25);
        assert_eq!(p.skip(), 50);
    }

    #[test]
    fn skip_survives_large_pages() {
        let p = Pagination::new(43_000_000, 100);
        assert_eq!(p.skip(), 4_299_999_900);
    }

    #[test]
    fn clamps_page() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn clamps_per_page() {
        let p = Pagination::new(1, 0);
        assert_eq!(p.per_page, 1);

        let p = Pagination::new(1, 999);
        assert_eq!(p.per_page, 100);
    }

    #[test]
    fn total_pages() {
        let paginated: Paginated<()> = Paginated {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(paginated.total_pages(), 1);

        let paginated: Paginated<()> = Paginated {
            items: vec![],
            total: 25,
            page: 1,
            per_page: 10,
        };
        assert_eq!(paginated.total_pages(), 3);
    }

    #[test]
    fn total_pages_handles_large_totals() {
        let paginated: Paginated<()> = Paginated {
            items: vec![],
            total: 5_000_000_000,
            page: 1,
            per_page: 100,
        };
        assert_eq!(paginated.total_pages(), 50_000_000);
    }

    #[test]
    fn map_keeps_metadata() {
        let paginated = Paginated {
            items: vec![1, 2, 3],
            total: 3,
            page: 1,
            per_page: 12,
        };
        let mapped = paginated.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.total, 3);
    }

    #[test]
    fn params_default_to_first_page() {
        let p = Pagination::from(PaginationParams::default());
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 12);
    }
}
