//! Fixed-size page arithmetic.

use serde::Serialize;

/// Items per page for every feed.
pub const PAGE_SIZE: u64 = 10;

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    /// Total items across all pages.
    pub count: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves a requested page against a total count.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
    count: u64,
}

impl Paginator {
    pub fn new(count: u64) -> Self {
        Self::with_page_size(count, PAGE_SIZE)
    }

    pub fn with_page_size(count: u64, per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
            count,
        }
    }

    /// An empty listing still has one page.
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Lenient lookup: missing or non-numeric input is page 1, anything out of
    /// range is the last page.
    pub fn resolve(&self, requested: Option<&str>) -> u64 {
        let last = self.num_pages();
        let Some(raw) = requested.map(str::trim) else {
            return 1;
        };
        match raw.parse::<i64>() {
            Ok(n) if n >= 1 && (n as u64) <= last => n as u64,
            Ok(_) => last,
            // Too large for i64 but still a number.
            Err(_) if is_integer(raw) => last,
            Err(_) => 1,
        }
    }

    /// Row offset and limit for a resolved page number.
    pub fn window(&self, number: u64) -> (u64, u64) {
        ((number - 1) * self.per_page, self.per_page)
    }

    pub fn page<T>(&self, number: u64, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_items_split_ten_three() {
        let p = Paginator::new(13);
        assert_eq!(p.num_pages(), 2);
        assert_eq!(p.window(1), (0, 10));
        assert_eq!(p.window(2), (10, 10));
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let p = Paginator::new(0);
        assert_eq!(p.num_pages(), 1);
        assert_eq!(p.resolve(Some("3")), 1);
    }

    #[test]
    fn test_resolve_is_lenient() {
        let p = Paginator::new(25);
        assert_eq!(p.resolve(None), 1);
        assert_eq!(p.resolve(Some("abc")), 1);
        assert_eq!(p.resolve(Some("2")), 2);
        assert_eq!(p.resolve(Some("99")), 3);
        assert_eq!(p.resolve(Some("0")), 3);
        assert_eq!(p.resolve(Some("-4")), 3);
        assert_eq!(p.resolve(Some("99999999999999999999")), 3);
        assert_eq!(p.resolve(Some("-99999999999999999999")), 3);
        assert_eq!(p.resolve(Some("1.5")), 1);
        assert_eq!(p.resolve(Some("-")), 1);
    }

    #[test]
    fn test_page_flags() {
        let p = Paginator::new(13);
        let first = p.page(1, vec![0; 10]);
        assert!(first.has_next());
        assert!(!first.has_previous());
        let second = p.page(2, vec![0; 3]);
        assert!(!second.has_next());
        assert!(second.has_previous());
    }
}
