//! Pagination arithmetic
//!
//! Pages are 1-indexed. Page `P` of size `N` covers the half-open index range
//! `[(P-1)*N, (P-1)*N + N)` of the ordered collection.

use serde::Serialize;

use crate::error::{PressError, Result};

/// A 1-indexed page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PageNumber(usize);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// Any value below 1 becomes page 1
    pub fn new(page: usize) -> Self {
        Self(page.max(1))
    }

    /// Parse a `?page=` value the lenient way: leading digits count, anything
    /// unparsable, zero or negative means page 1
    pub fn parse(raw: &str) -> Self {
        let digits: String = raw
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().map(Self::new).unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// The slice of the ordered collection a page covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub fn for_page(page: PageNumber, per_page: usize) -> Result<Self> {
        if per_page == 0 {
            return Err(PressError::InvalidPageSize(per_page));
        }
        Ok(Self {
            offset: (page.get() - 1).saturating_mul(per_page),
            limit: per_page,
        })
    }

    /// Exclusive end index
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

/// `ceil(total / per_page)`, zero for an empty collection
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

/// One page of a collection plus what the page layer needs for navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub per_page: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: PageNumber, total_items: usize, per_page: usize) -> Self {
        Self {
            items,
            current_page: page.get(),
            total_pages: total_pages(total_items, per_page),
            total_items,
            per_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous().then(|| self.current_page - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then(|| self.current_page + 1)
    }

    /// Whether navigation controls are needed at all
    pub fn is_paginated(&self) -> bool {
        self.total_items > self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mirrors what a store does with a window over an ordered collection
    fn slice(collection: &[usize], window: Window) -> Vec<usize> {
        let start = window.offset.min(collection.len());
        let end = window.end().min(collection.len());
        collection[start..end].to_vec()
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(PageNumber::parse("3").get(), 3);
        assert_eq!(PageNumber::parse(" 2abc").get(), 2);
        assert_eq!(PageNumber::parse("0").get(), 1);
        assert_eq!(PageNumber::parse("-4").get(), 1);
        assert_eq!(PageNumber::parse("").get(), 1);
        assert_eq!(PageNumber::parse("abc").get(), 1);
        assert_eq!(PageNumber::new(0), PageNumber::FIRST);
    }

    #[test]
    fn test_window() {
        let w = Window::for_page(PageNumber::new(3), 20).unwrap();
        assert_eq!((w.offset, w.end()), (40, 60));
        assert!(matches!(
            Window::for_page(PageNumber::FIRST, 0),
            Err(PressError::InvalidPageSize(0))
        ));
        let far = Window::for_page(PageNumber::new(usize::MAX), 20).unwrap();
        assert_eq!(far.end(), usize::MAX);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_pages_cover_collection_exactly() {
        for total in 0..40usize {
            let collection: Vec<usize> = (0..total).collect();
            for per_page in 1..12usize {
                let pages = total_pages(total, per_page);
                let mut seen = Vec::new();
                for p in 1..=pages {
                    let window = Window::for_page(PageNumber::new(p), per_page).unwrap();
                    let items = slice(&collection, window);
                    assert!(!items.is_empty() && items.len() <= per_page);
                    seen.extend(items);
                }
                assert_eq!(seen, collection, "total={} per_page={}", total, per_page);

                let beyond = Window::for_page(PageNumber::new(pages + 1), per_page).unwrap();
                assert!(slice(&collection, beyond).is_empty());
            }
        }
    }

    #[test]
    fn test_navigation() {
        let page = Paginated::new(vec![1, 2], PageNumber::new(2), 45, 20);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.previous_page(), Some(1));
        assert_eq!(page.next_page(), Some(3));
        assert!(page.is_paginated());

        let last = Paginated::new(vec![1], PageNumber::new(3), 45, 20);
        assert_eq!(last.next_page(), None);

        let single = Paginated::<u8>::new(vec![], PageNumber::FIRST, 0, 20);
        assert_eq!(single.total_pages, 0);
        assert!(!single.has_previous() && !single.has_next() && !single.is_paginated());
    }
}
