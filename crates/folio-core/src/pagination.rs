//! Page arithmetic shared by in-memory slicing and store-side LIMIT/OFFSET paging.

use std::num::IntErrorKind;

use serde::Serialize;

use crate::error::DomainError;

/// Number of posts per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// What a caller asked for: a page size and the raw `?page=` value, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: i64,
    pub page: Option<String>,
}

impl PageRequest {
    pub fn new(page_size: i64, page: Option<String>) -> Self {
        Self { page_size, page }
    }

    pub fn first(page_size: i64) -> Self {
        Self::new(page_size, None)
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Interpret a raw page number. Missing, non-numeric and non-positive values
/// mean page 1; numbers too large to represent saturate (and later clamp to the
/// last page).
pub fn parse_page_number(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };
    match raw.parse::<u64>() {
        Ok(0) => 1,
        Ok(number) => number,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => 1,
    }
}

/// A resolved page: which slice of `total_count` rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_count: u64,
}

impl PageWindow {
    /// Resolve the requested page against `total_count` rows.
    ///
    /// There is always at least one page, and a page number past the end
    /// lands on the last page.
    pub fn resolve(
        total_count: u64,
        page_size: i64,
        page: Option<&str>,
    ) -> Result<Self, DomainError> {
        if page_size < 1 {
            return Err(DomainError::InvalidPageSize(page_size));
        }
        let page_size = page_size as u64;
        let total_pages = total_count.div_ceil(page_size).max(1);
        let number = parse_page_number(page).min(total_pages);

        Ok(Self {
            number,
            total_pages,
            page_size,
            total_count,
        })
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// A bounded slice of a feed plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Wrap the rows already selected for `window`.
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            page_number: window.number,
            total_pages: window.total_pages,
            total_count: window.total_count,
            page_size: window.page_size,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            page_size: self.page_size,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Slice an ordered sequence into the requested page.
pub fn paginate<T>(
    sequence: Vec<T>,
    page_size: i64,
    page_number: Option<&str>,
) -> Result<Page<T>, DomainError> {
    let window = PageWindow::resolve(sequence.len() as u64, page_size, page_number)?;
    let items = sequence
        .into_iter()
        .skip(window.offset() as usize)
        .take(window.limit() as usize)
        .collect();
    Ok(Page::new(items, window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_items_in_pages_of_ten() {
        let items: Vec<u32> = (1..=12).collect();

        let first = paginate(items.clone(), 10, Some("1")).unwrap();
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.total_pages, 2);

        let second = paginate(items, 10, Some("2")).unwrap();
        assert_eq!(second.items, vec![11, 12]);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn test_pages_reassemble_sequence() {
        let items: Vec<u32> = (0..23).collect();
        for page_size in 1..=25 {
            let first = paginate(items.clone(), page_size, None).unwrap();
            let mut collected = Vec::new();
            for number in 1..=first.total_pages {
                let page = paginate(items.clone(), page_size, Some(&number.to_string())).unwrap();
                assert!(page.items.len() as i64 <= page_size);
                collected.extend(page.items);
            }
            assert_eq!(collected, items, "page size {page_size}");
        }
    }

    #[test]
    fn test_page_past_the_end_clamps_to_last() {
        let items: Vec<u32> = (0..12).collect();
        let page = paginate(items, 5, Some("9999")).unwrap();
        assert_eq!(page.page_number, 3);
        assert_eq!(page.items, vec![10, 11]);

        let huge = paginate(vec![1, 2, 3], 5, Some("184467440737095516150")).unwrap();
        assert_eq!(huge.page_number, 1);
    }

    #[test]
    fn test_missing_or_garbage_page_defaults_to_first() {
        let items: Vec<u32> = (0..30).collect();
        for raw in [None, Some("abc"), Some(""), Some("0"), Some("-2"), Some("1.5")] {
            let page = paginate(items.clone(), 10, raw).unwrap();
            assert_eq!(page.page_number, 1, "raw page {raw:?}");
        }
        assert_eq!(paginate(items, 10, Some(" 2 ")).unwrap().page_number, 2);
    }

    #[test]
    fn test_empty_sequence_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), 10, Some("4")).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_non_positive_page_size_is_rejected() {
        assert!(matches!(
            paginate(vec![1], 0, None),
            Err(DomainError::InvalidPageSize(0))
        ));
        assert!(matches!(
            PageWindow::resolve(10, -3, None),
            Err(DomainError::InvalidPageSize(-3))
        ));
    }

    #[test]
    fn test_window_offsets() {
        let window = PageWindow::resolve(45, 10, Some("3")).unwrap();
        assert_eq!(window.offset(), 20);
        assert_eq!(window.limit(), 10);
        assert_eq!(window.total_pages, 5);
    }
}
