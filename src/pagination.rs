//! Pagination state and page-button window.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::PaginationOptions;

/// Pages listed in full up to this count.
const MAX_FULL_PAGES: usize = 7;
/// Pages skipped by a jump button.
const JUMP: usize = 3;

/// One button of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "page", rename_all = "camelCase")]
pub enum PageItem {
    Page(usize),
    /// `«`: jump back by [`JUMP`] pages.
    JumpBack,
    /// `»`: jump forward by [`JUMP`] pages.
    JumpForward,
}

/// How a page change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageAction {
    Click,
    Prev,
    Next,
}

/// `{pageSize, currentPage, totalCount}` plus navigation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
    total_count: usize,
}

impl Pagination {
    pub fn new(options: PaginationOptions, dataset_len: usize) -> Self {
        let mut pagination = Self {
            page_size: options.page_size.max(1),
            current_page: options.current_page.max(1),
            total_count: options.total_count.unwrap_or(dataset_len),
        };
        pagination.current_page = pagination.current_page.min(pagination.total_pages());
        pagination
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// `ceil(total / pageSize)`, at least one page.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size).max(1)
    }

    /// Whether a pagination bar is shown at all.
    pub fn is_needed(&self) -> bool {
        self.total_pages() > 1
    }

    /// Record indices on the current page, clamped to `len`.
    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }

    /// Slice of `records` on the current page.
    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        records
            .get(self.page_range(records.len()))
            .unwrap_or_default()
    }

    /// Buttons shown for the current page.
    pub fn items(&self) -> Vec<PageItem> {
        let total = self.total_pages();
        let cur = self.current_page;
        if total <= MAX_FULL_PAGES {
            return (1..=total).map(PageItem::Page).collect();
        }

        let mut items = Vec::with_capacity(MAX_FULL_PAGES);
        if cur <= 4 {
            items.extend((1..=5).map(PageItem::Page));
            items.push(PageItem::JumpForward);
            items.push(PageItem::Page(total));
        } else if cur >= total - 3 {
            items.push(PageItem::Page(1));
            items.push(PageItem::JumpBack);
            items.extend((total - 4..=total).map(PageItem::Page));
        } else {
            items.push(PageItem::Page(1));
            items.push(PageItem::JumpBack);
            items.extend((cur - 1..=cur + 1).map(PageItem::Page));
            items.push(PageItem::JumpForward);
            items.push(PageItem::Page(total));
        }
        items
    }

    /// Target page of a button, or `None` if it would not change the page.
    pub fn target(&self, item: PageItem) -> Option<usize> {
        let target = match item {
            PageItem::Page(p) => p,
            PageItem::JumpBack => self.current_page.saturating_sub(JUMP).max(1),
            PageItem::JumpForward => (self.current_page + JUMP).min(self.total_pages()),
        };
        (target != self.current_page && (1..=self.total_pages()).contains(&target))
            .then_some(target)
    }

    /// Move to the page a button points at. Returns the new page.
    pub fn click(&mut self, item: PageItem) -> Option<usize> {
        let target = self.target(item)?;
        self.current_page = target;
        Some(target)
    }

    pub fn prev_page(&mut self) -> Option<usize> {
        if self.current_page <= 1 {
            return None;
        }
        self.current_page -= 1;
        Some(self.current_page)
    }

    pub fn next_page(&mut self) -> Option<usize> {
        if self.current_page >= self.total_pages() {
            return None;
        }
        self.current_page += 1;
        Some(self.current_page)
    }

    /// Dispatch a navigation request.
    pub fn navigate(&mut self, action: PageAction, item: PageItem) -> Option<usize> {
        match action {
            PageAction::Click => self.click(item),
            PageAction::Prev => self.prev_page(),
            PageAction::Next => self.next_page(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;
    use PageItem::{JumpBack as Back, JumpForward as Fwd, Page as P};

    fn pagination(total: usize, current: usize) -> Pagination {
        Pagination::new(
            PaginationOptions {
                page_size: 10,
                current_page: current,
                total_count: Some(total),
            },
            total,
        )
    }

    #[test_case(25, 3, 20..25 ; "last partial page")]
    #[test_case(25, 1, 0..10 ; "first page")]
    #[test_case(0, 1, 0..0 ; "empty dataset")]
    fn test_page_range(total: usize, page: usize, expected: Range<usize>) {
        assert_eq!(pagination(total, page).page_range(total), expected);
    }

    #[test]
    fn test_slice_does_not_touch_source() {
        let records: Vec<usize> = (0..25).collect();
        let p = pagination(25, 2);
        assert_eq!(p.slice(&records), &records[10..20]);
        assert_eq!(records.len(), 25);
    }

    #[test_case(50, 3, &[P(1), P(2), P(3), P(4), P(5)] ; "few pages all shown")]
    #[test_case(200, 2, &[P(1), P(2), P(3), P(4), P(5), Fwd, P(20)] ; "near start")]
    #[test_case(200, 18, &[P(1), Back, P(16), P(17), P(18), P(19), P(20)] ; "near end")]
    #[test_case(200, 10, &[P(1), Back, P(9), P(10), P(11), Fwd, P(20)] ; "middle")]
    fn test_items(total: usize, current: usize, expected: &[PageItem]) {
        assert_eq!(pagination(total, current).items(), expected);
    }

    #[test]
    fn test_jumps_are_clamped() {
        let mut p = pagination(200, 1);
        assert_eq!(p.target(Back), None);
        assert_eq!(p.click(Fwd), Some(4));
        let mut p = pagination(200, 19);
        assert_eq!(p.click(Fwd), Some(20));
        assert_eq!(p.click(Back), Some(17));
    }

    #[test]
    fn test_current_page_click_is_ignored() {
        let mut p = pagination(30, 2);
        assert_eq!(p.click(P(2)), None);
        assert_eq!(p.click(P(9)), None);
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn test_prev_next_are_bounded() {
        let mut p = pagination(30, 1);
        assert_eq!(p.prev_page(), None);
        assert_eq!(p.next_page(), Some(2));
        assert_eq!(p.next_page(), Some(3));
        assert_eq!(p.next_page(), None);
        assert!(p.is_needed());
        assert!(!pagination(10, 1).is_needed());
    }
}
