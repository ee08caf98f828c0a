//! Client-held paging state
//!
//! `PaginationState` owns the current page, the page size and the last
//! known total. Everything else (page count, slice bounds, navigation
//! flags) is derived on demand, so a mutation can never leave a stale
//! derived field behind.

use serde::Serialize;

use super::window::{page_window, PageLabel};
use crate::shared::{QueryError, RowRange};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    current_page: u32,
    items_per_page: u32,
    total_items: u64,
}

impl PaginationState {
    /// Fresh state on page 1 with nothing counted yet.
    pub fn new(items_per_page: u32) -> Result<Self, QueryError> {
        Self::with_initial_page(items_per_page, 1)
    }

    /// State that starts on `initial_page`.
    ///
    /// The page cannot be checked before a count is known; the first
    /// `set_total_items` resets it to 1 if it turns out not to exist.
    pub fn with_initial_page(items_per_page: u32, initial_page: u32) -> Result<Self, QueryError> {
        check_page_size(items_per_page)?;
        if initial_page == 0 {
            return Err(QueryError::query_build("initial page must be ≥ 1"));
        }
        Ok(Self {
            current_page: initial_page,
            items_per_page,
            total_items: 0,
        })
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// `ceil(total_items / items_per_page)`, 0 for an empty set.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.items_per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Index of the first row of the current page (0 for an empty set).
    pub fn start_index(&self) -> u64 {
        if self.total_items == 0 {
            return 0;
        }
        self.page_offset()
    }

    /// Exclusive end of the current page, never past `total_items`.
    pub fn end_index(&self) -> u64 {
        if self.total_items == 0 {
            return 0;
        }
        (self.page_offset() + u64::from(self.items_per_page)).min(self.total_items)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Rows of the current page that exist, as an inclusive range.
    pub fn range(&self) -> Option<RowRange> {
        let start = self.start_index();
        RowRange::with_len(start, self.end_index().saturating_sub(start))
    }

    /// Full page slot sent to the store.
    ///
    /// Not capped by `total_items`: the store returns the rows that exist,
    /// and the page is addressable before the first count arrives.
    pub fn request_range(&self) -> RowRange {
        RowRange {
            start: self.page_offset(),
            end_inclusive: self.page_offset() + u64::from(self.items_per_page) - 1,
        }
    }

    pub fn page_window(&self) -> Vec<PageLabel> {
        page_window(self.current_page, self.total_pages())
    }

    /// Jump to page `page` if it exists; silently ignored otherwise.
    ///
    /// Returns whether the state is now on `page`.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Returns whether the page moved.
    pub fn go_to_next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Returns whether the page moved.
    pub fn go_to_previous_page(&mut self) -> bool {
        if !self.has_previous_page() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    pub fn go_to_first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn go_to_last_page(&mut self) {
        self.current_page = self.total_pages().max(1);
    }

    /// Change the page size. Always returns to page 1, since the old
    /// offset means nothing under a different page size.
    pub fn set_items_per_page(&mut self, items_per_page: u32) -> Result<(), QueryError> {
        check_page_size(items_per_page)?;
        self.items_per_page = items_per_page;
        self.current_page = 1;
        Ok(())
    }

    /// Record a new exact count, clamping the page back to 1 when it no
    /// longer exists. Returns whether the page was clamped.
    pub fn set_total_items(&mut self, total_items: u64) -> bool {
        self.total_items = total_items;
        if self.current_page > self.total_pages().max(1) {
            self.current_page = 1;
            return true;
        }
        false
    }

    fn page_offset(&self) -> u64 {
        u64::from(self.current_page - 1) * u64::from(self.items_per_page)
    }
}

fn check_page_size(items_per_page: u32) -> Result<(), QueryError> {
    if items_per_page == 0 {
        return Err(QueryError::query_build("items per page must be ≥ 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(items_per_page: u32, total: u64) -> PaginationState {
        let mut state = PaginationState::new(items_per_page).unwrap();
        state.set_total_items(total);
        state
    }

    #[test]
    fn derives_page_count_and_last_page_bounds() {
        let mut s = state(25, 237);
        assert_eq!(s.total_pages(), 10);

        assert!(s.go_to_page(10));
        assert_eq!(s.start_index(), 225);
        assert_eq!(s.end_index(), 237);
        assert_eq!(
            s.range(),
            Some(RowRange {
                start: 225,
                end_inclusive: 236
            })
        );
        assert!(!s.has_next_page());
        assert!(s.has_previous_page());
    }

    #[test]
    fn empty_set_has_no_pages() {
        let s = state(25, 0);
        assert_eq!(s.total_pages(), 0);
        assert_eq!(s.start_index(), 0);
        assert_eq!(s.end_index(), 0);
        assert_eq!(s.range(), None);
        assert!(!s.has_next_page());
        assert!(!s.has_previous_page());
        assert_eq!(
            s.request_range(),
            RowRange {
                start: 0,
                end_inclusive: 24
            }
        );
    }

    #[test]
    fn go_to_page_ignores_out_of_range() {
        let mut s = state(10, 45);
        assert!(!s.go_to_page(0));
        assert!(!s.go_to_page(6));
        assert_eq!(s.current_page(), 1);

        assert!(s.go_to_page(3));
        let after_first = s.clone();
        assert!(s.go_to_page(3));
        assert_eq!(s, after_first);
    }

    #[test]
    fn next_and_previous_stop_at_the_edges() {
        let mut s = state(10, 25);
        assert!(!s.go_to_previous_page());
        assert!(s.go_to_next_page());
        assert!(s.go_to_next_page());
        assert!(!s.go_to_next_page());
        assert_eq!(s.current_page(), 3);
        assert!(s.go_to_previous_page());
        assert_eq!(s.current_page(), 2);
    }

    #[test]
    fn first_and_last_are_unconditional() {
        let mut s = state(10, 95);
        s.go_to_last_page();
        assert_eq!(s.current_page(), 10);
        s.go_to_last_page();
        assert_eq!(s.current_page(), 10);
        s.go_to_first_page();
        assert_eq!(s.current_page(), 1);

        let mut empty = state(10, 0);
        empty.go_to_last_page();
        assert_eq!(empty.current_page(), 1);
    }

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut s = state(10, 100);
        s.go_to_page(4);
        s.set_items_per_page(25).unwrap();
        assert_eq!(s.current_page(), 1);
        assert_eq!(s.total_pages(), 4);

        assert!(s.set_items_per_page(0).unwrap_err().is_configuration_bug());
        assert_eq!(s.items_per_page(), 25);
    }

    #[test]
    fn shrinking_count_clamps_to_first_page() {
        let mut s = state(25, 100);
        s.go_to_page(4);
        assert!(s.set_total_items(40));
        assert_eq!(s.total_pages(), 2);
        assert_eq!(s.current_page(), 1);

        // Same count again does not move anything.
        assert!(!s.set_total_items(40));
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn shrinking_count_keeps_a_page_that_still_exists() {
        let mut s = state(25, 100);
        s.go_to_page(2);
        assert!(!s.set_total_items(40));
        assert_eq!(s.current_page(), 2);
    }

    #[test]
    fn initial_page_is_checked_once_counted() {
        let mut s = PaginationState::with_initial_page(10, 3).unwrap();
        assert_eq!(s.request_range().start, 20);
        assert!(!s.set_total_items(50));
        assert_eq!(s.current_page(), 3);

        let mut gone = PaginationState::with_initial_page(10, 7).unwrap();
        assert!(gone.set_total_items(50));
        assert_eq!(gone.current_page(), 1);

        assert!(PaginationState::with_initial_page(10, 0).is_err());
        assert!(PaginationState::new(0).is_err());
    }
}
