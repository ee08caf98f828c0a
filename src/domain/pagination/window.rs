//! Page window
//!
//! Turns `(current_page, total_pages)` into the compressed list of page
//! labels shown under a list view: always the first and last page, a
//! three-page window around the current page, and ellipsis markers for
//! the gaps. Never more than 7 labels.

use std::fmt;

use serde::Serialize;

/// Up to this many pages are listed without compression.
const MAX_UNCOMPRESSED_PAGES: u32 = 5;

/// One label of a page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLabel {
    Page(u32),
    Ellipsis,
}

impl PageLabel {
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Page(n) => Some(*n),
            Self::Ellipsis => None,
        }
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{}", n),
            Self::Ellipsis => write!(f, "…"),
        }
    }
}

/// Compute the page labels for `current_page` out of `total_pages`.
///
/// A `current_page` outside `[1, total_pages]` is clamped into it first.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<PageLabel> {
    if total_pages <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total_pages).map(PageLabel::Page).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let last = total_pages;

    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(last - 1);

    if current <= 3 {
        end = 4;
    }
    if current >= last - 2 {
        start = last - 3;
    }

    let mut labels = Vec::with_capacity(7);
    labels.push(PageLabel::Page(1));

    if start > 2 {
        labels.push(PageLabel::Ellipsis);
    }

    labels.extend(
        (start..=end)
            .filter(|&page| page > 1 && page < last)
            .map(PageLabel::Page),
    );

    if end < last - 1 {
        labels.push(PageLabel::Ellipsis);
    }

    labels.push(PageLabel::Page(last));
    labels
}
