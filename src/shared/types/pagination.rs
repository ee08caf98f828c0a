use serde::Serialize;

/// Rows of one page together with the exact size of the filtered set.
///
/// `exact_total_count` counts every row matching the filters, not just the
/// returned page; page-count derivation depends on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T> {
    pub rows: Vec<T>,
    pub exact_total_count: u64,
}

impl<T> QueryResult<T> {
    pub fn new(rows: Vec<T>, exact_total_count: u64) -> Self {
        Self {
            rows,
            exact_total_count,
        }
    }
}

/// Inclusive row range `[start, end_inclusive]` of a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowRange {
    pub start: u64,
    pub end_inclusive: u64,
}

impl RowRange {
    /// Range covering `len` rows from `start`. `None` when `len` is zero.
    pub fn with_len(start: u64, len: u64) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            start,
            end_inclusive: start + len - 1,
        })
    }

    pub fn row_count(&self) -> u64 {
        self.end_inclusive - self.start + 1
    }

    /// Offset/limit form used by SQL backends.
    pub fn offset_limit(&self) -> (u64, u64) {
        (self.start, self.row_count())
    }
}
