//! Application layer - fetching pages and keeping paging state in sync

pub mod controller;
pub mod fetcher;

pub use controller::{FetchStatus, PageSnapshot, PaginationController};
pub use fetcher::RemoteQueryFetcher;
