//! Pagination
//!
//! Paging state and the page-window labels derived from it.

pub mod state;
pub mod window;

pub use state::PaginationState;
pub use window::{page_window, PageLabel};
