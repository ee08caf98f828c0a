//! Domain layer
//!
//! Paging state, page windows, query specifications and the backend port.
//! Nothing in here knows about a concrete store.

pub mod pagination;
pub mod ports;
pub mod query;

pub use pagination::{page_window, PageLabel, PaginationState};
pub use ports::QueryBackend;
pub use query::{FilterOperator, FilterSpec, FilterValue, OrderSpec};
