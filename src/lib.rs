//! # list-pager
//!
//! Pagination and remote-query engine for list views.
//!
//! ## Architecture
//!
//! - **domain**: paging state, page-window labels, filter/order specs and
//!   the `QueryBackend` port
//! - **application**: the fetcher that runs one bounded range query, and
//!   the per-view controller that keeps paging state and rows in sync
//! - **infrastructure**: SeaORM and in-memory backends
//! - **shared**: errors and result types used across layers
//!
//! ```ignore
//! let backend = Arc::new(InMemoryBackend::from_json(&rows)?);
//! let controller = PaginationController::new(
//!     RemoteQueryFetcher::new(backend),
//!     PaginationConfig::default(),
//! )?;
//! controller.set_filters(vec![FilterSpec::eq("status", "active")]).await?;
//! let page = controller.snapshot().await;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig, LoggingConfig, PaginationConfig};

pub use application::{FetchStatus, PageSnapshot, PaginationController, RemoteQueryFetcher};
pub use domain::{
    page_window, FilterOperator, FilterSpec, FilterValue, OrderSpec, PageLabel, PaginationState,
    QueryBackend,
};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryBackend, SeaOrmBackend};
pub use shared::{ConfigError, QueryError, QueryResult, RowRange};
