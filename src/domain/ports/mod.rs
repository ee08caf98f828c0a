//! Outbound ports
//!
//! Traits the engine consumes; implementations live in `infrastructure`.

pub mod query_backend;

pub use query_backend::QueryBackend;
