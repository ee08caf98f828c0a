//! Query specifications
//!
//! Declarative filters and ordering, decoupled from any query language.

pub mod filter;
pub mod order;

pub use filter::{FilterOperator, FilterSpec, FilterValue};
pub use order::OrderSpec;
