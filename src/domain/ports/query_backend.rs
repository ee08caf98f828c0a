use async_trait::async_trait;

use crate::domain::query::{FilterSpec, OrderSpec};
use crate::shared::{QueryError, QueryResult, RowRange};

/// Abstract remote-query protocol of a row-oriented store.
///
/// A query is built step by step (filters, then order, then range) and
/// executed once. `execute` returns the selected rows together with the
/// exact number of rows matching the filters, ignoring the range.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    type Row: Send;
    type Query: Send;

    /// Unfiltered query over the whole collection.
    fn new_query(&self) -> Self::Query;

    fn apply_filter(&self, query: Self::Query, filter: &FilterSpec)
        -> Result<Self::Query, QueryError>;

    fn apply_order(&self, query: Self::Query, order: &OrderSpec) -> Result<Self::Query, QueryError>;

    fn apply_range(&self, query: Self::Query, range: RowRange) -> Self::Query;

    async fn execute(&self, query: Self::Query) -> Result<QueryResult<Self::Row>, QueryError>;
}
