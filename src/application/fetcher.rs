//! Remote query fetcher
//!
//! Builds one bounded range query from filters, an order and a row range,
//! runs it through a [`QueryBackend`] and reports rows plus the exact
//! count. Every failure is converted into a [`QueryError`] here.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::ports::QueryBackend;
use crate::domain::query::{FilterSpec, OrderSpec};
use crate::shared::{QueryError, QueryResult, RowRange};

/// Record query latency and outcome.
fn record_query(outcome: &'static str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("list_query_latency_seconds", "outcome" => outcome).record(duration);
    metrics::counter!("list_queries_total", "outcome" => outcome).increment(1);
}

pub struct RemoteQueryFetcher<B: QueryBackend> {
    backend: Arc<B>,
}

impl<B: QueryBackend> Clone for RemoteQueryFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: QueryBackend> RemoteQueryFetcher<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Build the query without executing it.
    pub fn build(
        &self,
        filters: &[FilterSpec],
        order: Option<&OrderSpec>,
        range: RowRange,
    ) -> Result<B::Query, QueryError> {
        let mut query = self.backend.new_query();

        for filter in filters {
            filter.validate()?;
            query = self.backend.apply_filter(query, filter)?;
        }

        if let Some(order) = order {
            order.validate()?;
            query = self.backend.apply_order(query, order)?;
        }

        Ok(self.backend.apply_range(query, range))
    }

    /// Fetch the rows in `range` of the filtered, ordered collection.
    pub async fn fetch(
        &self,
        filters: &[FilterSpec],
        order: Option<&OrderSpec>,
        range: RowRange,
    ) -> Result<QueryResult<B::Row>, QueryError> {
        let start = Instant::now();

        let query = match self.build(filters, order, range) {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, filters = filters.len(), "Rejected list query");
                record_query("invalid", start);
                return Err(e);
            }
        };

        match self.backend.execute(query).await {
            Ok(result) => {
                debug!(
                    start = range.start,
                    end_inclusive = range.end_inclusive,
                    rows = result.rows.len(),
                    total = result.exact_total_count,
                    "List query completed"
                );
                record_query("ok", start);
                Ok(result)
            }
            Err(e) => {
                warn!(
                    start = range.start,
                    end_inclusive = range.end_inclusive,
                    error = %e,
                    "List query failed"
                );
                record_query("error", start);
                Err(e)
            }
        }
    }
}
