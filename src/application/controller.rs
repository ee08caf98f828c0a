//! Pagination controller
//!
//! One controller backs one list view. It owns the view's
//! [`PaginationState`], re-fetches whenever the page, page size, filters
//! or order change, and feeds the exact count of every response back into
//! the state.
//!
//! Fetches may overlap. Each one is tagged with a request id taken from a
//! monotonically increasing counter, and only the response to the latest
//! id is applied; older responses are dropped as stale. After
//! [`PaginationController::teardown`] every completion is a no-op.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info};

use super::fetcher::RemoteQueryFetcher;
use crate::config::PaginationConfig;
use crate::domain::pagination::{PageLabel, PaginationState};
use crate::domain::ports::QueryBackend;
use crate::domain::query::{FilterSpec, OrderSpec};
use crate::shared::{ConfigError, QueryError};

/// Fetch lifecycle of a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Last fetch applied (or nothing fetched yet).
    Idle,
    Fetching,
    /// Last fetch failed; rows are cleared and the count is zero.
    Failed(QueryError),
}

impl FetchStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Point-in-time view of a controller, for rendering.
#[derive(Debug, Clone)]
pub struct PageSnapshot<R> {
    pub rows: Vec<R>,
    pub status: FetchStatus,
    pub enabled: bool,
    pub current_page: u32,
    pub items_per_page: u32,
    pub items_per_page_options: Vec<u32>,
    pub total_items: u64,
    pub total_pages: u32,
    pub start_index: u64,
    pub end_index: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub page_window: Vec<PageLabel>,
    pub filters: Vec<FilterSpec>,
    pub order: Option<OrderSpec>,
}

struct ControllerInner<R> {
    state: PaginationState,
    filters: Vec<FilterSpec>,
    order: Option<OrderSpec>,
    rows: Vec<R>,
    status: FetchStatus,
    enabled: bool,
}

/// Outstanding fetch. If the awaiting future is dropped before the
/// response lands, `Fetching` is rolled back to the status it replaced.
struct PendingFetch<'a, R> {
    inner: &'a RwLock<ControllerInner<R>>,
    latest_request: &'a AtomicU64,
    request_id: u64,
    previous_status: FetchStatus,
    settled: bool,
}

impl<R> Drop for PendingFetch<'_, R> {
    fn drop(&mut self) {
        if self.settled || self.latest_request.load(Ordering::SeqCst) != self.request_id {
            return;
        }
        if let Ok(mut inner) = self.inner.try_write() {
            if inner.status == FetchStatus::Fetching {
                debug!(request_id = self.request_id, "Fetch abandoned by caller");
                inner.status = self.previous_status.clone();
            }
        }
    }
}

pub struct PaginationController<B: QueryBackend> {
    fetcher: RemoteQueryFetcher<B>,
    items_per_page_options: Vec<u32>,
    inner: RwLock<ControllerInner<B::Row>>,
    latest_request: AtomicU64,
    torn_down: AtomicBool,
}

impl<B: QueryBackend> PaginationController<B> {
    pub fn new(fetcher: RemoteQueryFetcher<B>, config: PaginationConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let state = PaginationState::with_initial_page(config.items_per_page, config.initial_page)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            fetcher,
            items_per_page_options: config.items_per_page_options,
            inner: RwLock::new(ControllerInner {
                state,
                filters: Vec::new(),
                order: None,
                rows: Vec::new(),
                status: FetchStatus::Idle,
                enabled: config.enabled,
            }),
            latest_request: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
        })
    }

    /// Builder-style initial filters; no fetch is issued.
    pub fn with_filters(mut self, filters: Vec<FilterSpec>) -> Self {
        self.inner.get_mut().filters = filters;
        self
    }

    /// Builder-style initial order; no fetch is issued.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.inner.get_mut().order = Some(order);
        self
    }

    pub fn items_per_page_options(&self) -> &[u32] {
        &self.items_per_page_options
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> FetchStatus {
        self.inner.read().await.status.clone()
    }

    /// Copy of the paging state.
    pub async fn state(&self) -> PaginationState {
        self.inner.read().await.state.clone()
    }

    /// Fetch the current page with the current filters and order.
    ///
    /// Returns `StaleResponseDiscarded` when a newer fetch was issued while
    /// this one was in flight, and `TornDown` after teardown; neither
    /// touches the controller's state. A disabled controller issues no
    /// fetch and returns `Ok(())`.
    pub async fn refresh(&self) -> Result<(), QueryError> {
        self.ensure_live()?;
        let inner = self.inner.write().await;
        self.fetch_locked(inner).await
    }

    /// Issue a fetch for the state behind `inner`. The request id is taken
    /// before the lock is released, so a state change and the fetch that
    /// serves it supersede older responses together.
    async fn fetch_locked(
        &self,
        mut inner: RwLockWriteGuard<'_, ControllerInner<B::Row>>,
    ) -> Result<(), QueryError> {
        loop {
            self.ensure_live()?;
            if !inner.enabled {
                debug!("Controller disabled, skipping fetch");
                return Ok(());
            }

            let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            let previous_status = std::mem::replace(&mut inner.status, FetchStatus::Fetching);
            let filters = inner.filters.clone();
            let order = inner.order.clone();
            let range = inner.state.request_range();
            drop(inner);

            let mut pending = PendingFetch {
                inner: &self.inner,
                latest_request: &self.latest_request,
                request_id,
                previous_status,
                settled: false,
            };

            debug!(request_id, start = range.start, "Issuing page fetch");
            let result = self.fetcher.fetch(&filters, order.as_ref(), range).await;

            inner = self.inner.write().await;
            pending.settled = true;

            if self.is_torn_down() {
                debug!(request_id, "Dropping response after teardown");
                return Err(QueryError::TornDown);
            }

            let latest_id = self.latest_request.load(Ordering::SeqCst);
            if request_id != latest_id {
                debug!(request_id, latest_id, "Dropping stale response");
                return Err(QueryError::StaleResponseDiscarded {
                    request_id,
                    latest_id,
                });
            }

            match result {
                Ok(result) => {
                    let previous_page = inner.state.current_page();
                    if inner.state.set_total_items(result.exact_total_count) {
                        info!(
                            request_id,
                            previous_page,
                            total = result.exact_total_count,
                            "Result set shrank below current page, returning to page 1"
                        );
                        inner.status = pending.previous_status.clone();
                        continue;
                    }
                    debug!(
                        request_id,
                        page = inner.state.current_page(),
                        rows = result.rows.len(),
                        total = result.exact_total_count,
                        "Page applied"
                    );
                    inner.rows = result.rows;
                    inner.status = FetchStatus::Idle;
                    return Ok(());
                }
                Err(e) => {
                    inner.rows.clear();
                    inner.state.set_total_items(0);
                    inner.status = FetchStatus::Failed(e.clone());
                    return Err(e);
                }
            }
        }
    }

    /// Re-issue the current fetch, typically after a failure.
    pub async fn retry(&self) -> Result<(), QueryError> {
        info!("Retrying page fetch");
        self.refresh().await
    }

    /// Go to `page` and fetch it. Pages that do not exist are ignored;
    /// re-selecting the current page fetches it again.
    pub async fn go_to_page(&self, page: u32) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        if !inner.state.go_to_page(page) && inner.state.current_page() != page {
            debug!(page, "Ignoring navigation to missing page");
            return Ok(());
        }
        self.fetch_locked(inner).await
    }

    pub async fn go_to_next_page(&self) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        if !inner.state.go_to_next_page() {
            return Ok(());
        }
        self.fetch_locked(inner).await
    }

    pub async fn go_to_previous_page(&self) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        if !inner.state.go_to_previous_page() {
            return Ok(());
        }
        self.fetch_locked(inner).await
    }

    pub async fn go_to_first_page(&self) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        inner.state.go_to_first_page();
        self.fetch_locked(inner).await
    }

    pub async fn go_to_last_page(&self) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        inner.state.go_to_last_page();
        self.fetch_locked(inner).await
    }

    /// Switch to one of the configured page sizes and fetch page 1.
    pub async fn set_items_per_page(&self, items_per_page: u32) -> Result<(), QueryError> {
        self.ensure_live()?;
        if !self.items_per_page_options.contains(&items_per_page) {
            return Err(QueryError::query_build(format!(
                "Page size {} is not one of {:?}",
                items_per_page, self.items_per_page_options
            )));
        }
        let mut inner = self.inner.write().await;
        inner.state.set_items_per_page(items_per_page)?;
        self.fetch_locked(inner).await
    }

    /// Replace the filters and fetch page 1 of the new result set.
    pub async fn set_filters(&self, filters: Vec<FilterSpec>) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        inner.filters = filters;
        inner.state.go_to_first_page();
        self.fetch_locked(inner).await
    }

    /// Replace the order and fetch page 1.
    pub async fn set_order(&self, order: Option<OrderSpec>) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        inner.order = order;
        inner.state.go_to_first_page();
        self.fetch_locked(inner).await
    }

    /// Enable or disable fetching. Enabling fetches the current page.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), QueryError> {
        self.ensure_live()?;
        let mut inner = self.inner.write().await;
        let was_enabled = std::mem::replace(&mut inner.enabled, enabled);
        if enabled && !was_enabled {
            return self.fetch_locked(inner).await;
        }
        Ok(())
    }

    /// Detach the controller from its view. In-flight fetches complete as
    /// no-ops and no further fetch is issued.
    pub fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            // Supersede anything still in flight.
            self.latest_request.fetch_add(1, Ordering::SeqCst);
            info!("Pagination controller torn down");
        }
    }

    fn ensure_live(&self) -> Result<(), QueryError> {
        if self.is_torn_down() {
            return Err(QueryError::TornDown);
        }
        Ok(())
    }
}

impl<B> PaginationController<B>
where
    B: QueryBackend,
    B::Row: Clone,
{
    pub async fn snapshot(&self) -> PageSnapshot<B::Row> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        PageSnapshot {
            rows: inner.rows.clone(),
            status: inner.status.clone(),
            enabled: inner.enabled,
            current_page: state.current_page(),
            items_per_page: state.items_per_page(),
            items_per_page_options: self.items_per_page_options.clone(),
            total_items: state.total_items(),
            total_pages: state.total_pages(),
            start_index: state.start_index(),
            end_index: state.end_index(),
            has_next_page: state.has_next_page(),
            has_previous_page: state.has_previous_page(),
            page_window: state.page_window(),
            filters: inner.filters.clone(),
            order: inner.order.clone(),
        }
    }
}
