#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use list_pager::infrastructure::storage::MemoryQuery;
use list_pager::{
    FilterSpec, InMemoryBackend, OrderSpec, QueryBackend, QueryError, QueryResult, RowRange,
};

/// `count` product rows with ids `1..=count`; even ids are active.
pub fn product_rows(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Product {}", id),
                "price": id * 100,
                "status": if id % 2 == 0 { "active" } else { "archived" },
            })
        })
        .collect()
}

pub fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|r| r["id"].as_i64()).collect()
}

/// In-memory store that counts calls, can be told to fail, and can hold
/// a response back until the test releases it.
pub struct ScriptedBackend {
    pub rows: InMemoryBackend,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl ScriptedBackend {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: InMemoryBackend::with_rows(rows),
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            gates: Mutex::new(VecDeque::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The next executed query computes its result, then waits until the
    /// returned sender fires (or is dropped) before responding.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    type Row = Value;
    type Query = MemoryQuery;

    fn new_query(&self) -> MemoryQuery {
        self.rows.new_query()
    }

    fn apply_filter(&self, query: MemoryQuery, filter: &FilterSpec) -> Result<MemoryQuery, QueryError> {
        self.rows.apply_filter(query, filter)
    }

    fn apply_order(&self, query: MemoryQuery, order: &OrderSpec) -> Result<MemoryQuery, QueryError> {
        self.rows.apply_order(query, order)
    }

    fn apply_range(&self, query: MemoryQuery, range: RowRange) -> MemoryQuery {
        self.rows.apply_range(query, range)
    }

    async fn execute(&self, query: MemoryQuery) -> Result<QueryResult<Value>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();

        let result = if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(QueryError::transport("connection refused"))
        } else {
            self.rows.execute(query).await
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }
}
