//! In-memory row store
//!
//! Keeps JSON-object rows in insertion order and evaluates filters, order
//! and range the way a SQL store would. Missing fields read as `null`.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::like::like_match;
use crate::domain::ports::QueryBackend;
use crate::domain::query::{FilterOperator, FilterSpec, FilterValue, OrderSpec};
use crate::shared::{QueryError, QueryResult, RowRange};

/// In-memory store for development and testing
pub struct InMemoryBackend {
    rows: RwLock<Vec<Value>>,
}

/// Query under construction for [`InMemoryBackend`].
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    filters: Vec<FilterSpec>,
    order: Option<OrderSpec>,
    range: Option<RowRange>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Parse a JSON array of objects.
    pub fn from_json(raw: &str) -> Result<Self, QueryError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| QueryError::query_build(format!("Invalid row data: {}", e)))?;
        match value {
            Value::Array(rows) => Ok(Self::with_rows(rows)),
            _ => Err(QueryError::query_build("Row data must be a JSON array")),
        }
    }

    pub async fn insert(&self, row: Value) {
        self.rows.write().await.push(row);
    }

    /// Remove every row for which `predicate` holds; returns how many.
    pub async fn remove_where(&self, predicate: impl Fn(&Value) -> bool) -> usize {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        before - rows.len()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryBackend for InMemoryBackend {
    type Row = Value;
    type Query = MemoryQuery;

    fn new_query(&self) -> MemoryQuery {
        MemoryQuery::default()
    }

    fn apply_filter(&self, mut query: MemoryQuery, filter: &FilterSpec) -> Result<MemoryQuery, QueryError> {
        query.filters.push(filter.clone());
        Ok(query)
    }

    fn apply_order(&self, mut query: MemoryQuery, order: &OrderSpec) -> Result<MemoryQuery, QueryError> {
        query.order = Some(order.clone());
        Ok(query)
    }

    fn apply_range(&self, mut query: MemoryQuery, range: RowRange) -> MemoryQuery {
        query.range = Some(range);
        query
    }

    async fn execute(&self, query: MemoryQuery) -> Result<QueryResult<Value>, QueryError> {
        let rows = self.rows.read().await;

        let mut matching: Vec<&Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| row_matches(row, f)))
            .collect();
        let total = matching.len() as u64;

        if let Some(order) = &query.order {
            matching.sort_by(|a, b| {
                let ord = compare_for_sort(field(a, &order.field), field(b, &order.field));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        let page: Vec<Value> = match query.range {
            Some(range) => matching
                .into_iter()
                .skip(usize::try_from(range.start).unwrap_or(usize::MAX))
                .take(usize::try_from(range.row_count()).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
            None => matching.into_iter().cloned().collect(),
        };

        Ok(QueryResult::new(page, total))
    }
}

fn field<'a>(row: &'a Value, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn row_matches(row: &Value, filter: &FilterSpec) -> bool {
    let value = field(row, &filter.field);

    match filter.operator {
        FilterOperator::Eq => equals(value, &filter.value),
        FilterOperator::Neq => match filter.value {
            FilterValue::Null => !value.is_null(),
            _ => matches!(compare(value, &filter.value), Some(o) if o != Ordering::Equal),
        },
        FilterOperator::Gt => compare(value, &filter.value) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => compare(value, &filter.value) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Matches => match (value.as_str(), filter.value.as_text()) {
            (Some(text), Some(pattern)) => like_match(text, pattern),
            _ => false,
        },
        FilterOperator::MatchesIgnoreCase => match (value.as_str(), filter.value.as_text()) {
            (Some(text), Some(pattern)) => {
                like_match(&text.to_lowercase(), &pattern.to_lowercase())
            }
            _ => false,
        },
        FilterOperator::InSet => match &filter.value {
            FilterValue::List(items) => items.iter().any(|item| equals(value, item)),
            _ => false,
        },
    }
}

fn equals(value: &Value, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::Null => value.is_null(),
        _ => compare(value, expected) == Some(Ordering::Equal),
    }
}

/// SQL-like comparison: `None` when the values are not comparable
/// (type mismatch or a null on the row side).
fn compare(value: &Value, expected: &FilterValue) -> Option<Ordering> {
    match (value, expected) {
        (Value::Number(n), FilterValue::Int(i)) => match n.as_i64() {
            Some(v) => Some(v.cmp(i)),
            None => n.as_f64()?.partial_cmp(&(*i as f64)),
        },
        (Value::Number(n), FilterValue::Float(f)) => n.as_f64()?.partial_cmp(f),
        (Value::String(s), FilterValue::Text(t)) => Some(s.as_str().cmp(t.as_str())),
        (Value::String(s), FilterValue::Timestamp(ts)) => Some(parse_timestamp(s)?.cmp(ts)),
        (Value::Bool(b), FilterValue::Bool(e)) => Some(b.cmp(e)),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Total order for sorting: numbers, then strings, then booleans, with
/// nulls (and anything else) last.
fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            Value::Bool(_) => 2,
            _ => 3,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn products() -> InMemoryBackend {
        InMemoryBackend::with_rows(vec![
            json!({"id": 1, "name": "Red Shirt", "price": 20, "status": "active", "created_at": "2024-01-05T10:00:00Z"}),
            json!({"id": 2, "name": "Blue Shirt", "price": 25.5, "status": "active", "created_at": "2024-02-01T10:00:00Z"}),
            json!({"id": 3, "name": "green hat", "price": 12, "status": "archived", "created_at": "2024-03-10T10:00:00Z"}),
            json!({"id": 4, "name": "Scarf", "price": null, "status": "draft"}),
            json!({"id": 5, "name": "Shirt Dress", "price": 40, "status": "active", "created_at": "2024-04-01T10:00:00Z"}),
        ])
    }

    async fn ids(backend: &InMemoryBackend, filters: &[FilterSpec], order: Option<OrderSpec>) -> (Vec<i64>, u64) {
        let mut query = backend.new_query();
        for f in filters {
            query = backend.apply_filter(query, f).unwrap();
        }
        if let Some(order) = order {
            query = backend.apply_order(query, &order).unwrap();
        }
        let result = backend.execute(query).await.unwrap();
        let ids = result.rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        (ids, result.exact_total_count)
    }

    #[tokio::test]
    async fn comparison_operators() {
        let b = products();
        assert_eq!(ids(&b, &[FilterSpec::eq("status", "active")], None).await.0, vec![1, 2, 5]);
        assert_eq!(ids(&b, &[FilterSpec::neq("status", "active")], None).await.0, vec![3, 4]);
        assert_eq!(ids(&b, &[FilterSpec::gt("price", 20)], None).await.0, vec![2, 5]);
        assert_eq!(ids(&b, &[FilterSpec::gte("price", 20)], None).await.0, vec![1, 2, 5]);
        assert_eq!(ids(&b, &[FilterSpec::lt("price", 25.5)], None).await.0, vec![1, 3]);
        assert_eq!(ids(&b, &[FilterSpec::lte("price", 25.5)], None).await.0, vec![1, 2, 3]);
        assert_eq!(ids(&b, &[FilterSpec::eq("price", FilterValue::Null)], None).await.0, vec![4]);
    }

    #[tokio::test]
    async fn pattern_and_set_operators() {
        let b = products();
        assert_eq!(ids(&b, &[FilterSpec::matches("name", "%Shirt%")], None).await.0, vec![1, 2, 5]);
        assert_eq!(ids(&b, &[FilterSpec::matches("name", "%hat")], None).await.0, vec![3]);
        assert_eq!(
            ids(&b, &[FilterSpec::matches_ignore_case("name", "%HAT")], None).await.0,
            vec![3]
        );
        assert_eq!(
            ids(&b, &[FilterSpec::in_set("status", vec!["draft", "archived"])], None).await.0,
            vec![3, 4]
        );
    }

    #[tokio::test]
    async fn timestamps_compare_against_rfc3339_strings() {
        let b = products();
        let cutoff: DateTime<Utc> = "2024-02-15T00:00:00Z".parse().unwrap();
        assert_eq!(ids(&b, &[FilterSpec::gt("created_at", cutoff)], None).await.0, vec![3, 5]);
    }

    #[tokio::test]
    async fn filters_combine_with_and_in_any_order() {
        let b = products();
        let a = FilterSpec::eq("status", "active");
        let p = FilterSpec::lt("price", 30);
        let forward = ids(&b, &[a.clone(), p.clone()], None).await;
        let backward = ids(&b, &[p, a], None).await;
        assert_eq!(forward, (vec![1, 2], 2));
        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn ordering_puts_nulls_last_when_ascending() {
        let b = products();
        assert_eq!(ids(&b, &[], Some(OrderSpec::asc("price"))).await.0, vec![3, 1, 2, 5, 4]);
        assert_eq!(ids(&b, &[], Some(OrderSpec::desc("price"))).await.0, vec![4, 5, 2, 1, 3]);
    }

    #[tokio::test]
    async fn range_selects_a_slice_but_count_covers_everything() {
        let b = products();
        let query = b.apply_range(
            b.apply_order(b.new_query(), &OrderSpec::asc("id")).unwrap(),
            RowRange::with_len(3, 5).unwrap(),
        );
        let result = b.execute(query).await.unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.exact_total_count, 5);
    }

    #[tokio::test]
    async fn mutations_are_visible_to_later_queries() {
        let b = products();
        b.insert(json!({"id": 6, "name": "Socks"})).await;
        assert_eq!(b.len().await, 6);
        assert_eq!(b.remove_where(|row| row["status"] == "active").await, 3);
        assert_eq!(ids(&b, &[], None).await.1, 3);
    }

    #[test]
    fn rejects_non_array_json() {
        assert!(InMemoryBackend::from_json(r#"{"id": 1}"#).is_err());
        assert!(InMemoryBackend::from_json("[").is_err());
        assert!(InMemoryBackend::from_json(r#"[{"id": 1}]"#).is_ok());
    }
}
