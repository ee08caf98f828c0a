//! SeaORM query backend
//!
//! Translates filter/order/range specs into a `Select<E>` on one entity.
//! Field names resolve to columns by their snake_case name. The exact
//! count runs as a separate `COUNT(*)` over the filtered select, so a row
//! written between the two statements can make them disagree by one.
//!
//! `matches` is case sensitive on every backend. SQLite's `LIKE` folds
//! ASCII case, so there it is emitted as `GLOB` over the translated pattern.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use sea_orm::sea_query::{BinOper, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};
use tracing::debug;

use crate::domain::ports::QueryBackend;
use crate::domain::query::{FilterOperator, FilterSpec, FilterValue, OrderSpec};
use crate::infrastructure::storage::{escape_like, like_to_glob};
use crate::shared::{QueryError, QueryResult, RowRange};

pub struct SeaOrmBackend<E: EntityTrait> {
    db: DatabaseConnection,
    entity: PhantomData<E>,
}

/// Filtered, ordered select plus the range to cut from it.
pub struct SeaOrmQuery<E: EntityTrait> {
    select: Select<E>,
    range: Option<RowRange>,
}

impl<E: EntityTrait> SeaOrmBackend<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    fn column(&self, field: &str) -> Result<E::Column, QueryError> {
        E::Column::from_str(field).map_err(|_| {
            QueryError::query_build(format!(
                "Unknown column '{}' on table '{}'",
                field,
                E::default().table_name()
            ))
        })
    }
}

fn scalar(value: &FilterValue) -> Result<Value, QueryError> {
    Ok(match value {
        FilterValue::Bool(b) => (*b).into(),
        FilterValue::Int(i) => (*i).into(),
        FilterValue::Float(f) => (*f).into(),
        FilterValue::Text(s) => s.clone().into(),
        FilterValue::Timestamp(ts) => (*ts).into(),
        FilterValue::Null | FilterValue::List(_) => {
            return Err(QueryError::query_build(format!(
                "{:?} cannot be used as a comparison value",
                value
            )))
        }
    })
}

fn pattern(filter: &FilterSpec) -> Result<&str, QueryError> {
    filter.value.as_text().ok_or_else(|| {
        QueryError::query_build(format!("Filter on '{}' needs a text pattern", filter.field))
    })
}

fn like(pattern: &str) -> LikeExpr {
    LikeExpr::new(escape_like(pattern)).escape('\\')
}

fn case_sensitive_match<C: ColumnTrait>(
    column: C,
    pattern: &str,
    dialect: DbBackend,
) -> SimpleExpr {
    match dialect {
        DbBackend::Sqlite => SimpleExpr::Binary(
            Box::new(Expr::col(column.as_column_ref()).into()),
            BinOper::Custom("GLOB"),
            Box::new(Expr::val(like_to_glob(pattern)).into()),
        ),
        _ => column.like(like(pattern)),
    }
}

fn condition<C: ColumnTrait>(
    column: C,
    filter: &FilterSpec,
    dialect: DbBackend,
) -> Result<SimpleExpr, QueryError> {
    let value = &filter.value;
    Ok(match filter.operator {
        FilterOperator::Eq if *value == FilterValue::Null => column.is_null(),
        FilterOperator::Neq if *value == FilterValue::Null => column.is_not_null(),
        FilterOperator::Eq => column.eq(scalar(value)?),
        FilterOperator::Neq => column.ne(scalar(value)?),
        FilterOperator::Gt => column.gt(scalar(value)?),
        FilterOperator::Gte => column.gte(scalar(value)?),
        FilterOperator::Lt => column.lt(scalar(value)?),
        FilterOperator::Lte => column.lte(scalar(value)?),
        FilterOperator::Matches => case_sensitive_match(column, pattern(filter)?, dialect),
        FilterOperator::MatchesIgnoreCase => {
            let lowered = pattern(filter)?.to_lowercase();
            Expr::expr(Func::lower(Expr::col(column.as_column_ref()))).like(like(&lowered))
        }
        FilterOperator::InSet => match value {
            FilterValue::List(items) => {
                let values = items.iter().map(scalar).collect::<Result<Vec<_>, _>>()?;
                column.is_in(values)
            }
            _ => {
                return Err(QueryError::query_build(format!(
                    "Filter on '{}' with in-set needs a list",
                    filter.field
                )))
            }
        },
    })
}

#[async_trait]
impl<E> QueryBackend for SeaOrmBackend<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    type Row = E::Model;
    type Query = SeaOrmQuery<E>;

    fn new_query(&self) -> SeaOrmQuery<E> {
        SeaOrmQuery {
            select: E::find(),
            range: None,
        }
    }

    fn apply_filter(&self, query: SeaOrmQuery<E>, filter: &FilterSpec) -> Result<SeaOrmQuery<E>, QueryError> {
        let column = self.column(&filter.field)?;
        Ok(SeaOrmQuery {
            select: query
                .select
                .filter(condition(column, filter, self.db.get_database_backend())?),
            range: query.range,
        })
    }

    fn apply_order(&self, query: SeaOrmQuery<E>, order: &OrderSpec) -> Result<SeaOrmQuery<E>, QueryError> {
        let column = self.column(&order.field)?;
        let direction = if order.ascending { Order::Asc } else { Order::Desc };
        Ok(SeaOrmQuery {
            select: query.select.order_by(column, direction),
            range: query.range,
        })
    }

    fn apply_range(&self, query: SeaOrmQuery<E>, range: RowRange) -> SeaOrmQuery<E> {
        SeaOrmQuery {
            select: query.select,
            range: Some(range),
        }
    }

    async fn execute(&self, query: SeaOrmQuery<E>) -> Result<QueryResult<E::Model>, QueryError> {
        // Count total
        let total = query.select.clone().count(&self.db).await?;

        // Paginate
        let select = match query.range {
            Some(range) => {
                let (offset, limit) = range.offset_limit();
                query.select.offset(offset).limit(limit)
            }
            None => query.select,
        };
        let rows = select.all(&self.db).await?;

        debug!(
            table = E::default().table_name(),
            rows = rows.len(),
            total,
            "SeaORM list query executed"
        );

        Ok(QueryResult::new(rows, total))
    }
}
