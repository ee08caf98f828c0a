//! Filter specifications
//!
//! A `FilterSpec` names a field, an operator and a value without saying
//! anything about the query language that eventually evaluates it.
//! Several filters on one query always combine with AND.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "neq")]
    Neq,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "lte")]
    Lte,
    /// SQL LIKE pattern, case sensitive.
    #[serde(rename = "matches")]
    Matches,
    /// SQL LIKE pattern, case insensitive.
    #[serde(rename = "matches-ignore-case")]
    MatchesIgnoreCase,
    #[serde(rename = "in-set")]
    InSet,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 9] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Matches,
        Self::MatchesIgnoreCase,
        Self::InSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Matches => "matches",
            Self::MatchesIgnoreCase => "matches-ignore-case",
            Self::InSet => "in-set",
        }
    }

    /// Ordering comparisons (`gt`, `gte`, `lt`, `lte`).
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Matches | Self::MatchesIgnoreCase)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::query_build(format!("Unknown filter operator '{}'", s)))
    }
}

/// Value a filter compares against.
///
/// Deserialized untagged: RFC 3339 strings become timestamps, other
/// strings stay text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line literal: `null`, `true`/`false`, integers,
    /// floats, RFC 3339 timestamps, `a|b|c` lists, anything else as text.
    pub fn parse_literal(raw: &str) -> Self {
        if raw.contains('|') {
            return Self::List(raw.split('|').map(Self::parse_scalar).collect());
        }
        Self::parse_scalar(raw)
    }

    fn parse_scalar(raw: &str) -> Self {
        match raw {
            "null" => return Self::Null,
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Self::Float(f);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Self::Timestamp(ts.with_timezone(&Utc));
        }
        Self::Text(raw.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// One constraint of a list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    pub fn neq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Neq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Matches, FilterValue::Text(pattern.into()))
    }

    pub fn matches_ignore_case(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::MatchesIgnoreCase,
            FilterValue::Text(pattern.into()),
        )
    }

    pub fn in_set(field: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::InSet, values)
    }

    /// Check that the operator and value fit together.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.field.trim().is_empty() {
            return Err(QueryError::query_build("Filter field must not be empty"));
        }

        match self.operator {
            FilterOperator::InSet => {
                if !self.value.is_list() {
                    return Err(self.mismatch("a list"));
                }
            }
            op if op.is_pattern() => {
                if self.value.as_text().is_none() {
                    return Err(self.mismatch("a text pattern"));
                }
            }
            op if op.is_ordering() => {
                if matches!(self.value, FilterValue::List(_) | FilterValue::Null) {
                    return Err(self.mismatch("a scalar value"));
                }
            }
            _ => {
                if self.value.is_list() {
                    return Err(self.mismatch("a scalar value"));
                }
            }
        }
        Ok(())
    }

    /// Parse `field:operator:value`, the form used on the command line.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let mut parts = raw.splitn(3, ':');
        let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(QueryError::query_build(format!(
                "Filter '{}' is not of the form field:operator:value",
                raw
            )));
        };
        let operator: FilterOperator = op.parse()?;
        let value = if operator.is_pattern() {
            FilterValue::Text(value.to_string())
        } else {
            FilterValue::parse_literal(value)
        };
        let spec = Self::new(field, operator, value);
        spec.validate()?;
        Ok(spec)
    }

    fn mismatch(&self, expected: &str) -> QueryError {
        QueryError::query_build(format!(
            "Filter on '{}' with operator '{}' needs {}, got {:?}",
            self.field, self.operator, expected, self.value
        ))
    }
}
