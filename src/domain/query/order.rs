use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::QueryError;

/// Sort order of a list query. One order is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl OrderSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.field.trim().is_empty() {
            return Err(QueryError::query_build("Order field must not be empty"));
        }
        Ok(())
    }

    /// Parse `field`, `field:asc` or `field:desc`.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let spec = match raw.split_once(':') {
            None => Self::asc(raw),
            Some((field, "asc")) => Self::asc(field),
            Some((field, "desc")) => Self::desc(field),
            Some((_, dir)) => {
                return Err(QueryError::query_build(format!(
                    "Unknown sort direction '{}', expected asc or desc",
                    dir
                )))
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}:{}", self.field, dir)
    }
}
