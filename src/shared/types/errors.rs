use thiserror::Error;

/// Errors produced while building or executing a list query.
///
/// Every failure of a remote round trip is converted into one of these at
/// the fetcher boundary; nothing escapes to the controller as a panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Invalid filter, order, range or page size. A configuration bug on
    /// the caller's side, never retried.
    #[error("Invalid query: {0}")]
    QueryBuild(String),

    /// The remote round trip failed (network, auth, server).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response arrived for a request that has since been superseded.
    #[error("Response for request {request_id} discarded, latest is {latest_id}")]
    StaleResponseDiscarded { request_id: u64, latest_id: u64 },

    /// The owning controller was torn down while the request was in flight.
    #[error("Controller torn down")]
    TornDown,
}

impl QueryError {
    pub fn query_build(message: impl Into<String>) -> Self {
        Self::QueryBuild(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether the error points at a bad filter/order/page-size spec.
    pub fn is_configuration_bug(&self) -> bool {
        matches!(self, Self::QueryBuild(_))
    }

    /// Whether re-issuing the same request may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Internal signals that must not be shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::StaleResponseDiscarded { .. } | Self::TornDown)
    }
}

impl From<sea_orm::DbErr> for QueryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Transport(format!("Database error: {}", err))
    }
}

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{:?}", e.code));
                    format!("{}: {}", field, msg)
                })
            })
            .collect();

        if field_errors.is_empty() {
            Self::Invalid("Validation failed".to_string())
        } else {
            Self::Invalid(field_errors.join("; "))
        }
    }
}
