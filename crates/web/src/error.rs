use thiserror::Error;

/// A malformed route pattern given at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route path must not be empty")]
    EmptyPath,

    #[error("route path must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("route path must not end with '/': {0}")]
    TrailingSlash(String),

    #[error("route path must not contain empty segment like '//': {0}")]
    EmptySegment(String),
}

/// Why a query, path or form value could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("key '{key}' not found")]
    NotFound { key: String },

    #[error("invalid form: {reason}")]
    InvalidForm { reason: String },

    #[error("invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },
}

impl ValueError {
    pub fn not_found<S: ToString>(key: S) -> Self {
        Self::NotFound { key: key.to_string() }
    }

    pub fn invalid_form<S: ToString>(reason: S) -> Self {
        Self::InvalidForm { reason: reason.to_string() }
    }

    pub fn invalid_value<V: ToString, R: ToString>(value: V, reason: R) -> Self {
        Self::InvalidValue { value: value.to_string(), reason: reason.to_string() }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure to decode the request body into a typed value.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("request body has already been consumed")]
    Consumed,

    #[error("json decode error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
