//! Errors returned by `NotionClient`
//!
//! Client-side failures (transport, timeout, local validation, bad json) and
//! API-reported failures share one enum. API errors carry the service's
//! machine-readable [`ApiErrorCode`].
use serde::Deserialize;
use snafu::prelude::*;

/// Error codes reported by the API in the `code` field of an error response.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ApiErrorCode {
    /// 400: request body could not be decoded as JSON
    InvalidJson,
    /// 400: request URL is not valid
    InvalidRequestUrl,
    /// 400: request is not supported
    InvalidRequest,
    /// 400: request body does not match the expected schema
    ValidationError,
    /// 400: `Notion-Version` header is missing
    MissingVersion,
    /// 401: bearer token is not valid
    Unauthorized,
    /// 403: integration does not have access to the resource
    RestrictedResource,
    /// 404: resource does not exist, or is not shared with the integration
    ObjectNotFound,
    /// 409: transaction could not be completed, potentially due to a data collision
    ConflictError,
    /// 429: request rate limit exceeded
    RateLimited,
    /// 500
    InternalServerError,
    /// 502
    BadGateway,
    /// 503
    ServiceUnavailable,
    /// 503: database is unavailable or in an unqueryable state
    DatabaseConnectionUnavailable,
    /// 504
    GatewayTimeout,
    /// A code not known to this client
    #[strum(default)]
    Unknown(String),
}

impl ApiErrorCode {
    /// Best-effort code for responses without a parseable error body.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Unauthorized,
            403 => Self::RestrictedResource,
            404 => Self::ObjectNotFound,
            409 => Self::ConflictError,
            429 => Self::RateLimited,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Error response body, e.g.
/// `{"object":"error","status":404,"code":"object_not_found","message":"..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Errors returned by notion-api crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NotionError {
    // Http connection error
    #[snafu(display("HTTP error {method} url:{url}"))]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// The request timed out, including all retry attempts.
    #[snafu(display("Request timed out: {method} {url}"))]
    RequestTimeout { method: String, url: String },

    /// Server responded with an error status.
    #[snafu(display("API error ({status} {code}) {method} {url}: {message}"))]
    Api {
        status: u16,
        code: ApiErrorCode,
        method: String,
        url: String,
        message: String,
    },

    /// Deserialization error. A server response did not match the expected shape.
    #[snafu(display("Deserialization: {source}"))]
    Deserialization { source: serde_json::Error },

    /// Serialization error. unlikely to occur. If you see this error, please report it as a bug.
    #[snafu(display("Serialization: {source}"))]
    Serialization { source: serde_json::Error },

    /// Too many requests occurred, and retries were exhausted.
    ///
    /// When the server responds with http 429, the client waits for the
    /// `Retry-After` interval and retries, up to `rate_limit_max_retries` times.
    #[snafu(display("Rate limit exceeded (retry after {} secs)", retry_after.as_secs()))]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Validation error: a parameter failed a local sanity check before sending.
    #[snafu(display("Validation error: {message}"))]
    Validation { message: String },

    /// Client configuration is incomplete, e.g., no token or parent page.
    #[snafu(display("Configuration error: {message}"))]
    Config { message: String },

    /// A tagged value carried a variant this client does not model.
    #[snafu(display("Unexpected variant '{tag}'"))]
    UnexpectedVariant { tag: String },

    /// Some other error occurred
    #[snafu(display("{message}"))]
    Other { message: String },
}

impl NotionError {
    /// Returns the API error code, if the error was reported by the server.
    pub fn api_code(&self) -> Option<&ApiErrorCode> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.api_code(), Some(ApiErrorCode::ObjectNotFound))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.api_code(),
            Some(ApiErrorCode::Unauthorized | ApiErrorCode::RestrictedResource)
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
            || matches!(self.api_code(), Some(ApiErrorCode::RateLimited))
    }

    /// True for errors that originate in this client rather than the API.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Api { .. } | Self::RateLimitExceeded { .. })
    }
}
