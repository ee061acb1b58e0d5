//! HttpClient middleware used by NotionClient
//!
//! Responsible for
//!  - handing all HTTP api requests
//!  - logging/tracing
//!  - retries and backoff (for timeouts and connection errors)
//!  - rate limiting
//!  - mapping error responses into `NotionError::Api`

use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use bytes::Bytes;
use parking_lot::Mutex;
use rand::Rng;
use reqwest::{ClientBuilder, Method, StatusCode, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use snafu::prelude::*;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Result,
    config::{
        MAX_RETRIES, NOTION_VERSION_HEADER, RATE_LIMIT_WAIT_MAX_SECS, RATE_LIMIT_WAIT_WARN_SECS,
    },
    error::ApiErrorBody,
    paged::{PagedResult, PaginatedResponse},
    prelude::*,
};

/// Target for request and response body tracing
const HTTP_JSON_TARGET: &str = "notion::http_json";

/// Cumulative request counters, shared by every clone of a client.
#[derive(Debug, Default)]
pub struct HttpMetrics {
    requests: AtomicU64,
    ok: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
    throttled: AtomicU64,
    throttle_wait_secs: AtomicU64,
    bytes_out: AtomicU64,
    bytes_in: AtomicU64,
}

fn bump(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl HttpMetrics {
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        let read = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        HttpMetricsSnapshot {
            requests: read(&self.requests),
            ok: read(&self.ok),
            failed: read(&self.failed),
            retries: read(&self.retries),
            throttled: read(&self.throttled),
            throttle_wait_secs: read(&self.throttle_wait_secs),
            bytes_out: read(&self.bytes_out),
            bytes_in: read(&self.bytes_in),
        }
    }

    fn sent(&self, body_len: u64) {
        bump(&self.requests, 1);
        bump(&self.bytes_out, body_len);
    }

    fn received(&self, body_len: u64) {
        bump(&self.ok, 1);
        bump(&self.bytes_in, body_len);
    }

    fn failed(&self) {
        bump(&self.failed, 1);
    }

    fn retried(&self) {
        bump(&self.retries, 1);
    }

    fn throttled(&self, wait_secs: u64) {
        bump(&self.throttled, 1);
        bump(&self.throttle_wait_secs, wait_secs);
    }
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    /// requests sent, retries included
    pub requests: u64,
    /// 2xx responses
    pub ok: u64,
    /// failed requests: error statuses other than 429, and transport errors
    pub failed: u64,
    pub retries: u64,
    /// 429 responses
    pub throttled: u64,
    /// seconds spent waiting on `Retry-After`
    pub throttle_wait_secs: u64,
    pub bytes_out: u64,
    pub bytes_in: u64,
}

impl fmt::Display for HttpMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} ok={} failed={} retries={} throttled={} (waited {}s) out={} in={}",
            self.requests,
            self.ok,
            self.failed,
            self.retries,
            self.throttled,
            self.throttle_wait_secs,
            human_bytes(self.bytes_out),
            human_bytes(self.bytes_in),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn human_bytes(n: u64) -> String {
    const KIB: f64 = 1024.0;
    match n {
        0..1024 => format!("{n}B"),
        1024..1_048_576 => format!("{:.1}KiB", n as f64 / KIB),
        _ => format!("{:.1}MiB", n as f64 / (KIB * KIB)),
    }
}

/// status codes where it's ok to retry and backoff (429 is handled separately)
fn retry_for_status(code: StatusCode) -> bool {
    matches!(
        code,
        StatusCode::REQUEST_TIMEOUT /* 408 */
            | StatusCode::BAD_GATEWAY /* 502 */
            | StatusCode::SERVICE_UNAVAILABLE /* 503 */
            | StatusCode::GATEWAY_TIMEOUT /* 504 */
    )
}

#[derive(Clone, Default)]
pub(crate) struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body.as_ref().map_or(0, Bytes::len))
            .finish()
    }
}

impl HttpRequest {
    /// Create a new request that resumes a database query at `cursor`.
    /// The cursor goes in the json body as `start_cursor`; other body fields are kept.
    pub(crate) fn with_cursor(&self, cursor: &str) -> Result<Self> {
        let mut body: serde_json::Map<String, serde_json::Value> = match &self.body {
            Some(bytes) if !bytes.is_empty() => {
                serde_json::from_slice(bytes).context(DeserializationSnafu)?
            }
            _ => serde_json::Map::new(),
        };
        body.insert(
            "start_cursor".to_string(),
            serde_json::Value::String(cursor.to_string()),
        );
        let mut next = self.clone();
        next.body = Some(Bytes::from(
            serde_json::to_vec(&body).context(SerializationSnafu)?,
        ));
        Ok(next)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    pub client: reqwest::Client,

    /// Base URL for API requests (e.g., "https://api.notion.com")
    pub base_url: String,

    /// Value of the `Notion-Version` header
    pub notion_version: String,

    pub token: Arc<Mutex<Option<SecretToken>>>,

    limits: ValidationLimits,

    // Max consecutive 429 retries before failing; 0 disables cap.
    rate_limit_max_retries: u32,

    /// HTTP request/response metrics
    pub metrics: Arc<HttpMetrics>,
}

/// Parse the `Retry-After` header from a 429 response.
/// The API sends an integer number of seconds. A missing or unparseable
/// header falls back to one second.
fn parse_retry_after(headers: &HeaderMap) -> Duration {
    if let Some(value) = headers.get(reqwest::header::RETRY_AFTER) {
        match value.to_str().map(|s| s.trim().parse::<u64>()) {
            Ok(Ok(secs)) => return Duration::from_secs(secs),
            _ => error!(header=?value, "Could not parse 429 Retry-After header"),
        }
    }
    Duration::from_secs(1)
}

/// Build an `Api` error from a non-success response body.
/// Bodies that aren't in the documented error shape are reported verbatim,
/// with a code derived from the status.
fn api_error(status: StatusCode, method: &Method, path: &str, body: &str) -> NotionError {
    let (code, message) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            if parsed.status != status.as_u16() {
                debug!(
                    http_status = status.as_u16(),
                    body_status = parsed.status,
                    "error body status mismatch"
                );
            }
            (
                ApiErrorCode::from_str(&parsed.code)
                    .unwrap_or_else(|_| ApiErrorCode::Unknown(parsed.code.clone())),
                parsed.message,
            )
        }
        Err(_) => (ApiErrorCode::from_status(status.as_u16()), body.to_string()),
    };
    NotionError::Api {
        status: status.as_u16(),
        code,
        method: method.to_string(),
        url: path.to_string(),
        message,
    }
}

impl HttpClient {
    pub fn new(
        builder: ClientBuilder,
        base_url: String,
        notion_version: String,
        limits: ValidationLimits,
        rate_limit_max_retries: u32,
    ) -> Result<Self> {
        let client = builder.build().context(HttpSnafu {
            method: "client-init",
            url: "",
        })?;
        Ok(HttpClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            notion_version,
            token: Arc::new(Mutex::new(None)),
            limits,
            rate_limit_max_retries,
            metrics: Arc::new(HttpMetrics::default()),
        })
    }

    /// Returns a snapshot of current HTTP metrics
    pub fn metrics_snapshot(&self) -> HttpMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns true if a token has been set.
    pub fn has_token(&self) -> bool {
        self.token.lock().is_some()
    }

    /// Sets the integration token for authenticated requests.
    pub fn set_token(&self, token: SecretToken) {
        *self.token.lock() = Some(token);
    }

    /// Clears the token if set.
    pub fn clear_token(&self) {
        *self.token.lock() = None;
    }

    pub(crate) async fn get_request<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let req = HttpRequest {
            method: Method::GET,
            path: path.into(),
            query,
            body: None,
        };
        self.send(req).await
    }

    /// Makes an authenticated PATCH request with JSON body.
    pub(crate) async fn patch_request<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = HttpRequest {
            method: Method::PATCH,
            path: path.into(),
            query: Vec::new(),
            body: Some(Bytes::from(
                serde_json::to_vec(body).context(SerializationSnafu)?,
            )),
        };
        self.send(req).await
    }

    pub(crate) async fn post_request<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = HttpRequest {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(Bytes::from(
                serde_json::to_vec(body).context(SerializationSnafu)?,
            )),
        };
        self.send(req).await
    }

    /// This function handles all rest api requests (http: get,post,patch)
    /// - handles 429 rate limit feedback
    /// - retries up to N(=3) times for connection failures or server timeout
    /// - maps error responses into `NotionError::Api`
    /// - deserializes json response body into return type T
    pub(crate) async fn send<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T> {
        // attempt counter is for server busy and connection drop errors
        // counter is reset to 0 whenever we wait based on 429 rate limit response
        let mut attempt = 0u32;
        let mut rate_limit_retries = 0u32;

        // time to wait on next iteration
        let mut retry_wait: Option<Duration> = None;

        self.limits.validate_query(&req.query)?;
        if let Some(ref body) = req.body {
            self.limits
                .validate_body(body, &format!("http {} {}", &req.method, &req.path))?;
        }

        let token = self.token.lock().clone().context(ConfigSnafu {
            message: "integration token not set. Set NOTION_TOKEN or call set_token()",
        })?;
        let full_url = format!("{}{}", self.base_url, req.path);
        let mut req_builder = self
            .client
            .request(req.method.clone(), &full_url)
            .query(&req.query)
            .header(NOTION_VERSION_HEADER, &self.notion_version);
        if req.body.is_some() {
            req_builder = req_builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        }
        let req_builder = token.set_auth_header(req_builder);

        debug!(method = %req.method, path = %req.path, "request");
        log_request(&req_builder, req.body.as_ref());

        let body_size = req.body.as_ref().map_or(0, |b| b.len() as u64);

        loop {
            if let Some(wait_time) = retry_wait.take() {
                info!("RateLimit: pausing for {} sec", wait_time.as_secs());
                tokio::time::sleep(wait_time).await;
                attempt = 0;
            }
            let request = req_builder
                .try_clone()
                .context(OtherSnafu {
                    message: "reqwest::RequestBuilder internal error",
                })?
                .body(req.body.clone().unwrap_or_default());

            self.metrics.sent(body_size);

            match request.send().await {
                Ok(response) => {
                    let code = response.status();
                    if code != StatusCode::TOO_MANY_REQUESTS {
                        rate_limit_retries = 0;
                    }
                    if code.is_success() {
                        // If we fail to fully read the response, don't retry. The server might
                        // believe the request succeeded, and the request may not be idempotent.
                        let body = response.bytes().await.context(HttpSnafu {
                            method: req.method.to_string(),
                            url: req.path.clone(),
                        })?;
                        self.metrics.received(body.len() as u64);
                        log_response(&req.path, &body);

                        // deserialization failure should not be retried
                        return deserialize_json(&body);
                    }
                    if code == StatusCode::TOO_MANY_REQUESTS {
                        rate_limit_retries = rate_limit_retries.saturating_add(1);
                        let retry_after = parse_retry_after(response.headers());
                        if self.rate_limit_max_retries > 0
                            && rate_limit_retries > self.rate_limit_max_retries
                        {
                            error!(
                                ?req,
                                "http 429 Rate-limit retries exceeded max={}",
                                self.rate_limit_max_retries
                            );
                            return RateLimitExceededSnafu { retry_after }.fail();
                        }
                        if retry_after > Duration::from_secs(RATE_LIMIT_WAIT_MAX_SECS) {
                            error!(
                                ?req,
                                "http 429 Rate-limit backoff={}s exceeds max",
                                retry_after.as_secs()
                            );
                            return RateLimitExceededSnafu { retry_after }.fail();
                        }
                        if retry_after > Duration::from_secs(RATE_LIMIT_WAIT_WARN_SECS) {
                            warn!("http 429 Rate-limit backoff={}s", retry_after.as_secs());
                        }
                        self.metrics.retried();
                        self.metrics.throttled(retry_after.as_secs());
                        retry_wait = Some(retry_after);
                        continue;
                    }

                    self.metrics.failed();
                    let message = response.text().await.unwrap_or_default();
                    if attempt < MAX_RETRIES
                        && retry_for_status(code)
                        && is_idempotent_method(&req.method)
                    {
                        log_and_backoff(attempt, code.to_string()).await;
                        self.metrics.retried();
                        attempt += 1;
                        continue;
                    }
                    let err = api_error(code, &req.method, &req.path, &message);
                    error!(?code, ?req, "{err}");
                    return Err(err);
                }
                Err(e) => {
                    error!(source=?e, ?req, "http");
                    if (e.is_connect() || e.is_timeout()) && is_idempotent_method(&req.method) {
                        rate_limit_retries = 0;
                        if attempt < MAX_RETRIES {
                            log_and_backoff(attempt, e.to_string()).await;
                            self.metrics.retried();
                            attempt += 1;
                            continue;
                        }
                    }
                    self.metrics.failed();
                    if e.is_timeout() {
                        return RequestTimeoutSnafu {
                            method: req.method.to_string(),
                            url: req.path,
                        }
                        .fail();
                    }
                    // Other non-recoverable errors (e.g., DNS error, invalid URL, etc.)
                    return Err(NotionError::Http {
                        method: req.method.to_string(),
                        url: req.path,
                        source: e,
                    });
                }
            }
        }
    }
}

// The purpose of this trait is to define methods for Arc<HttpClient>
pub(crate) trait QueryPaged {
    async fn post_request_paged<T: DeserializeOwned + Send + 'static, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<PagedResult<T>>;
}

impl QueryPaged for Arc<HttpClient> {
    /// Makes an authenticated POST request that returns a PagedResult for pagination support.
    async fn post_request_paged<T: DeserializeOwned + Send + 'static, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<PagedResult<T>> {
        let req = HttpRequest {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(Bytes::from(
                serde_json::to_vec(body).context(SerializationSnafu)?,
            )),
        };
        let response: PaginatedResponse<T> = self.send(req.clone()).await?;
        Ok(PagedResult::new(response, self.clone(), req))
    }
}

// dump request
// requires RUST_LOG=notion::http_json=trace
fn log_request(builder: &reqwest::RequestBuilder, body: Option<&Bytes>) {
    if tracing::enabled!(target: HTTP_JSON_TARGET, tracing::Level::TRACE)
        && let Some(req) = builder.try_clone().and_then(|b| b.build().ok())
    {
        let method = req.method().as_str();
        let url = req.url();
        let body = body
            .map(|b| String::from_utf8_lossy(b).to_string())
            .unwrap_or_default();
        // don't log headers so we don't leak the token
        trace!(target: HTTP_JSON_TARGET, "{method} url={url} body={body}");
    }
}

// dump json response, for debugging
fn log_response(path: &str, body: &Bytes) {
    if tracing::enabled!(target: HTTP_JSON_TARGET, tracing::Level::TRACE) {
        trace!(target: HTTP_JSON_TARGET, "Response path={path} body={}",
            String::from_utf8_lossy(body)
        );
    }
}

// deserialize, reporting errors with 'serde_path_to_error', which provides
// detailed json path to the error
pub(crate) fn deserialize_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        error!("Deserialization failed at {}: {}", err.path(), err);
        NotionError::Deserialization {
            source: err.into_inner(),
        }
    })
}

// log attempt and sleep for exponential backoff
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
async fn log_and_backoff(attempt: u32, err: String) {
    // exponential backoff: 1s, 2s, 4s, with jitter
    let base_delay = 2u64.pow(attempt);
    let jitter: f64 = rand::rng().random_range(0.5..1.5);
    let delay = ((base_delay as f64) * jitter).round().max(1.0) as u64;
    warn!("Recoverable error {err}. Attempt {attempt}. Waiting {delay}s before retry");
    tokio::time::sleep(Duration::from_secs(delay)).await;
}

fn is_idempotent_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}
