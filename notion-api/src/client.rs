//! Notion Rust API Client
//!
//! # Creating new api client
//!
//! - [new](NotionClient::new) - create new client, token from `NOTION_TOKEN`
//! - [with_config](NotionClient::with_config) - create client with custom configuration
//! - [with_client](NotionClient::with_client) - create client with configuration and custom reqwest client
//!
//! # Configuration
//!
//! - [get_config](NotionClient::get_config) - returns configuration
//! - [api_version](NotionClient::api_version) - returns the `Notion-Version` sent with requests
//! - [set_token](NotionClient::set_token) - replace the integration token
//!

use std::{fmt, sync::Arc};

use reqwest::RequestBuilder;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    NOTION_API_URL, NOTION_API_VERSION, Result,
    config::{
        NOTION_ROOT_PAGE_ENV, NOTION_TOKEN_ENV, NOTION_URL_ENV, RATE_LIMIT_MAX_RETRIES_DEFAULT,
        RATE_LIMIT_MAX_RETRIES_ENV,
    },
    http_client::HttpClient,
    prelude::*,
};

/// Integration token. The secret is zeroed when dropped, and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Reads the token from the `NOTION_TOKEN` environment variable.
    /// Returns None if the variable is unset or empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(NOTION_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(|token| Self(token.trim().to_string()))
    }

    pub(crate) fn set_auth_header(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.0)
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

/// Configuration for the Notion client. Defines endpoint url, token, validation limits, and other settings.
///
/// ```rust,no_run
/// use notion_api::prelude::*;
/// # fn create_client() -> Result<NotionClient, NotionError> {
/// let config = ClientConfig::default()
///     .token(SecretToken::new("secret_xyz"))
///     .root_page_id("668d797c76fa49349b05ad288df2d136");
/// let client = NotionClient::with_config(config)?;
/// # Ok(client)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base url for all HTTP/REST api requests.
    /// If not provided in config, url is determined by:
    /// * The environment variable NOTION_URL, if defined, or
    /// * "https://api.notion.com" `notion_api::NOTION_API_URL`
    pub base_url: String,

    /// Value sent in the `Notion-Version` header.
    pub notion_version: String,

    /// Integration token. Defaults to the value of NOTION_TOKEN.
    /// May be left unset at construction, but requests fail with
    /// `NotionError::Config` until a token is set.
    pub token: Option<SecretToken>,

    /// Default parent page for `new_database`. Defaults to NOTION_BASE_PAGE_ID.
    pub root_page_id: Option<String>,

    /// Limits for sanity checking.
    pub limits: ValidationLimits,

    /// Maximum consecutive 429 retries before failing (0 disables the cap).
    ///
    /// When the rate limit is exceeded, the server responds with http 429 and a
    /// `Retry-After` header. The http client waits for the indicated interval and
    /// retries, up to `rate_limit_max_retries` times, before returning
    /// `NotionError::RateLimitExceeded`.
    ///
    /// Defaults to RATE_LIMIT_MAX_RETRIES_DEFAULT, or the env override if set:
    /// NOTION_RATE_LIMIT_MAX_RETRIES.
    pub rate_limit_max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: std::env::var(NOTION_URL_ENV).unwrap_or(NOTION_API_URL.to_string()),
            notion_version: NOTION_API_VERSION.to_string(),
            token: SecretToken::from_env(),
            root_page_id: std::env::var(NOTION_ROOT_PAGE_ENV)
                .ok()
                .filter(|id| !id.trim().is_empty()),
            limits: ValidationLimits::default(),
            rate_limit_max_retries: std::env::var(RATE_LIMIT_MAX_RETRIES_ENV)
                .ok()
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(RATE_LIMIT_MAX_RETRIES_DEFAULT),
        }
    }
}

impl ClientConfig {
    /// Sets the base url.
    pub fn base_url(self, base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..self
        }
    }

    pub fn token(self, token: SecretToken) -> Self {
        ClientConfig {
            token: Some(token),
            ..self
        }
    }

    /// Sets the default parent page for new databases.
    pub fn root_page_id(self, root_page_id: impl Into<String>) -> Self {
        ClientConfig {
            root_page_id: Some(root_page_id.into()),
            ..self
        }
    }

    pub fn limits(self, limits: ValidationLimits) -> Self {
        ClientConfig { limits, ..self }
    }

    pub fn rate_limit_max_retries(self, rate_limit_max_retries: u32) -> Self {
        ClientConfig {
            rate_limit_max_retries,
            ..self
        }
    }

    pub fn get_limits(&self) -> &ValidationLimits {
        &self.limits
    }
}

/// An ergonomic Notion API client in Rust.
#[derive(Clone)]
pub struct NotionClient {
    pub(crate) client: Arc<HttpClient>,
    pub(crate) config: ClientConfig,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// Creates a new client with default configuration.
    /// The token is read from NOTION_TOKEN, if set.
    ///
    /// # Example
    /// ```rust,no_run
    /// use notion_api::prelude::*;
    /// # fn create_client() -> Result<NotionClient, NotionError> {
    /// let client = NotionClient::new()?;
    /// # Ok(client)
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with the provided configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .user_agent(concat!("notion-api-rs/", env!("CARGO_PKG_VERSION")));
        Self::with_client(builder, config)
    }

    /// Creates a client from a `reqwest::ClientBuilder` and configuration.
    /// ClientBuilder can be customized with timeouts, proxies, dns servers, user_agent, etc.
    ///
    /// # Example
    /// ```rust,no_run
    /// use notion_api::prelude::*;
    /// # fn create_client() -> Result<NotionClient, NotionError> {
    /// let builder = reqwest::Client::builder().timeout(std::time::Duration::from_secs(10));
    /// let client = NotionClient::with_client(builder, ClientConfig::default())?;
    /// # Ok(client)
    /// # }
    /// ```
    pub fn with_client(builder: reqwest::ClientBuilder, config: ClientConfig) -> Result<Self> {
        debug!(url=?config.base_url, version=%config.notion_version, "new client");
        let client = HttpClient::new(
            builder,
            config.base_url.clone(),
            config.notion_version.clone(),
            config.limits.clone(),
            config.rate_limit_max_retries,
        )?;
        if let Some(token) = &config.token {
            client.set_token(token.clone());
        }
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Returns the configuration.
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the api version sent in the `Notion-Version` header, for example: "2022-06-28".
    pub fn api_version(&self) -> &str {
        &self.config.notion_version
    }

    /// Replaces the integration token used for subsequent requests.
    pub fn set_token(&self, token: SecretToken) {
        self.client.set_token(token);
    }

    /// Returns true if a token is available for requests.
    pub fn has_token(&self) -> bool {
        self.client.has_token()
    }

    /// Removes the integration token. Requests fail with `NotionError::Config` until a new one is set.
    pub fn clear_token(&self) {
        self.client.clear_token();
    }

    /// Request counters since the client was created: requests, 2xx responses,
    /// failures, retries, 429 responses and the time spent waiting on them, and bytes
    /// sent and received.
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        self.client.metrics_snapshot()
    }
}
