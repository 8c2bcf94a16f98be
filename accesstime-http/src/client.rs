//! HTTP client for `GET /project/{chainId}/{id}`.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Supports optional timeout and headers
//! - Caches records per `(chain, id)` with a configurable TTL
//! - Integrates with `tracing` if the `telemetry` feature is enabled

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use accesstime::chain::ChainId;
use accesstime::networks::API_URL;
use accesstime::types::ProjectDetails;
use alloy_primitives::U256;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::cache::ProjectCache;
use crate::error::ProjectApiError;

/// A client for the AccessTime project API.
///
/// Clones share the same cache, so invalidating a project through one
/// handle is seen by every component holding a clone.
#[derive(Clone, Debug)]
pub struct ProjectApiClient {
    /// Base URL of the API (e.g. `https://api.accesstime.io/`)
    base_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
    /// Project records keyed by chain and id
    cache: Arc<ProjectCache>,
}

impl ProjectApiClient {
    /// Default TTL for cached project records (5 minutes).
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

    /// Returns the base URL used by this client.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns any custom headers configured on the client.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the project cache.
    #[must_use]
    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    /// Constructs a client for the API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
            cache: Arc::new(ProjectCache::new(Self::DEFAULT_CACHE_TTL)),
        }
    }

    /// Constructs a client for the public AccessTime API.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectApiError::UrlParse`] if the built-in URL fails to parse.
    pub fn public() -> Result<Self, ProjectApiError> {
        Self::try_from(API_URL)
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the TTL for cached records, replacing the cache.
    ///
    /// Use [`Self::without_cache()`] to disable caching.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(ProjectCache::new(ttl));
        self
    }

    /// Disables caching.
    #[must_use]
    pub fn without_cache(self) -> Self {
        self.with_cache_ttl(Duration::ZERO)
    }

    /// Computes `./project/{chain_id}/{id}` relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectApiError::UrlParse`] if the URL cannot be built.
    pub fn project_url(&self, chain_id: ChainId, id: U256) -> Result<Url, ProjectApiError> {
        self.base_url
            .join(&format!("./project/{chain_id}/{id}"))
            .map_err(|e| ProjectApiError::UrlParse {
                context: "Failed to construct ./project URL",
                source: e,
            })
    }

    /// Fetches the project record, serving it from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectApiError`] if the HTTP request fails.
    pub async fn project(
        &self,
        chain_id: ChainId,
        id: U256,
    ) -> Result<ProjectDetails, ProjectApiError> {
        let key = (chain_id, id);
        if let Some(project) = self.cache.get(&key).await {
            return Ok(project);
        }

        #[cfg(feature = "telemetry")]
        tracing::info!(chain_id, %id, "accesstime.project_api.cache_miss");

        let project = self.project_uncached(chain_id, id).await?;
        self.cache.set(key, project.clone()).await;
        Ok(project)
    }

    /// Fetches the project record, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectApiError`] if the HTTP request fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "accesstime.project_api.project", skip(self), err)
    )]
    pub async fn project_uncached(
        &self,
        chain_id: ChainId,
        id: U256,
    ) -> Result<ProjectDetails, ProjectApiError> {
        let url = self.project_url(chain_id, id)?;
        self.get_json(&url, "GET /project").await
    }

    /// Forgets the cached record of one project.
    pub async fn invalidate(&self, chain_id: ChainId, id: U256) {
        self.cache.invalidate(&(chain_id, id)).await;
    }

    /// Forgets every cached record.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Generic GET helper that handles error mapping, timeout application,
    /// and telemetry integration.
    ///
    /// `context` is a human-readable identifier used in tracing and error messages (e.g. `"GET /project"`).
    async fn get_json<R>(&self, url: &Url, context: &'static str) -> Result<R, ProjectApiError>
    where
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.get(url.clone());
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ProjectApiError::Http { context, source: e })?;

        let result = if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| ProjectApiError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| ProjectApiError::ResponseBodyRead { context, source: e })?;
            Err(ProjectApiError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }
}

/// Converts a string URL into a `ProjectApiClient`.
impl TryFrom<&str> for ProjectApiClient {
    type Error = ProjectApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = value.trim_end_matches('/').to_owned();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| ProjectApiError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Ok(Self::new(url))
    }
}

/// Converts a String URL into a `ProjectApiClient`.
impl TryFrom<String> for ProjectApiClient {
    type Error = ProjectApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Records the outcome of a request on a tracing span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to project API failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
