//! HTTP client for the readings API.

use nordetect_core::alert::{summarize, AlertSummary};
use nordetect_core::query::ReadingListQuery;
use nordetect_core::reading::ReadingSubmission;
use nordetect_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheKey, QueryCache, READINGS_TAG, STATS_TAG};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{upsert_latest, DataEnvelope, HealthStatus, Reading, ReadingStats};

/// Client for one Nordetect API server.
pub struct ReadingsClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: QueryCache,
}

impl ReadingsClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            cache: QueryCache::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ---- queries ----

    /// `GET /api/v1/readings` with the given filters.
    pub async fn list_readings(
        &self,
        query: &ReadingListQuery,
    ) -> Result<Vec<Reading>, ClientError> {
        self.cached(CacheKey::Readings(query.clone()), "/api/v1/readings", Some(query))
            .await
    }

    /// `GET /api/v1/readings/latest`
    pub async fn latest_readings(&self) -> Result<Vec<Reading>, ClientError> {
        self.cached(CacheKey::Latest, "/api/v1/readings/latest", None).await
    }

    /// `GET /api/v1/readings/stats`
    pub async fn stats(&self) -> Result<ReadingStats, ClientError> {
        self.cached(CacheKey::Stats, "/api/v1/readings/stats", None).await
    }

    /// `GET /api/v1/readings/{id}`
    pub async fn get_reading(&self, id: DbId) -> Result<Reading, ClientError> {
        self.cached(CacheKey::Reading(id), &format!("/api/v1/readings/{id}"), None)
            .await
    }

    /// Alert summary over the latest reading of every device.
    ///
    /// Derived locally from [`latest_readings`](Self::latest_readings), so it
    /// shares that query's cache entry.
    pub async fn alerts(&self) -> Result<AlertSummary, ClientError> {
        let latest = self.latest_readings().await?;
        Ok(summarize(&latest))
    }

    /// `GET /health`. Never cached.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.url("/health");
        self.with_retry(&url, || self.http.get(&url)).await
    }

    // ---- writes ----

    /// `POST /api/v1/readings`
    ///
    /// Not retried, since a retry after a lost response could store the
    /// reading twice. On success the `readings` and `stats` tags are
    /// invalidated and the cached latest-per-device list is patched.
    pub async fn create_reading(
        &self,
        submission: &ReadingSubmission,
    ) -> Result<Reading, ClientError> {
        let url = self.url("/api/v1/readings");
        let envelope: DataEnvelope<Reading> =
            Self::send(self.http.post(&url).json(submission)).await?;
        let reading = envelope.data;

        self.cache.invalidate_tag(READINGS_TAG);
        self.cache.invalidate_tag(STATS_TAG);
        let patched = self
            .cache
            .update(&CacheKey::Latest, |latest: &mut Vec<Reading>| {
                upsert_latest(latest, reading.clone())
            });
        self.cache.insert(CacheKey::Reading(reading.id), &reading);

        tracing::debug!(
            id = reading.id,
            device_id = %reading.device_id,
            patched,
            "Reading submitted"
        );
        Ok(reading)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Serve `key` from the cache, or fetch `path` and cache the `data`
    /// payload.
    async fn cached<T>(
        &self,
        key: CacheKey,
        path: &str,
        query: Option<&ReadingListQuery>,
    ) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            tracing::trace!(tag = key.tag(), "Cache hit");
            return Ok(hit);
        }

        let url = self.url(path);
        let envelope: DataEnvelope<T> = self
            .with_retry(&url, || {
                let request = self.http.get(&url);
                match query {
                    Some(q) => request.query(q),
                    None => request,
                }
            })
            .await?;

        self.cache.insert(key, &envelope.data);
        Ok(envelope.data)
    }

    /// Send an idempotent request, retrying retryable failures with
    /// exponential backoff up to `max_retries` times.
    async fn with_retry<T, F>(&self, url: &str, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match Self::send(build()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute a single request and decode a 2xx JSON body.
    async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_response(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}
