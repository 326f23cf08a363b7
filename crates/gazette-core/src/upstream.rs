//! Shared upstream call path: pacing, transport, status classification, retry.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::pacing::Pacer;
use crate::retry::RetryExecutor;
use crate::ProviderId;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_IMAGE: &str = "image/*,*/*;q=0.8";

/// Executes GET requests against third-party providers.
#[derive(Clone)]
pub struct Upstream {
    http: Arc<dyn HttpClient>,
    retry: RetryExecutor,
    pacer: Pacer,
    user_agent: String,
}

impl Upstream {
    pub fn new(
        http: Arc<dyn HttpClient>,
        retry: RetryExecutor,
        pacer: Pacer,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http,
            retry,
            pacer,
            user_agent: user_agent.into(),
        }
    }

    pub fn retry(&self) -> &RetryExecutor {
        &self.retry
    }

    /// Fetches `url` and decodes the body into `T`.
    ///
    /// Bodies that are not JSON count as transient and are retried; JSON that
    /// does not fit `T` is a normalization failure and is not.
    pub async fn get_json<T>(
        &self,
        provider: ProviderId,
        url: &str,
        timeout: Duration,
    ) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        let value = self.get_json_value(provider, url, timeout).await?;
        serde_json::from_value(value).map_err(|error| {
            SourceError::normalization(format!("{provider} returned an unexpected shape: {error}"))
        })
    }

    pub async fn get_json_value(
        &self,
        provider: ProviderId,
        url: &str,
        timeout: Duration,
    ) -> Result<Value, SourceError> {
        let what = format!("{provider} {url}");
        self.retry
            .run(&what, || async {
                let response = self.fetch_once(provider, url, ACCEPT_JSON, timeout).await?;
                serde_json::from_slice::<Value>(&response.body).map_err(|error| {
                    SourceError::transient(format!("{provider} returned undecodable JSON: {error}"))
                })
            })
            .await
    }

    /// Downloads raw bytes, e.g. an image.
    pub async fn get_bytes(
        &self,
        provider: ProviderId,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, SourceError> {
        let what = format!("{provider} download {url}");
        self.retry
            .run(&what, || async {
                let response = self.fetch_once(provider, url, ACCEPT_IMAGE, timeout).await?;
                if response.body.is_empty() {
                    return Err(SourceError::transient(format!("{provider} returned an empty body")));
                }
                Ok(response.body)
            })
            .await
    }

    async fn fetch_once(
        &self,
        provider: ProviderId,
        url: &str,
        accept: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, SourceError> {
        self.pacer.until_ready(provider).await;

        let request = HttpRequest::get(url)
            .with_header("User-Agent", self.user_agent.as_str())
            .with_header("Accept", accept)
            .with_timeout_ms(timeout.as_millis() as u64);

        debug!(%provider, url, "upstream request");
        let response = self.http.execute(request).await.map_err(|error| {
            if error.is_timeout() {
                SourceError::transient(format!("{provider} timed out: {}", error.message()))
            } else {
                SourceError::transient(format!("{provider} transport error: {}", error.message()))
            }
        })?;

        classify(provider, response)
    }
}

/// Maps an HTTP status onto the source error taxonomy.
pub fn classify(provider: ProviderId, response: HttpResponse) -> Result<HttpResponse, SourceError> {
    match response.status {
        200..=299 => Ok(response),
        429 => Err(SourceError::rate_limited(
            format!("{provider} rate limited the request"),
            response.retry_after(),
        )),
        408 | 500..=599 => Err(SourceError::transient(format!(
            "{provider} returned status {}",
            response.status
        ))),
        status => Err(SourceError::rejected(format!(
            "{provider} rejected the request with status {status}"
        ))),
    }
}
