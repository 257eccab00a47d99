// file: src/client/http.rs
// description: Mattermost REST client core with auth, retries, rate limiting and error mapping
// reference: https://api.mattermost.com, https://docs.rs/reqwest

use super::cache::ClientCache;
use super::rate_limit::RateLimiter;
use crate::config::Config;
use crate::error::{MattermostError, Result};
use crate::utils::Validator;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

const API_PATH: &str = "api/v4/";
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Error body returned by Mattermost on non-2xx responses
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    id: String,
    message: String,
    detailed_error: String,
    request_id: String,
    status_code: u16,
}

/// `{"status": "OK"}` acknowledgement returned by delete/pin style endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: String,
}

pub struct MattermostClient {
    http: reqwest::Client,
    api_url: Url,
    team_id: Option<String>,
    max_retries: u32,
    base_backoff_ms: u64,
    limiter: RateLimiter,
    pub(super) cache: ClientCache,
}

impl MattermostClient {
    pub fn new(config: &Config) -> Result<Self> {
        let url = config.url.as_deref().filter(|u| !u.is_empty());
        let token = config.token.as_deref().filter(|t| !t.is_empty());
        let (url, token) = match (url, token) {
            (Some(url), Some(token)) => (url, token),
            _ => {
                return Err(MattermostError::Config(
                    "Mattermost URL and token are required".to_string(),
                ));
            }
        };

        Validator::validate_url(url)?;
        let api_url = Self::build_api_url(url)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            MattermostError::Config("token contains characters not allowed in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("mattermost-mcp/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()?;

        let limiter = RateLimiter::new(config.min_request_interval());
        info!(
            "Mattermost client configured for {} (min request interval {:?})",
            api_url,
            limiter.min_interval()
        );

        Ok(Self {
            http,
            api_url,
            team_id: config.team_id.clone().filter(|t| !t.is_empty()),
            max_retries: config.max_retries,
            base_backoff_ms: config.base_backoff_ms,
            limiter,
            cache: ClientCache::new(config.cache_ttl(), config.cache_enabled),
        })
    }

    /// `{url}/api/v4/`, tolerating a missing trailing slash on `url`.
    fn build_api_url(url: &str) -> Result<Url> {
        let base = if url.ends_with('/') {
            Url::parse(url)?
        } else {
            Url::parse(&format!("{}/", url))?
        };
        Ok(base.join(API_PATH)?)
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn default_team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    /// Explicit team id, else the configured default.
    pub(crate) fn resolve_team(&self, team_id: Option<&str>) -> Result<String> {
        let team = team_id
            .filter(|t| !t.is_empty())
            .or(self.team_id.as_deref())
            .ok_or(MattermostError::MissingTeam)?;
        Validator::validate_id("team_id", team)?;
        Ok(team.to_string())
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.api_url.join(endpoint.trim_start_matches('/'))?)
    }

    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint_url(endpoint)?))
    }

    /// Sends one request with retries for idempotent methods.
    pub(crate) async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let url = self.endpoint_url(endpoint)?;
        let retriable = Self::is_idempotent(&method);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.limiter.acquire().await;

            let mut request = self.http.request(method.clone(), url.clone()).query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!("{} {} (attempt {})", method, url.path(), attempt);

            let can_retry = retriable && attempt <= self.max_retries;
            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if can_retry && Self::is_status_retriable(status) {
                        let delay = Self::retry_after(&response)
                            .unwrap_or_else(|| self.calculate_backoff(attempt));
                        warn!(
                            "{} {} returned {}, retrying in {:?} (attempt {}/{})",
                            method,
                            url.path(),
                            status,
                            delay,
                            attempt,
                            self.max_retries
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(Self::api_error(response).await);
                }
                Err(err) => {
                    if can_retry && (err.is_connect() || err.is_timeout()) {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "{} {} failed: {}, retrying in {:?} (attempt {}/{})",
                            method,
                            url.path(),
                            err,
                            delay,
                            attempt,
                            self.max_retries
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(MattermostError::Request(err));
                }
            }
        }
    }

    /// Sends a prepared request exactly once (used for multipart uploads).
    pub(crate) async fn send_once(&self, request: RequestBuilder) -> Result<Response> {
        self.limiter.acquire().await;
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.get_json_with_query(endpoint, &[]).await
    }

    pub(crate) async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.execute(Method::GET, endpoint, query, None).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, endpoint, &[], Some(&body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn put_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, endpoint, &[], Some(&body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.execute(Method::DELETE, endpoint, &[], None).await?;
        Ok(response.json().await?)
    }

    async fn api_error(response: Response) -> MattermostError {
        let status = response.status().as_u16();
        let body: ApiErrorBody = response.json().await.unwrap_or_default();

        let mut message = format!("API request failed: {}", status);
        if !body.message.is_empty() {
            message.push_str(&format!(" - {}", body.message));
        }
        if !body.detailed_error.is_empty() {
            debug!("Mattermost detailed error: {}", body.detailed_error);
        }
        if body.status_code != 0 && body.status_code != status {
            debug!(
                "Mattermost body status {} differs from HTTP status {}",
                body.status_code, status
            );
        }

        MattermostError::Api {
            status,
            message,
            error_id: Some(body.id).filter(|s| !s.is_empty()),
            request_id: Some(body.request_id).filter(|s| !s.is_empty()),
        }
    }

    fn is_idempotent(method: &Method) -> bool {
        matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    fn is_status_retriable(status: StatusCode) -> bool {
        matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
    }

    fn retry_after(response: &Response) -> Option<Duration> {
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return None;
        }
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
    }

    fn calculate_backoff(&self, attempt: u32) -> Duration {
        // shift by max 16 bits to avoid overflow
        let exp_backoff = self.base_backoff_ms.saturating_mul(1 << attempt.min(16));

        // +/- 20%
        let jitter_factor = rand::rng().random_range(0.8..1.2);
        Duration::from_millis((exp_backoff as f64 * jitter_factor) as u64)
    }
}
