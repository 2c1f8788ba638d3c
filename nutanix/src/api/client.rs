use reqwest::header::{HeaderMap, ETAG, IF_MATCH};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::common::{redact, ApiErrorDetails, ApiErrorResponse, ApiQueryParams, ApiResponse};
use super::error::ApiError;
use super::transport::{HttpSettings, RequestCounters, RequestStats};

const REQUEST_ID_HEADER: &str = "NTNX-Request-Id";

/// Prism Central v4 API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    retry_config: RetryConfig,
    counters: Arc<RequestCounters>,
    http_log: bool,
}

#[derive(Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

#[derive(Clone, Default)]
pub struct ClientOptions {
    pub insecure: bool,
    pub proxy_url: Option<String>,
    pub http_log: bool,
    pub retry_config: RetryConfig,
}

/// An entity together with the ETag it was served with
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub etag: String,
}

impl Client {
    /// `base_url` is the API root, e.g. `https://pc.example.com:9440/api`
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        insecure: bool,
    ) -> Result<Self, ApiError> {
        Self::with_options(
            base_url,
            username,
            password,
            ClientOptions {
                insecure,
                ..Default::default()
            },
        )
    }

    pub fn with_options(
        base_url: &str,
        username: &str,
        password: &str,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        let http_client = HttpSettings {
            insecure: options.insecure,
            proxy_url: options.proxy_url.clone(),
            request_timeout: std::time::Duration::from_secs(options.retry_config.timeout_seconds),
            ..Default::default()
        }
        .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: base_url.trim_end_matches('/').to_string(),
                username: username.to_string(),
                password: password.to_string(),
                retry_config: options.retry_config,
                counters: Arc::new(RequestCounters::default()),
                http_log: options.http_log,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn stats(&self) -> RequestStats {
        self.inner.counters.snapshot()
    }

    /// Same connection pool, credentials and counters, but every request is
    /// sent exactly once. For callers that run their own retry loop.
    pub fn without_retries(&self) -> Client {
        let inner = &self.inner;
        Client {
            inner: Arc::new(ClientInner {
                http_client: inner.http_client.clone(),
                base_url: inner.base_url.clone(),
                username: inner.username.clone(),
                password: inner.password.clone(),
                retry_config: RetryConfig {
                    max_retries: 0,
                    ..inner.retry_config.clone()
                },
                counters: Arc::clone(&inner.counters),
                http_log: inner.http_log,
            }),
        }
    }

    /// Cluster management (clusters, hosts, storage containers, profiles, certificates)
    pub fn clustermgmt(&self) -> crate::api::clustermgmt::ClusterMgmtApi<'_> {
        crate::api::clustermgmt::ClusterMgmtApi::new(self)
    }

    /// Prism (tasks, domain managers)
    pub fn prism(&self) -> crate::api::prism::PrismApi<'_> {
        crate::api::prism::PrismApi::new(self)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (data, _) = self
            .request::<T>(Method::GET, path, None, None, false)
            .await?;
        Ok(data)
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// GET returning the full envelope, for list endpoints that report
    /// `metadata.totalAvailableResults`
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<ApiResponse<Option<T>>, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        let response = self
            .send_with_retry(Method::GET, &full_path, None, None, false)
            .await?;
        let text = response.text().await?;
        self.log_response(&full_path, &text);
        serde_json::from_str::<ApiResponse<Option<T>>>(&text)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// GET that also returns the ETag; a missing or empty ETag is an error
    pub async fn get_with_etag<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Versioned<T>, ApiError> {
        let (data, etag) = self
            .request::<T>(Method::GET, path, None, None, false)
            .await?;
        match etag {
            Some(etag) if !etag.is_empty() => Ok(Versioned { data, etag }),
            _ => Err(ApiError::MissingEtag(path.to_string())),
        }
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        if_match: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        let (data, _) = self
            .request::<T>(Method::POST, path, Some(&body), if_match, true)
            .await?;
        Ok(data)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        if_match: &str,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        let (data, _) = self
            .request::<T>(Method::PUT, path, Some(&body), Some(if_match), true)
            .await?;
        Ok(data)
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        if_match: Option<&str>,
    ) -> Result<T, ApiError> {
        let (data, _) = self
            .request::<T>(Method::DELETE, path, None, if_match, true)
            .await?;
        Ok(data)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        if_match: Option<&str>,
        mutating: bool,
    ) -> Result<(T, Option<String>), ApiError> {
        let response = self
            .send_with_retry(method, path, body, if_match, mutating)
            .await?;
        let etag = etag_from(response.headers());
        let data = self.parse_success_response(path, response).await?;
        Ok((data, etag))
    }

    /// Sends the request, retrying 429/5xx and transport failures with
    /// exponential backoff. Mutations keep one request id across retries.
    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        if_match: Option<&str>,
        mutating: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        let request_id = mutating.then(|| uuid::Uuid::new_v4().to_string());

        if self.inner.http_log {
            match body {
                Some(body) => tracing::debug!(
                    method = %method,
                    url = %url,
                    body = %redact(body),
                    "HTTP request"
                ),
                None => tracing::debug!(method = %method, url = %url, "HTTP request"),
            }
        } else {
            tracing::debug!("{} request to: {}", method, url);
        }

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            let mut builder = self
                .inner
                .http_client
                .request(method.clone(), &url)
                .basic_auth(&self.inner.username, Some(&self.inner.password));
            if let Some(request_id) = &request_id {
                builder = builder.header(REQUEST_ID_HEADER, request_id);
            }
            if let Some(etag) = if_match {
                builder = builder.header(IF_MATCH, etag);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        self.inner.counters.record(true);
                        return Ok(response);
                    }

                    self.inner.counters.record(false);

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Unauthorized);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(self.error_from_response(response).await);
                    } else {
                        return Err(self.error_from_response(response).await);
                    }
                }
                Err(e) => {
                    self.inner.counters.record(false);

                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::Transport(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        self.log_response(path, &text);

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(wrapper) => Ok(wrapper.data),
            Err(envelope_err) => match serde_json::from_str::<T>(&text) {
                Ok(data) => Ok(data),
                Err(_) => {
                    tracing::error!("Failed to deserialize response from {}: {}", path, envelope_err);
                    Err(ApiError::Decode(envelope_err.to_string()))
                }
            },
        }
    }

    fn log_response(&self, path: &str, text: &str) {
        if !self.inner.http_log {
            return;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => tracing::debug!(path = %path, body = %redact(&value), "HTTP response"),
            Err(_) => tracing::debug!(path = %path, "HTTP response (non-JSON body)"),
        }
    }

    async fn error_from_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        self.log_response("error", &text);

        let details = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .map(|resp| Box::new(ApiErrorDetails::from_response(resp)));

        let message = match &details {
            Some(d) if !d.messages.is_empty() => d.summary(),
            _ => text,
        };

        ApiError::Status {
            status,
            message,
            details,
        }
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::Encode)
}

fn etag_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
