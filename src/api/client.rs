// src/api/client.rs — Rate-limit-aware HTTP client
//
// One retry policy for every call: 429 responses (or transport errors
// explicitly identified as 429) back off for a flat jittered window and
// retry up to a fixed attempt ceiling. Any other transport error is terminal
// immediately; any other status (including 5xx) is returned to the caller
// for status-specific interpretation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};

use crate::infra::config::ApiConfig;
use crate::infra::errors::ClaimBotError;
use crate::util::random_in_range;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug)]
pub enum TransportError {
    /// Transport-level failure explicitly identified as a 429.
    RateLimited,
    /// No response received.
    Connect(String),
}

/// Seam between the retry policy and the actual HTTP stack. Production uses
/// [`HttpTransport`]; tests inject scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport with the browser-imitating header set.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig) -> Result<Self, ClaimBotError> {
        let origin = derive_origin(&api.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        if let Ok(v) = HeaderValue::from_str(&origin) {
            headers.insert(ORIGIN, v);
        }
        if let Ok(v) = HeaderValue::from_str(&format!("{origin}/")) {
            headers.insert(REFERER, v);
        }
        if let Ok(v) = HeaderValue::from_str(&api.user_agent) {
            headers.insert(USER_AGENT, v);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ClaimBotError::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self { client })
    }
}

/// Origin header value derived from the configured base URL
/// (e.g. `https://api.example.com/api` → `https://api.example.com`).
fn derive_origin(base_url: &str) -> Result<String, ClaimBotError> {
    let parsed = url::Url::parse(base_url).map_err(|e| ClaimBotError::BaseUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;
    Ok(parsed.origin().ascii_serialization())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => {
                let builder = self.client.post(&request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder.send().await.map_err(|e| {
            if e.status().map(|s| s.as_u16()) == Some(HTTP_TOO_MANY_REQUESTS) {
                TransportError::RateLimited
            } else {
                TransportError::Connect(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        // Bodies are parsed leniently; non-JSON payloads become null and the
        // caller's defensive extraction handles the rest.
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        Ok(ApiResponse { status, body })
    }
}

/// Retry behavior for rate-limited requests. The sleep window is flat — it
/// does not grow with the attempt count.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub sleep_floor_ms: u64,
    pub sleep_ceiling_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            sleep_floor_ms: 1_000,
            sleep_ceiling_ms: 3_000,
        }
    }
}

/// Terminal outcome of a single logical request. Failures are values, never
/// errors: nothing here propagates past the call site.
#[derive(Debug)]
pub enum SendOutcome {
    Response(ApiResponse),
    RateLimitExhausted,
    NetworkFailure(String),
}

/// Issues one HTTP request under the bounded 429 retry policy.
#[derive(Clone)]
pub struct RateLimitedClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RateLimitedClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Send `request`, retrying only while rate-limited. `label` identifies
    /// the call in logs (endpoint plus account where relevant).
    pub async fn send(&self, label: &str, request: ApiRequest) -> SendOutcome {
        for attempt in 1..=self.policy.max_attempts {
            match self.transport.execute(&request).await {
                Ok(resp) if resp.status == HTTP_TOO_MANY_REQUESTS => {}
                Ok(resp) => {
                    tracing::debug!(label, attempt, status = resp.status, "request completed");
                    return SendOutcome::Response(resp);
                }
                Err(TransportError::RateLimited) => {}
                Err(TransportError::Connect(message)) => {
                    tracing::warn!(label, attempt, "network error: {}", message);
                    return SendOutcome::NetworkFailure(message);
                }
            }

            let sleep_ms = random_in_range(self.policy.sleep_floor_ms, self.policy.sleep_ceiling_ms);
            tracing::warn!(
                label,
                attempt,
                max_attempts = self.policy.max_attempts,
                sleep_ms,
                "429 Too Many Requests, backing off"
            );
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }

        tracing::warn!(
            label,
            attempts = self.policy.max_attempts,
            "aborted after repeated 429 responses"
        );
        SendOutcome::RateLimitExhausted
    }
}
