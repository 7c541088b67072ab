//! HTTP transport seam
//!
//! Adapters build a [`ProviderRequest`] and hand it to a [`Transport`]. The
//! production implementation uses reqwest; tests script outcomes with
//! [`MockTransport`] and assert on its call count.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One POST to a provider endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Full endpoint URL
    pub url: String,
    /// Extra headers (auth, versioning)
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl ProviderRequest {
    /// Value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends provider requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the request and return the decoded JSON body of a 2xx response
    async fn post_json(&self, request: &ProviderRequest) -> Result<Value, ProviderError>;
}

/// reqwest-backed transport with a per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client; fails only if the TLS backend cannot initialise
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: &ProviderRequest) -> Result<Value, ProviderError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::from_status(status.as_u16(), body, retry_after));
        }

        let text = response.text().await.map_err(map_send_error)?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::Parse(format!("Response body is not JSON: {}", e)))
    }
}

/// Scripted transport for tests.
///
/// Returns queued outcomes in order, then repeats the fallback outcome.
/// Clones share the queue and the call counter.
///
/// # Examples
///
/// ```
/// use docket_llm::{MockTransport, ProviderError};
/// use serde_json::json;
///
/// let transport = MockTransport::new()
///     .then_err(ProviderError::Timeout("slow".into()))
///     .then_ok(json!({"choices": []}));
/// assert_eq!(transport.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    queue: Arc<Mutex<VecDeque<Result<Value, ProviderError>>>>,
    fallback: Arc<Mutex<Result<Value, ProviderError>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockTransport {
    /// Transport whose unscripted calls fail with a network error
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(Err(ProviderError::Network(
                "no scripted response".to_string(),
            )))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transport that always returns `body`
    pub fn always_ok(body: Value) -> Self {
        Self::new().otherwise(Ok(body))
    }

    /// Transport that always fails with `error`
    pub fn always_err(error: ProviderError) -> Self {
        Self::new().otherwise(Err(error))
    }

    /// Queue a successful response
    pub fn then_ok(self, body: Value) -> Self {
        self.lock_queue().push_back(Ok(body));
        self
    }

    /// Queue a failure
    pub fn then_err(self, error: ProviderError) -> Self {
        self.lock_queue().push_back(Err(error));
        self
    }

    /// Outcome once the queue is drained
    pub fn otherwise(self, outcome: Result<Value, ProviderError>) -> Self {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
        self
    }

    /// Number of requests sent
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Value, ProviderError>>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, request: &ProviderRequest) -> Result<Value, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let next = self.lock_queue().pop_front();
        match next {
            Some(outcome) => outcome,
            None => self.fallback.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> ProviderRequest {
        ProviderRequest {
            url: "http://localhost/chat/completions".into(),
            headers: vec![("Authorization".into(), "Bearer k".into())],
            body: json!({"model": "m"}),
        }
    }

    #[test]
    fn test_header_lookup() {
        let req = request();
        assert_eq!(req.header("authorization"), Some("Bearer k"));
        assert_eq!(req.header("x-api-key"), None);
    }

    #[tokio::test]
    async fn test_mock_queue_then_fallback() {
        let transport = MockTransport::new()
            .then_err(ProviderError::from_status(429, "slow", None))
            .then_ok(json!({"ok": 1}))
            .otherwise(Ok(json!({"ok": 2})));

        assert!(transport.post_json(&request()).await.is_err());
        assert_eq!(transport.post_json(&request()).await.unwrap(), json!({"ok": 1}));
        assert_eq!(transport.post_json(&request()).await.unwrap(), json!({"ok": 2}));
        assert_eq!(transport.post_json(&request()).await.unwrap(), json!({"ok": 2}));
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_mock_clones_share_state() {
        let transport = MockTransport::always_ok(json!({}));
        let clone = transport.clone();
        clone.post_json(&request()).await.unwrap();
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.last_request().unwrap().url, request().url);
    }

    #[tokio::test]
    async fn test_reqwest_connection_refused_is_transient() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let req = ProviderRequest {
            url: "http://127.0.0.1:9/unreachable".into(),
            ..request()
        };
        let err = transport.post_json(&req).await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }
}
