//! HTTP client for the ViewEngine MCP endpoints
//!
//! [`RetrievalClient`] is a stateless value: every operation is an
//! independent request authenticated with the `X-API-Key` header. The
//! operations live on the [`RetrievalApi`] trait so callers can swap in a
//! scripted implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Operation, RetrievalError};
use crate::poll::{PollAttempt, PollOutcome, PollPolicy};
use crate::types::{
    RetrievalAck, RetrievalRequest, RetrievalResult, RetrievalStatus, ToolDescriptor, ToolList,
};
use crate::{API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};

/// The four remote operations of the retrieval API
#[async_trait]
pub trait RetrievalApi: Send + Sync {
    /// List the tools the service advertises
    ///
    /// An empty or absent `tools` field yields an empty list.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, RetrievalError>;

    /// Queue a retrieval job
    async fn submit_retrieval(
        &self,
        request: &RetrievalRequest,
    ) -> Result<RetrievalAck, RetrievalError>;

    /// Poll a job until it reaches a terminal status
    ///
    /// Returns the first `complete`, `failed` or `canceled` result. Errors
    /// on individual attempts are reported to `on_attempt` and do not stop
    /// the loop. Fails with [`RetrievalError::PollTimeout`] once the attempt
    /// budget is spent.
    async fn poll_retrieval(
        &self,
        request_id: &str,
        on_attempt: &mut (dyn for<'p> FnMut(&'p PollAttempt) + Send),
    ) -> Result<RetrievalResult, RetrievalError>;

    /// Download the page data document of a completed job
    ///
    /// `page_data_url` is the absolute URL supplied by the server. The body
    /// is returned as is.
    async fn fetch_content(&self, page_data_url: &str) -> Result<Bytes, RetrievalError>;
}

/// Builder for [`RetrievalClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    request_timeout: Duration,
    user_agent: Option<String>,
    poll_policy: PollPolicy,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
            poll_policy: PollPolicy::default(),
        }
    }
}

impl ClientBuilder {
    /// Create a builder pointing at the production endpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key (required)
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the service base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the transport timeout for each HTTP call
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the polling budget
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RetrievalClient, RetrievalError> {
        let api_key = self
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(RetrievalError::MissingApiKey)?;

        let base_url = parse_http_url(&self.base_url)?;

        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.request_timeout)
            .build()
            .map_err(RetrievalError::ClientBuildError)?;

        Ok(RetrievalClient {
            http,
            api_key,
            base_url,
            poll_policy: self.poll_policy,
        })
    }
}

/// Client for the ViewEngine retrieval API
#[derive(Clone)]
pub struct RetrievalClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    poll_policy: PollPolicy,
}

impl fmt::Debug for RetrievalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("poll_policy", &self.poll_policy)
            .finish()
    }
}

impl RetrievalClient {
    /// Create a builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the production endpoint with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self, RetrievalError> {
        Self::builder().api_key(api_key).build()
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Polling budget used by [`RetrievalApi::poll_retrieval`]
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_http_url rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send an authenticated request and return the body of a 200 response
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<Bytes, RetrievalError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| RetrievalError::transport(operation, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RetrievalError::transport(operation, e))?;

        if status != StatusCode::OK {
            return Err(RetrievalError::HttpStatus {
                operation,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        url: Url,
    ) -> Result<T, RetrievalError> {
        debug!(%operation, url = %url, "GET request");
        let body = self.send(operation, self.http.get(url)).await?;
        decode(operation, &body)
    }
}

#[async_trait]
impl RetrievalApi for RetrievalClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, RetrievalError> {
        let url = self.endpoint(&["v1", "mcp", "tools"]);
        let list: ToolList = self.get_json(Operation::ListTools, url).await?;
        let tools = list.tools.unwrap_or_default();
        debug!(count = tools.len(), "Discovered tools");
        Ok(tools)
    }

    async fn submit_retrieval(
        &self,
        request: &RetrievalRequest,
    ) -> Result<RetrievalAck, RetrievalError> {
        let url = self.endpoint(&["v1", "mcp", "retrieve"]);
        debug!(
            url = %url,
            target = %request.url,
            force_refresh = request.force_refresh,
            mode = %request.mode,
            "POST request"
        );

        let body = self
            .send(Operation::Submit, self.http.post(url).json(request))
            .await?;
        let ack: RetrievalAck = decode(Operation::Submit, &body)?;

        info!(
            request_id = %ack.request_id,
            status = %ack.status,
            estimated_wait_secs = ack.estimated_wait_time_seconds,
            "Retrieval submitted"
        );
        Ok(ack)
    }

    async fn poll_retrieval(
        &self,
        request_id: &str,
        on_attempt: &mut (dyn for<'p> FnMut(&'p PollAttempt) + Send),
    ) -> Result<RetrievalResult, RetrievalError> {
        let policy = self.poll_policy;
        let url = self.endpoint(&["v1", "mcp", "retrieve", request_id]);

        for attempt in 1..=policy.max_attempts {
            let outcome = match self
                .get_json::<RetrievalResult>(Operation::Poll, url.clone())
                .await
            {
                Ok(result) => {
                    on_attempt(&PollAttempt {
                        attempt,
                        max_attempts: policy.max_attempts,
                        outcome: PollOutcome::Status {
                            status: result.status.clone(),
                            message: result.message.clone(),
                        },
                    });

                    if result.status.is_terminal() {
                        info!(%request_id, status = %result.status, attempt, "Retrieval finished");
                        if result.status == RetrievalStatus::Complete && result.content.is_none() {
                            warn!(%request_id, "Complete result carries no content");
                        }
                        return Ok(result);
                    }

                    if let RetrievalStatus::Other(status) = &result.status {
                        debug!(%request_id, %status, "Unrecognized status, still polling");
                    }
                    None
                }
                Err(e) => {
                    warn!(
                        %request_id,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "Poll attempt failed"
                    );
                    Some(PollOutcome::Error(attempt_error_summary(&e)))
                }
            };

            if let Some(outcome) = outcome {
                on_attempt(&PollAttempt {
                    attempt,
                    max_attempts: policy.max_attempts,
                    outcome,
                });
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        warn!(%request_id, attempts = policy.max_attempts, "Polling budget exhausted");
        Err(RetrievalError::PollTimeout {
            request_id: request_id.to_string(),
            attempts: policy.max_attempts,
        })
    }

    async fn fetch_content(&self, page_data_url: &str) -> Result<Bytes, RetrievalError> {
        let url = parse_http_url(page_data_url)?;
        debug!(url = %url, "GET page data");
        let body = self
            .send(Operation::FetchContent, self.http.get(url))
            .await?;
        debug!(size = body.len(), "Downloaded page data");
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(operation: Operation, body: &[u8]) -> Result<T, RetrievalError> {
    serde_json::from_slice(body).map_err(|source| {
        warn!(%operation, error = %source, "Failed to parse response");
        RetrievalError::Decode { operation, source }
    })
}

/// Parse an absolute http(s) URL usable as a request target
fn parse_http_url(raw: &str) -> Result<Url, RetrievalError> {
    let url = Url::parse(raw.trim()).map_err(|e| RetrievalError::invalid_url(raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RetrievalError::invalid_url(
            raw,
            "must start with http:// or https://",
        ));
    }
    if url.cannot_be_a_base() {
        return Err(RetrievalError::invalid_url(raw, "not a hierarchical URL"));
    }
    Ok(url)
}

/// Short description of a failed poll attempt for progress output
fn attempt_error_summary(err: &RetrievalError) -> String {
    match err {
        RetrievalError::HttpStatus { status, .. } => format!("HTTP Error: {status}"),
        RetrievalError::Decode { .. } => "Failed to decode response".to_string(),
        RetrievalError::Transport { source, .. } => format!("Error: {source}"),
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RetrievalClient {
        RetrievalClient::builder()
            .api_key("key")
            .base_url(base)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_api_key() {
        let result = RetrievalClient::builder().build();
        assert!(matches!(result, Err(RetrievalError::MissingApiKey)));

        let result = RetrievalClient::new("   ");
        assert!(matches!(result, Err(RetrievalError::MissingApiKey)));
    }

    #[test]
    fn test_build_rejects_bad_base_url() {
        let result = RetrievalClient::builder()
            .api_key("key")
            .base_url("ftp://example.com")
            .build();
        assert!(matches!(result, Err(RetrievalError::InvalidUrl { .. })));

        let result = RetrievalClient::builder()
            .api_key("key")
            .base_url("not a url")
            .build();
        assert!(matches!(result, Err(RetrievalError::InvalidUrl { .. })));
    }

    #[test]
    fn test_default_base_url() {
        let client = RetrievalClient::new("key").unwrap();
        assert_eq!(client.base_url().as_str(), "https://www.viewengine.io/");
        assert_eq!(client.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_endpoint_joining() {
        let c = client("https://www.viewengine.io");
        assert_eq!(
            c.endpoint(&["v1", "mcp", "tools"]).as_str(),
            "https://www.viewengine.io/v1/mcp/tools"
        );

        let c = client("http://localhost:5072/api/");
        assert_eq!(
            c.endpoint(&["v1", "mcp", "retrieve", "abc123"]).as_str(),
            "http://localhost:5072/api/v1/mcp/retrieve/abc123"
        );
    }

    #[test]
    fn test_endpoint_encodes_request_id() {
        let c = client("https://www.viewengine.io");
        assert_eq!(
            c.endpoint(&["v1", "mcp", "retrieve", "a/b c"]).as_str(),
            "https://www.viewengine.io/v1/mcp/retrieve/a%2Fb%20c"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let c = RetrievalClient::new("super-secret").unwrap();
        let debug = format!("{:?}", c);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_attempt_error_summary() {
        let err = RetrievalError::HttpStatus {
            operation: Operation::Poll,
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(attempt_error_summary(&err), "HTTP Error: 502");

        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = RetrievalError::Decode {
            operation: Operation::Poll,
            source,
        };
        assert_eq!(attempt_error_summary(&err), "Failed to decode response");
    }
}
