//! Wire types for the ViewEngine MCP endpoints

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::RETRIEVAL_TIMEOUT_SECONDS;

/// Capability advertised by `GET /v1/mcp/tools`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Human readable description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Body of `GET /v1/mcp/tools`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolList {
    #[serde(default)]
    pub tools: Option<Vec<ToolDescriptor>>,
}

/// Processing profile for a retrieval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Results stay private to the caller
    #[default]
    Private,
    /// Results may be shared with the community cache
    Community,
}

impl Mode {
    /// Lenient parse used for interactive input: only "community" selects
    /// [`Mode::Community`], everything else falls back to private.
    pub fn from_input(input: &str) -> Self {
        input.parse().unwrap_or_default()
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(Mode::Private),
            "community" => Ok(Mode::Community),
            _ => Err("Invalid mode: must be private or community".to_string()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Private => write!(f, "private"),
            Mode::Community => write!(f, "community"),
        }
    }
}

/// Body of `POST /v1/mcp/retrieve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    /// Page to retrieve
    pub url: String,
    /// Server-side timeout, always [`RETRIEVAL_TIMEOUT_SECONDS`]
    timeout_seconds: u32,
    /// Bypass the server cache
    pub force_refresh: bool,
    /// Processing profile
    pub mode: Mode,
}

impl RetrievalRequest {
    /// Create a request for `url` using the cache and private mode
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: RETRIEVAL_TIMEOUT_SECONDS,
            force_refresh: false,
            mode: Mode::default(),
        }
    }

    /// Set whether the server should bypass its cache
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Set the processing mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Server-side timeout sent with the request
    pub fn timeout_seconds(&self) -> u32 {
        self.timeout_seconds
    }
}

/// Acknowledgement returned when a retrieval is queued
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalAck {
    /// Correlation id for polling
    pub request_id: String,
    /// Initial job status as reported by the server
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Server's estimate of the wait
    #[serde(default, deserialize_with = "whole_seconds")]
    pub estimated_wait_time_seconds: u64,
}

/// Job status observed while polling
///
/// Unknown strings are kept in [`RetrievalStatus::Other`] and count as
/// still in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RetrievalStatus {
    #[default]
    Pending,
    Queued,
    Running,
    Complete,
    Failed,
    Canceled,
    Other(String),
}

impl RetrievalStatus {
    /// True once the server will not change the status again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetrievalStatus::Complete | RetrievalStatus::Failed | RetrievalStatus::Canceled
        )
    }

    /// True for `failed` and `canceled`
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, RetrievalStatus::Failed | RetrievalStatus::Canceled)
    }

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            RetrievalStatus::Pending => "pending",
            RetrievalStatus::Queued => "queued",
            RetrievalStatus::Running => "running",
            RetrievalStatus::Complete => "complete",
            RetrievalStatus::Failed => "failed",
            RetrievalStatus::Canceled => "canceled",
            RetrievalStatus::Other(s) => s,
        }
    }
}

impl From<String> for RetrievalStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => RetrievalStatus::Pending,
            "queued" => RetrievalStatus::Queued,
            "running" => RetrievalStatus::Running,
            "complete" => RetrievalStatus::Complete,
            "failed" => RetrievalStatus::Failed,
            "canceled" | "cancelled" => RetrievalStatus::Canceled,
            _ => RetrievalStatus::Other(s),
        }
    }
}

impl From<RetrievalStatus> for String {
    fn from(status: RetrievalStatus) -> Self {
        match status {
            RetrievalStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RetrievalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /v1/mcp/retrieve/{requestId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    /// Current job status
    pub status: RetrievalStatus,

    /// Progress or outcome message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    /// URL the job is retrieving
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    /// Completion timestamp, server formatted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    /// Failure description for failed or canceled jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Page data location, present once the job is complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentInfo>,
}

/// Where to find the output of a completed job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    /// Absolute URL of the page data document
    pub page_data_url: String,

    /// Hash of the retrieved content
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_hash: String,

    /// Derived outputs by name
    #[serde(default, deserialize_with = "null_as_default")]
    pub artifacts: BTreeMap<String, Value>,

    /// Collected metrics by name
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: BTreeMap<String, Value>,
}

/// The API sends `null` for fields it has nothing to say about yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number as whole seconds: fractions are dropped, negatives and
/// `null` become zero.
fn whole_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    // Float to int `as` casts saturate, and map NaN to zero
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, |secs| secs as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case_with_fixed_timeout() {
        let req = RetrievalRequest::new("https://example.com")
            .force_refresh(true)
            .mode(Mode::Community);

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "url": "https://example.com",
                "timeoutSeconds": 60,
                "forceRefresh": true,
                "mode": "community"
            })
        );
    }

    #[test]
    fn test_mode_from_input() {
        assert_eq!(Mode::from_input("community"), Mode::Community);
        assert_eq!(Mode::from_input("  COMMUNITY "), Mode::Community);
        assert_eq!(Mode::from_input("private"), Mode::Private);
        assert_eq!(Mode::from_input(""), Mode::Private);
        assert_eq!(Mode::from_input("public"), Mode::Private);
        assert!("public".parse::<Mode>().is_err());
    }

    #[test]
    fn test_status_parsing() {
        let status: RetrievalStatus = serde_json::from_value(json!("complete")).unwrap();
        assert_eq!(status, RetrievalStatus::Complete);
        assert!(status.is_terminal());

        let status: RetrievalStatus = serde_json::from_value(json!("cancelled")).unwrap();
        assert_eq!(status, RetrievalStatus::Canceled);
        assert!(status.is_unsuccessful());

        let status: RetrievalStatus = serde_json::from_value(json!("warming_up")).unwrap();
        assert_eq!(status, RetrievalStatus::Other("warming_up".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("warming_up"));
    }

    #[test]
    fn test_status_is_case_sensitive() {
        // The server reports lowercase; anything else is an unknown status.
        let status = RetrievalStatus::from("Complete".to_string());
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_ack_deserialize() {
        let ack: RetrievalAck = serde_json::from_value(json!({
            "requestId": "abc123",
            "status": "queued",
            "estimatedWaitTimeSeconds": 5
        }))
        .unwrap();

        assert_eq!(ack.request_id, "abc123");
        assert_eq!(ack.status, "queued");
        assert_eq!(ack.estimated_wait_time_seconds, 5);
    }

    #[test]
    fn test_ack_wait_estimate_is_lenient() {
        let wait = |estimate: Value| {
            serde_json::from_value::<RetrievalAck>(json!({
                "requestId": "abc123",
                "estimatedWaitTimeSeconds": estimate
            }))
            .unwrap()
            .estimated_wait_time_seconds
        };

        assert_eq!(wait(json!(2.5)), 2);
        assert_eq!(wait(json!(-1)), 0);
        assert_eq!(wait(json!(null)), 0);
        assert_eq!(wait(json!(12)), 12);

        let ack: RetrievalAck = serde_json::from_value(json!({"requestId": "abc123"})).unwrap();
        assert_eq!(ack.estimated_wait_time_seconds, 0);
    }

    #[test]
    fn test_result_with_content() {
        let result: RetrievalResult = serde_json::from_value(json!({
            "status": "complete",
            "message": "done",
            "url": "https://example.com",
            "completedAt": "2025-01-01T00:00:00Z",
            "content": {
                "pageDataUrl": "https://cdn/x.json",
                "contentHash": "deadbeef",
                "artifacts": {"markdown": {"url": "https://cdn/x.md"}},
                "metrics": {"loadTime": {"ms": 120}}
            }
        }))
        .unwrap();

        assert_eq!(result.status, RetrievalStatus::Complete);
        assert_eq!(result.completed_at.as_deref(), Some("2025-01-01T00:00:00Z"));
        let content = result.content.unwrap();
        assert_eq!(content.page_data_url, "https://cdn/x.json");
        assert_eq!(content.content_hash, "deadbeef");
        assert_eq!(content.artifacts.keys().collect::<Vec<_>>(), vec!["markdown"]);
        assert_eq!(content.metrics.keys().collect::<Vec<_>>(), vec!["loadTime"]);
    }

    #[test]
    fn test_result_minimal_fields() {
        let result: RetrievalResult =
            serde_json::from_value(json!({"status": "running"})).unwrap();

        assert_eq!(result.status, RetrievalStatus::Running);
        assert!(result.message.is_empty());
        assert!(result.content.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_result_null_fields() {
        let result: RetrievalResult = serde_json::from_value(json!({
            "status": "complete",
            "message": null,
            "url": null,
            "completedAt": null,
            "error": null,
            "content": {
                "pageDataUrl": "https://cdn/x.json",
                "contentHash": null,
                "artifacts": null,
                "metrics": null
            }
        }))
        .unwrap();

        assert!(result.message.is_empty());
        assert!(result.completed_at.is_none());
        let content = result.content.unwrap();
        assert!(content.content_hash.is_empty());
        assert!(content.artifacts.is_empty());
        assert!(content.metrics.is_empty());
    }

    #[test]
    fn test_tool_list_absent_tools() {
        let list: ToolList = serde_json::from_value(json!({})).unwrap();
        assert!(list.tools.is_none());

        let list: ToolList = serde_json::from_value(json!({"tools": null})).unwrap();
        assert!(list.tools.is_none());
    }
}
