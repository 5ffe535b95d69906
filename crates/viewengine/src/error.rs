//! Error types for ViewEngine

use std::fmt;
use thiserror::Error;

/// Remote operation an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /v1/mcp/tools`
    ListTools,
    /// `POST /v1/mcp/retrieve`
    Submit,
    /// `GET /v1/mcp/retrieve/{requestId}`
    Poll,
    /// `GET {pageDataUrl}`
    FetchContent,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ListTools => write!(f, "tool discovery"),
            Operation::Submit => write!(f, "retrieval submission"),
            Operation::Poll => write!(f, "status poll"),
            Operation::FetchContent => write!(f, "page data download"),
        }
    }
}

/// Errors that can occur while talking to the retrieval API
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// API key is missing or empty
    #[error("Missing required parameter: api key")]
    MissingApiKey,

    /// Base URL or server-supplied URL is unusable
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request never produced a response (connect failure, timeout, reset)
    #[error("{operation} failed: could not reach server")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with something other than 200
    #[error("{operation} failed: HTTP {status}: {body}")]
    HttpStatus {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// Response body was not the JSON shape we expected
    #[error("{operation} failed: could not decode response")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// Attempt budget ran out before the job reached a terminal status
    #[error("Timeout: job {request_id} not finished after {attempts} polling attempts")]
    PollTimeout { request_id: String, attempts: u32 },
}

impl RetrievalError {
    /// Operation that failed, if the error came from a remote call
    pub fn operation(&self) -> Option<Operation> {
        match self {
            RetrievalError::Transport { operation, .. }
            | RetrievalError::HttpStatus { operation, .. }
            | RetrievalError::Decode { operation, .. } => Some(*operation),
            RetrievalError::PollTimeout { .. } => Some(Operation::Poll),
            _ => None,
        }
    }

    /// HTTP status returned by the server, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RetrievalError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(operation: Operation, source: reqwest::Error) -> Self {
        RetrievalError::Transport { operation, source }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        RetrievalError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RetrievalError::HttpStatus {
            operation: Operation::Submit,
            status: 400,
            body: r#"{"error":"bad url"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"retrieval submission failed: HTTP 400: {"error":"bad url"}"#
        );

        let err = RetrievalError::PollTimeout {
            request_id: "abc123".to_string(),
            attempts: 60,
        };
        assert_eq!(
            err.to_string(),
            "Timeout: job abc123 not finished after 60 polling attempts"
        );

        assert_eq!(
            RetrievalError::invalid_url("ftp://x", "must start with http:// or https://")
                .to_string(),
            "Invalid URL ftp://x: must start with http:// or https://"
        );

        assert_eq!(
            RetrievalError::MissingApiKey.to_string(),
            "Missing required parameter: api key"
        );
    }

    #[test]
    fn test_operation_and_status_accessors() {
        let err = RetrievalError::HttpStatus {
            operation: Operation::FetchContent,
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.operation(), Some(Operation::FetchContent));
        assert_eq!(err.http_status(), Some(404));

        let err = RetrievalError::PollTimeout {
            request_id: "x".to_string(),
            attempts: 1,
        };
        assert_eq!(err.operation(), Some(Operation::Poll));
        assert_eq!(err.http_status(), None);

        assert_eq!(RetrievalError::MissingApiKey.operation(), None);
    }

    #[test]
    fn test_decode_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = RetrievalError::Decode {
            operation: Operation::ListTools,
            source,
        };
        assert_eq!(err.to_string(), "tool discovery failed: could not decode response");
        assert!(std::error::Error::source(&err).is_some());
    }
}
