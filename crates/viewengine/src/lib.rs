//! ViewEngine - client for the ViewEngine web retrieval API
//!
//! This crate wraps the four MCP REST endpoints exposed by ViewEngine:
//! tool discovery, retrieval submission, status polling and page data
//! download.
//!
//! ## Retrieval flow
//!
//! A retrieval is a server-side job. The client submits a
//! [`RetrievalRequest`], receives a [`RetrievalAck`] carrying the job's
//! `requestId`, then polls with that id until the job reaches a terminal
//! [`RetrievalStatus`]. A completed job references its page data through
//! [`ContentInfo::page_data_url`], which [`RetrievalApi::fetch_content`]
//! downloads as an opaque blob.
//!
//! ```no_run
//! # async fn demo() -> Result<(), viewengine::RetrievalError> {
//! use viewengine::{RetrievalApi, RetrievalClient, RetrievalRequest};
//!
//! let client = RetrievalClient::builder().api_key("my-key").build()?;
//! let ack = client.submit_retrieval(&RetrievalRequest::new("https://example.com")).await?;
//! let result = client.poll_retrieval(&ack.request_id, &mut |_| {}).await?;
//! if let Some(content) = result.content {
//!     let page = client.fetch_content(&content.page_data_url).await?;
//!     println!("{} bytes", page.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
mod error;
mod poll;
mod types;

pub use client::{ClientBuilder, RetrievalApi, RetrievalClient};
pub use error::{Operation, RetrievalError};
pub use poll::{PollAttempt, PollOutcome, PollPolicy};
pub use types::{
    ContentInfo, Mode, RetrievalAck, RetrievalRequest, RetrievalResult, RetrievalStatus,
    ToolDescriptor,
};

use std::time::Duration;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.viewengine.io";

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("viewengine-rs/", env!("CARGO_PKG_VERSION"));

/// Server-side retrieval timeout sent with every submission
pub const RETRIEVAL_TIMEOUT_SECONDS: u32 = 60;

/// Default number of status polls before giving up
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Default wait between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default transport timeout for a single HTTP call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
