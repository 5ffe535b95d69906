//! Interactive walkthrough: discover → submit → poll → download
//!
//! Each step reports its own failure and the walkthrough stops cleanly.
//! Only console I/O errors, or client errors no step expects, escape to
//! [`Demo::run`], which prints them with their cause chain.

use std::io::{self, Write};

use tracing::debug;
use viewengine::{
    ContentInfo, Mode, PollAttempt, PollOutcome, RetrievalApi, RetrievalError, RetrievalRequest,
    RetrievalResult,
};

use crate::display::{
    error_chain, render_page_data, truncate_preview, BANNER, PREVIEW_CHARS, SEPARATOR,
};
use crate::error::CliError;
use crate::prompt::Prompter;

/// URL retrieved when the prompt is left blank
pub const DEFAULT_URL: &str = "https://example.com";

/// Answers given on the command line; `None` means ask interactively
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub url: Option<String>,
    pub force_refresh: Option<bool>,
    pub mode: Option<Mode>,
    pub download: Option<bool>,
}

/// Where the walkthrough stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All steps ran
    Completed,
    /// The server rejected the retrieval request
    SubmissionFailed,
    /// Polling budget ran out
    PollTimedOut,
    /// Job ended as failed or canceled
    RetrievalUnsuccessful,
    /// An unhandled error ended the run
    Aborted,
}

pub struct Demo<'a, A: ?Sized, P, W> {
    api: &'a A,
    prompter: P,
    out: W,
    presets: Presets,
}

impl<'a, A, P, W> Demo<'a, A, P, W>
where
    A: RetrievalApi + ?Sized,
    P: Prompter,
    W: Write + Send,
{
    pub fn new(api: &'a A, prompter: P, out: W, presets: Presets) -> Self {
        Self {
            api,
            prompter,
            out,
            presets,
        }
    }

    /// Run the walkthrough, reporting any escaping error instead of failing
    pub async fn run(&mut self) -> Outcome {
        if let Err(e) = writeln!(self.out, "{}\n", BANNER) {
            debug!(error = %e, "Failed to write banner");
        }

        match self.run_steps().await {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(write_err) = self.report_error(&e) {
                    debug!(error = %write_err, "Failed to write error report");
                }
                Outcome::Aborted
            }
        }
    }

    fn report_error(&mut self, err: &CliError) -> io::Result<()> {
        writeln!(self.out, "❌ Error: {}\n", err)?;
        let chain = error_chain(err);
        if !chain.is_empty() {
            writeln!(self.out, "Caused by:")?;
            for (depth, cause) in chain.iter().enumerate() {
                writeln!(self.out, "   {}: {}", depth, cause)?;
            }
        }
        Ok(())
    }

    async fn run_steps(&mut self) -> Result<Outcome, CliError> {
        self.discover_tools().await?;
        writeln!(self.out, "\n{}\n", SEPARATOR)?;

        let request = self.gather_request()?;

        writeln!(
            self.out,
            "\n🌐 Step 2: Submitting retrieval request for {}...",
            request.url
        )?;
        if request.force_refresh {
            writeln!(self.out, "   (Forcing fresh retrieval, bypassing cache)")?;
        } else {
            writeln!(self.out, "   (Will use cached results if available)")?;
        }
        writeln!(self.out, "   Mode: {}\n", request.mode)?;

        let ack = match self.api.submit_retrieval(&request).await {
            Ok(ack) => ack,
            Err(e) => {
                writeln!(self.out, "{}", describe_failure(&e))?;
                writeln!(self.out, "❌ Failed to submit retrieval request")?;
                return Ok(Outcome::SubmissionFailed);
            }
        };

        writeln!(self.out, "✅ Request submitted successfully!")?;
        writeln!(self.out, "   Request ID: {}", ack.request_id)?;
        writeln!(self.out, "   Status: {}", ack.status)?;
        writeln!(
            self.out,
            "   Estimated wait: {}s",
            ack.estimated_wait_time_seconds
        )?;

        writeln!(self.out, "\n{}\n", SEPARATOR)?;
        writeln!(
            self.out,
            "⏳ Step 3: Polling for results (this may take a while)...\n"
        )?;

        let result = {
            let out = &mut self.out;
            let mut report = |attempt: &PollAttempt| {
                if let Err(e) = write_attempt(out, attempt) {
                    debug!(error = %e, attempt = attempt.attempt, "Failed to write progress");
                }
            };
            self.api.poll_retrieval(&ack.request_id, &mut report).await
        };

        let result = match result {
            Ok(result) => result,
            Err(RetrievalError::PollTimeout { attempts, .. }) => {
                debug!(attempts, "Polling gave up");
                writeln!(self.out, "⚠️  Timeout: Maximum polling attempts reached")?;
                writeln!(self.out, "❌ Failed to get results")?;
                return Ok(Outcome::PollTimedOut);
            }
            Err(e) => return Err(e.into()),
        };

        if result.status.is_unsuccessful() {
            writeln!(
                self.out,
                "   Error: {}",
                result.error.as_deref().unwrap_or("(no error reported)")
            )?;
            writeln!(self.out, "❌ Retrieval {}", result.status)?;
            return Ok(Outcome::RetrievalUnsuccessful);
        }

        self.report_result(&result)?;
        if let Some(content) = &result.content {
            self.offer_download(content).await?;
        }

        writeln!(self.out, "\n{}\n", SEPARATOR)?;
        writeln!(self.out, "✅ Demo completed successfully!")?;
        Ok(Outcome::Completed)
    }

    async fn discover_tools(&mut self) -> Result<(), CliError> {
        writeln!(self.out, "🔍 Step 1: Discovering available MCP tools...\n")?;

        let tools = match self.api.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                writeln!(self.out, "Error getting tools: {}", describe_failure(&e))?;
                Vec::new()
            }
        };

        if tools.is_empty() {
            writeln!(self.out, "⚠️  No tools found or API not responding")?;
        } else {
            writeln!(self.out, "✅ Found {} available tools:", tools.len())?;
            for tool in &tools {
                writeln!(self.out, "   • {}: {}", tool.name, tool.description)?;
            }
        }
        Ok(())
    }

    fn gather_request(&mut self) -> Result<RetrievalRequest, CliError> {
        let url = match self.presets.url.clone() {
            Some(url) => url,
            None => self.prompter.ask_or(
                "Enter a URL to retrieve (or press Enter for example.com)",
                DEFAULT_URL,
            )?,
        };

        let force_refresh = match self.presets.force_refresh {
            Some(force) => force,
            None => self.prompter.confirm(
                "Force fresh retrieval? (default: n - use cache if available)",
            )?,
        };

        let mode = match self.presets.mode {
            Some(mode) => mode,
            None => Mode::from_input(
                &self
                    .prompter
                    .ask("Processing mode (private/community, default: private)")?,
            ),
        };

        Ok(RetrievalRequest::new(url)
            .force_refresh(force_refresh)
            .mode(mode))
    }

    fn report_result(&mut self, result: &RetrievalResult) -> io::Result<()> {
        writeln!(self.out, "✅ Retrieval completed!")?;
        writeln!(self.out, "   Status: {}", result.status)?;
        writeln!(self.out, "   URL: {}", result.url)?;
        writeln!(
            self.out,
            "   Completed at: {}",
            result.completed_at.as_deref().unwrap_or("-")
        )?;

        let Some(content) = &result.content else {
            return Ok(());
        };

        writeln!(self.out, "\n📄 Content available:")?;
        writeln!(self.out, "   Page Data URL: {}", content.page_data_url)?;
        writeln!(self.out, "   Content Hash: {}", content.content_hash)?;
        if !content.artifacts.is_empty() {
            let names: Vec<&str> = content.artifacts.keys().map(String::as_str).collect();
            writeln!(self.out, "   Artifacts: {}", names.join(", "))?;
        }
        if !content.metrics.is_empty() {
            let names: Vec<&str> = content.metrics.keys().map(String::as_str).collect();
            writeln!(self.out, "   Metrics: {}", names.join(", "))?;
        }
        Ok(())
    }

    async fn offer_download(&mut self, content: &ContentInfo) -> Result<(), CliError> {
        let download = match self.presets.download {
            Some(download) => download,
            None => self.prompter.confirm("Download page content?")?,
        };
        if !download {
            return Ok(());
        }

        writeln!(self.out, "\n⬇️  Downloading page content...")?;
        let body = match self.api.fetch_content(&content.page_data_url).await {
            Ok(body) => body,
            Err(e) => {
                writeln!(
                    self.out,
                    "Error downloading page data: {}",
                    describe_failure(&e)
                )?;
                return Ok(());
            }
        };

        let preview = truncate_preview(&render_page_data(&body), PREVIEW_CHARS);
        writeln!(
            self.out,
            "\n📄 Page Content (first {} chars):",
            PREVIEW_CHARS
        )?;
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, "{}", preview)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        Ok(())
    }
}

fn write_attempt(out: &mut impl Write, attempt: &PollAttempt) -> io::Result<()> {
    match &attempt.outcome {
        PollOutcome::Status { status, message } => writeln!(
            out,
            "   {} Status: {} - {}",
            attempt.counter(),
            status,
            message
        ),
        PollOutcome::Error(error) => writeln!(out, "   {} {}", attempt.counter(), error),
    }
}

/// One-line description of a failed step, with the raw body for HTTP errors
fn describe_failure(err: &RetrievalError) -> String {
    match err {
        RetrievalError::HttpStatus { status, body, .. } if body.is_empty() => {
            format!("HTTP {}", status)
        }
        RetrievalError::HttpStatus { status, body, .. } => {
            format!("API Error ({}): {}", status, body)
        }
        other => {
            let mut message = other.to_string();
            for cause in error_chain(other) {
                message.push_str(": ");
                message.push_str(&cause);
            }
            message
        }
    }
}
