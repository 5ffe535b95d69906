//! Console rendering helpers

use serde_json::Value;

/// Horizontal rule between walkthrough steps
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Characters of page data shown after a download
pub const PREVIEW_CHARS: usize = 500;

pub const BANNER: &str = "\
╔══════════════════════════════════════════════════════════╗
║          ViewEngine REST API Demo (Rust)                 ║
║  Demonstrates using the MCP endpoints with an API key    ║
╚══════════════════════════════════════════════════════════╝";

/// Pretty-print a page data document
///
/// JSON bodies are re-serialized with indentation; anything else is shown
/// as (lossy) UTF-8 text.
pub fn render_page_data(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

/// Cut `text` to at most `limit` characters, marking the cut with `...`
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Render the chain of `source()` errors below a top-level error
pub fn error_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
