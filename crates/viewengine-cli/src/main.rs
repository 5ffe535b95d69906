//! ViewEngine demo CLI - walks through the MCP retrieval endpoints

mod demo;
mod display;
mod error;
mod prompt;

use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use viewengine::{
    Mode, PollPolicy, RetrievalClient, DEFAULT_BASE_URL, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};

use crate::demo::{Demo, Presets};
use crate::prompt::{ConsolePrompter, Prompter};

/// ViewEngine REST API demo - discover tools, retrieve a page, poll, download
#[derive(Parser, Debug)]
#[command(name = "viewengine-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API key (prompted for when omitted)
    #[arg(env = "VIEWENGINE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(long, env = "VIEWENGINE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// URL to retrieve (skips the prompt)
    #[arg(long)]
    url: Option<String>,

    /// Bypass the server cache: true or false (skips the prompt)
    #[arg(long, value_name = "BOOL")]
    force_refresh: Option<bool>,

    /// Processing mode: private or community (skips the prompt)
    #[arg(long)]
    mode: Option<Mode>,

    /// Download page data when done: true or false (skips the prompt)
    #[arg(long, value_name = "BOOL")]
    download: Option<bool>,

    /// Maximum number of status polls
    #[arg(long, default_value_t = DEFAULT_MAX_POLL_ATTEMPTS)]
    max_attempts: u32,

    /// Seconds between status polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let api_key = match cli.api_key.clone() {
        Some(key) => key,
        None => ConsolePrompter::new()
            .ask_secret("Enter your API key")
            .unwrap_or_else(|e| {
                debug!(error = %e, "API key prompt failed");
                String::new()
            }),
    };

    if api_key.trim().is_empty() {
        eprintln!("❌ Error: API key is required\n");
        eprintln!("Usage:");
        eprintln!("  viewengine-demo <api-key>");
        eprintln!("  OR");
        eprintln!("  viewengine-demo   (you'll be prompted for the API key)");
        std::process::exit(1);
    }

    let client = RetrievalClient::builder()
        .api_key(api_key)
        .base_url(&cli.base_url)
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .poll_policy(PollPolicy::new(
            cli.max_attempts,
            Duration::from_secs(cli.poll_interval_secs),
        ))
        .build();

    let client = match client {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };
    debug!(?client, "Client ready");

    let presets = Presets {
        url: cli.url,
        force_refresh: cli.force_refresh,
        mode: cli.mode,
        download: cli.download,
    };

    let outcome = Demo::new(&client, ConsolePrompter::new(), io::stdout(), presets)
        .run()
        .await;
    debug!(?outcome, "Demo finished");

    if io::stdin().is_terminal() {
        println!();
        if let Err(e) = ConsolePrompter::new().ask("Press Enter to exit") {
            debug!(error = %e, "Exit prompt failed");
        }
    }
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "viewengine=debug,viewengine_demo=debug"
    } else {
        "warn"
    }
}

/// Send logs to stderr; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["viewengine-demo", "my-key"]).unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("my-key"));
        assert_eq!(cli.max_attempts, 60);
        assert_eq!(cli.poll_interval_secs, 2);
        assert!(cli.url.is_none());
        assert!(cli.mode.is_none());
    }

    #[test]
    fn test_presets_parse() {
        let cli = Cli::try_parse_from([
            "viewengine-demo",
            "my-key",
            "--url",
            "https://example.org",
            "--force-refresh",
            "true",
            "--mode",
            "community",
            "--download",
            "false",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://example.org"));
        assert_eq!(cli.force_refresh, Some(true));
        assert_eq!(cli.mode, Some(Mode::Community));
        assert_eq!(cli.download, Some(false));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(
            default_filter(true),
            "viewengine=debug,viewengine_demo=debug"
        );
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Cli::try_parse_from(["viewengine-demo", "k", "--mode", "public"]);
        assert!(result.is_err());
    }
}
