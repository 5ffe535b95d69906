//! Error types for the demo CLI

use thiserror::Error;
use viewengine::RetrievalError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Reading a prompt answer or writing output failed
    #[error("Console I/O failed")]
    Io(#[from] std::io::Error),

    /// Error from the retrieval client that no step handled
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}
