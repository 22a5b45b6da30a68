//! Error type for the kiln pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure issuing a request or reading its response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: Box<ureq::Transport>,
    },

    /// Non-2xx response; the body is kept for diagnosis.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Detail payload is missing or mistypes a field the staging tables need.
    #[error("malformed payload: {0}")]
    Load(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A required pipeline step exited non-zero.
    #[error("{label} failed with {status}")]
    Subprocess {
        label: String,
        status: std::process::ExitStatus,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
