use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("no rectangle drawn yet")]
    NoSelection,

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid seek request: {0}")]
    InvalidSeek(String),

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("malformed probe output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deface exited with {status}: {stderr}")]
    Deface { status: ExitStatus, stderr: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
