use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP error {0}")]
    HttpStatus(u16),
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Discord max dispatch count reached")]
    CapacityExceeded,
    #[error("Discord initialization failed: {0}")]
    InitializationFailed(String),
    #[error("Can't open {}: {source}. Discord integration disabled", .path.display())]
    ConfigurationMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
