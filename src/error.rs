//! Error taxonomy
//!
//! | kind          | raised by                          | recovery                         |
//! |---------------|------------------------------------|----------------------------------|
//! | NotFound      | record lookup                      | terminal for the page, go home   |
//! | Validation    | incident time checks               | inline on the field, edit again  |
//! | Service       | predict / upload / summary calls   | dialog, dismiss and retry        |
//! | Config        | startup                            | fix configuration                |
//!
//! Missing report labels are not an error; see `report::parser`.

use std::path::PathBuf;

/// Failures talking to the Prediction Service.
///
/// `Display` is the message shown in the error dialog, so server-provided
/// text is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// `GET /record/{id}` returned 404 or an empty body.
    #[error("No record found for Policy ID: {policy_id}")]
    NotFound { policy_id: String },

    /// Non-2xx response; `message` is the server's detail or body text.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection refused, DNS failure, TLS error, ...
    #[error("{0}")]
    Transport(String),

    /// 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// No response within the configured timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The dataset file to upload could not be read.
    #[error("Cannot read {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Configuration could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL '{0}' cannot carry path segments")]
    UnusableUrl(String),

    #[error("Invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}
