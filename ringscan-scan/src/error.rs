use ringscan_http::HttpError;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Why a single page produced no phone set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("HTTP status {status}")]
    Status { status: u16 },
    #[error("could not decode body: {0}")]
    Decode(String),
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
    #[error("task aborted: {0}")]
    TaskAborted(String),
    #[error("cancelled before completion")]
    Cancelled,
}

impl ScanError {
    /// Stable category name used in logs and rendered output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Fetch(_) | Self::Timeout { .. } | Self::Status { .. } => "fetch_failure",
            Self::Decode(_) => "decode_failure",
            Self::ClientSetup(_) => "client_setup",
            Self::TaskAborted(_) => "task_aborted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<HttpError> for ScanError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Url(message) => Self::InvalidUrl(message),
            HttpError::Build(message) => Self::ClientSetup(message),
            HttpError::Network(message) => Self::Fetch(message),
            HttpError::Timeout(after) => Self::Timeout {
                timeout_ms: after.as_millis() as u64,
            },
            HttpError::Status { status, .. } => Self::Status {
                status: status.as_u16(),
            },
            HttpError::Decode(message, _) => Self::Decode(message),
        }
    }
}

impl Serialize for ScanError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
