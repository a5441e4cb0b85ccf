//! Common types and utilities shared across ringscan crates.
//!
//! This crate holds the shared error type, output format selection, and the
//! observability helpers used by the binary and integration tests. It stays
//! dependency-light so every crate in the workspace can pull it in.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`RingscanError`] and [`Result`]: Shared error handling
//! - [`OutputFormat`]: How a finished scan is rendered
//!
//! # Examples
//!
//! ```rust
//! use ringscan_common::OutputFormat;
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//! assert_eq!(OutputFormat::default(), OutputFormat::Text);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Preferred output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block per URL, human readable.
    #[default]
    Text,
    /// The whole result set as a JSON array.
    Json,
}

impl FromStr for OutputFormat {
    type Err = RingscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(RingscanError::Config(format!(
                "unknown output format '{other}' (expected text or json)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Error types used across the ringscan system.
#[derive(thiserror::Error, Debug)]
pub enum RingscanError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The list of URLs to scan could not be assembled.
    #[error("Input error: {0}")]
    Input(String),

    /// The async runtime could not be created.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Convenient alias for results that use [`RingscanError`].
pub type Result<T> = std::result::Result<T, RingscanError>;
