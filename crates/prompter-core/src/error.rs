//! Error types for Prompter.
//!
//! Everything that can go wrong *before* a request is issued (bad config,
//! unreadable image) has its own descriptive variant. Everything that goes
//! wrong *during* the request collapses into a single [`GenerationError`].

use std::path::PathBuf;
use thiserror::Error;

/// Prefix used when a generation failure is rendered as display text.
pub const ERROR_MARKER: &str = "Error: ";

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while loading a user-supplied image.
#[derive(Error, Debug)]
pub enum ImageError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File could not be read
    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Not a JPEG or PNG
    #[error("Unsupported format for {path}: {format} (expected JPEG or PNG)")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoding took longer than the configured limit
    #[error("Decoding {path} timed out after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },
}

/// The single failure kind for a prompt generation call.
///
/// Authentication failures, network errors, service-side errors, malformed
/// responses and timeouts all end up here. The only structure kept is the
/// HTTP status code when the service answered with one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    /// Human-readable description of what went wrong
    pub message: String,
    /// HTTP status returned by the service, if any
    pub status_code: Option<u16>,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Render as the text shown in place of a prompt: `"Error: <details>"`.
    pub fn display_text(&self) -> String {
        if self.message.is_empty() {
            format!("{ERROR_MARKER}unknown failure")
        } else {
            format!("{ERROR_MARKER}{}", self.message)
        }
    }
}
