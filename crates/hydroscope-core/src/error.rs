//! Error types for the Hydroscope analysis service.
//!
//! Analysis failures carry a kind (client input vs. external service) so the
//! HTTP layer can pick a status code without inspecting messages. The
//! `Display` text of each analysis error is exactly the `detail` string
//! returned to callers.

use thiserror::Error;

/// Top-level error type for Hydroscope operations.
#[derive(Error, Debug)]
pub enum HydroscopeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

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

/// Coarse classification of an analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something we refuse to forward.
    ClientInput,
    /// The model call (or the client behind it) failed.
    ExternalService,
}

/// Failure of a single image analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Declared content type is missing or not `image/*`
    #[error("File is not a valid image or the Content-Type header is missing.")]
    InvalidContentType,

    /// Upload body could not be read to completion
    #[error("Could not read the image file.")]
    UnreadableUpload { message: String },

    /// The generative model call failed
    #[error("Error during Vertex AI API call: {message}")]
    Model {
        message: String,
        status_code: Option<u16>,
    },
}

impl AnalysisError {
    /// Build a model error without an HTTP status.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidContentType | Self::UnreadableUpload { .. } => ErrorKind::ClientInput,
            Self::Model { .. } => ErrorKind::ExternalService,
        }
    }
}

/// Convenience type alias for Hydroscope results.
pub type Result<T> = std::result::Result<T, HydroscopeError>;

/// Convenience type alias for analysis results.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
