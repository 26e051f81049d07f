//! Unified error types for mixmash
//!
//! Error strategy:
//! - Transient errors (download, inference, catalog I/O): retried per-stage by
//!   the workflow, up to the retry cap, then converted to a failed session.
//! - Input/request/configuration errors: fatal, never retried.
//!
//! Workflow stages never bubble these directly; they record the message on the
//! session state so retry decisions stay data-driven.

use crate::types::MashupType;
use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF";

/// Top-level error type for mixmash operations
#[derive(Debug, Error)]
pub enum MixmashError {
    // =========================================================================
    // Fatal errors - bad input, never retried
    // =========================================================================
    #[error("Invalid input source '{input}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}")]
    InvalidInput { input: String, reason: String },

    #[error("Song not found in catalog: '{0}'")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration for {mashup_type} mashup: missing {field}")]
    MissingPrecondition {
        mashup_type: MashupType,
        field: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    // =========================================================================
    // Transient errors - retried per-stage by the workflow
    // =========================================================================
    #[error("Ingestion failed for '{input}': {reason}")]
    IngestionFailed { input: String, reason: String },

    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisFailed { path: PathBuf, reason: String },

    #[error("Engineering failed for {mashup_type} mashup: {reason}")]
    EngineeringFailed {
        mashup_type: MashupType,
        reason: String,
    },

    #[error("Catalog operation failed: {0}")]
    CatalogError(String),

    // =========================================================================
    // Plumbing
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for mixmash operations
pub type Result<T> = std::result::Result<T, MixmashError>;

impl MixmashError {
    /// Returns true if this error is transient (worth retrying the same stage)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MixmashError::IngestionFailed { .. }
                | MixmashError::AnalysisFailed { .. }
                | MixmashError::EngineeringFailed { .. }
                | MixmashError::CatalogError(_)
                | MixmashError::Io(_)
        )
    }

    /// Create an ingestion error with context
    pub fn ingestion(input: impl Into<String>, reason: impl Into<String>) -> Self {
        MixmashError::IngestionFailed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an analysis error with context
    pub fn analysis(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MixmashError::AnalysisFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error with context
    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        MixmashError::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
