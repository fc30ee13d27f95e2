//! Error types for pattern generation.
//!
//! Engines surface every failure synchronously; nothing here is retried.
//! Degenerate inputs (no seeds, no attractors, no nodes) are not errors.

use thiserror::Error;

/// Main error type for `pattern-core` operations.
#[derive(Error, Debug)]
pub enum PatternError {
    /// A supplied grid does not match the engine's configured shape.
    #[error("{field} field shape {actual:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The requested compute backend is not compiled in.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML configuration could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias for `pattern-core` operations.
pub type Result<T> = std::result::Result<T, PatternError>;

impl PatternError {
    /// Creates a new invalid configuration error.
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a new backend unavailable error.
    #[must_use]
    pub fn backend_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::BackendUnavailable(msg.into())
    }
}
