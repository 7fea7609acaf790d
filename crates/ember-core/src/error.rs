//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    /// A particle pool or output buffer could not be reserved.
    #[error("Allocation error: could not reserve {capacity} particle slots ({reason})")]
    AllocationError { capacity: usize, reason: String },

    /// A system was handed over before its pool was allocated.
    #[error("System not initialized: {0}")]
    NotInitialized(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl EmberError {
    /// Build an `AllocationError` from a failed `try_reserve`
    pub fn allocation(capacity: usize, err: std::collections::TryReserveError) -> Self {
        EmberError::AllocationError {
            capacity,
            reason: err.to_string(),
        }
    }
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for EmberError {
    fn from(err: toml::ser::Error) -> Self {
        EmberError::TomlSerError(err.to_string())
    }
}
