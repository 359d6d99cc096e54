//! Error types shared across Homestead crates.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors.
///
/// Any of these aborts farm startup: the farm is not constructed rather than
/// run in an inconsistent state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A field holds a value that cannot be clamped into range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// More starter plots requested than the capacity allows
    #[error("Initial unlocked plots ({initial}) exceed max farm plots ({max})")]
    InitialExceedsCapacity {
        /// Requested starter plots
        initial: usize,
        /// Configured capacity
        max: usize,
    },

    /// No usable crop definitions and the built-in fallback is disabled
    #[error("Crop catalog is empty and the built-in fallback is disabled")]
    EmptyCatalog,
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InitialExceedsCapacity { initial: 8, max: 4 };
        assert_eq!(
            err.to_string(),
            "Initial unlocked plots (8) exceed max farm plots (4)"
        );

        let err = ConfigError::InvalidValue {
            field: "update_interval",
            reason: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("update_interval"));
    }
}
