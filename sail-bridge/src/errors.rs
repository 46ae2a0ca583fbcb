//! Error types for the frame bridge.

use crate::library::LibraryOp;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Status code returned across the C/JNI boundary on success.
pub const STATUS_OK: i32 = 0;

/// Errors that can occur while setting up a session or submitting frames.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A frame was submitted before `setup` completed.
    #[error("Bridge not initialized: call setup before submitting frames")]
    NotInitialized,

    /// The submitted frame does not match the configured frame size.
    #[error("Frame size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The streaming library reported a failure.
    #[error("{op} failed with status {status}")]
    CollaboratorFailure { op: LibraryOp, status: i32 },

    /// The library handed out a writable buffer smaller than one frame.
    #[error("Library buffer too small: need {expected} bytes, buffer holds {actual}")]
    BufferUndersized { expected: usize, actual: usize },

    /// Caller passed out-of-range setup values or a null frame pointer.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("{0}")]
    Invalid(String),
}

impl BridgeError {
    /// Integer status reported to foreign callers. Always negative.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            Self::NotInitialized => -1,
            Self::SizeMismatch { .. } => -2,
            Self::CollaboratorFailure { .. } => -3,
            Self::BufferUndersized { .. } => -4,
            Self::InvalidParameters(_) => -5,
            Self::Config(_) => -6,
        }
    }

    /// Returns true if the caller can fix this error by changing its inputs.
    ///
    /// Collaborator and environment failures are not caller errors.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized | Self::SizeMismatch { .. } | Self::InvalidParameters(_)
        )
    }
}

/// Converts a bridge result into the status code handed to foreign callers.
pub fn status_of(result: Result<(), BridgeError>) -> i32 {
    match result {
        Ok(()) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_distinct_and_negative() {
        let errors = [
            BridgeError::NotInitialized,
            BridgeError::SizeMismatch {
                expected: 4,
                actual: 3,
            },
            BridgeError::CollaboratorFailure {
                op: LibraryOp::SwapAndNextBuffer,
                status: -1,
            },
            BridgeError::BufferUndersized {
                expected: 4,
                actual: 3,
            },
            BridgeError::InvalidParameters("width".to_string()),
            BridgeError::Config(ConfigError::Invalid("name".to_string())),
        ];

        let mut codes: Vec<i32> = errors.iter().map(BridgeError::status_code).collect();
        assert!(codes.iter().all(|&c| c < STATUS_OK));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_error_categorization() {
        assert!(BridgeError::NotInitialized.is_caller_error());
        assert!(BridgeError::SizeMismatch {
            expected: 8,
            actual: 4
        }
        .is_caller_error());
        assert!(!BridgeError::CollaboratorFailure {
            op: LibraryOp::CreateSession,
            status: 3
        }
        .is_caller_error());
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::SizeMismatch {
            expected: 8_294_400,
            actual: 100,
        };
        assert_eq!(
            err.to_string(),
            "Frame size mismatch: expected 8294400 bytes, got 100"
        );

        let err = BridgeError::CollaboratorFailure {
            op: LibraryOp::ProcessMessages,
            status: -2,
        };
        assert_eq!(err.to_string(), "processMessages failed with status -2");
    }

    #[test]
    fn test_config_error_keeps_source() {
        use std::error::Error as _;

        let err = BridgeError::from(ConfigError::Read {
            path: PathBuf::from("/etc/sail.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        });
        assert_eq!(err.status_code(), -6);
        assert_eq!(
            err.to_string(),
            "Configuration error: Failed to read config file '/etc/sail.toml': missing"
        );

        let io_err = err
            .source()
            .and_then(|e| e.source())
            .and_then(|e| e.downcast_ref::<io::Error>());
        assert_eq!(io_err.map(io::Error::kind), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_status_of() {
        assert_eq!(status_of(Ok(())), STATUS_OK);
        assert_eq!(status_of(Err(BridgeError::NotInitialized)), -1);
    }
}
