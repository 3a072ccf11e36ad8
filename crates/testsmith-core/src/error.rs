//! Error types and error code constants for testsmith.
//!
//! This module provides the subsystem errors raised while extracting the
//! semantic model, plus a unified error type (`TestsmithError`) that bridges
//! domain-specific errors from core and the generators into a common format
//! suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (class under test or target not found)
//! - `4`: Apply errors (target artifact cannot be created or written)
//! - `6`: Generation aborted (a selected method cannot be tested, a template failed)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Recoverable vs fatal
//!
//! [`ProviderError`] is absorbed inside the model: a failed cross-reference
//! search is logged and treated as "no match". [`ModelError`] and everything
//! raised by the generators abort the request.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Subsystem Errors
// ============================================================================

/// Failures reported by a [`crate::adapter::SymbolProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A cross-reference search could not complete.
    #[error("reference search failed in {owner}.{method}: {reason}")]
    SearchFailed {
        owner: String,
        method: String,
        reason: String,
    },
}

/// Errors raised while extracting the semantic model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The class under test is not known to the provider.
    #[error("class under test '{name}' not found")]
    ClassNotFound { name: String },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (class not found, target missing).
    ResolutionError = 3,
    /// Apply errors (target artifact cannot be created or written).
    ApplyError = 4,
    /// Generation aborted (untestable selection, render failure).
    GenerationAborted = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered
/// as JSON. Each variant carries enough context for a helpful message and
/// an optional `details` object.
#[derive(Debug, Error)]
pub enum TestsmithError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The class under test is unknown.
    #[error("class not found: {name}")]
    ClassNotFound { name: String },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A selected method failed the testability predicate.
    #[error("method '{method}' of {class} cannot be tested; generation aborted")]
    NotTestable { class: String, method: String },

    /// Emitting text for a method or the class failed.
    #[error("render error: {message}")]
    RenderError { message: String },

    /// The target artifact could not be created or made writable.
    #[error("target error: {message}")]
    TargetError { message: String, target: String },

    /// Configuration could not be loaded.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TestsmithError> for OutputErrorCode {
    fn from(err: &TestsmithError) -> Self {
        match err {
            TestsmithError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TestsmithError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            TestsmithError::ClassNotFound { .. } => OutputErrorCode::ResolutionError,
            TestsmithError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TestsmithError::TargetError { .. } => OutputErrorCode::ApplyError,
            TestsmithError::NotTestable { .. } => OutputErrorCode::GenerationAborted,
            TestsmithError::RenderError { .. } => OutputErrorCode::GenerationAborted,
            TestsmithError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TestsmithError> for OutputErrorCode {
    fn from(err: TestsmithError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: core errors -> TestsmithError
// ============================================================================

impl From<ModelError> for TestsmithError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ClassNotFound { name } => TestsmithError::ClassNotFound { name },
        }
    }
}

impl From<ConfigError> for TestsmithError {
    fn from(err: ConfigError) -> Self {
        TestsmithError::ConfigError {
            message: err.to_string(),
        }
    }
}

impl From<ProviderError> for TestsmithError {
    fn from(err: ProviderError) -> Self {
        TestsmithError::InternalError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TestsmithError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TestsmithError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        TestsmithError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        TestsmithError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TestsmithError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn class_not_found_maps_to_resolution_error() {
            let err: TestsmithError = ModelError::ClassNotFound {
                name: "com.example.Missing".to_string(),
            }
            .into();
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::ResolutionError
            );
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn invalid_arguments_maps_to_invalid_arguments() {
            let err = TestsmithError::invalid_args("no methods selected");
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn not_testable_maps_to_generation_aborted() {
            let err = TestsmithError::NotTestable {
                class: "com.example.Account".to_string(),
                method: "getBalance".to_string(),
            };
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::GenerationAborted
            );
            assert_eq!(err.error_code().code(), 6);
        }

        #[test]
        fn target_error_maps_to_apply_error() {
            let err = TestsmithError::TargetError {
                message: "read-only".to_string(),
                target: "AccountSpec".to_string(),
            };
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = TestsmithError::internal("unexpected state");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }

        #[test]
        fn provider_search_failure_is_internal_when_surfaced() {
            let err: TestsmithError = ProviderError::SearchFailed {
                owner: "A".to_string(),
                method: "m".to_string(),
                reason: "index not ready".to_string(),
            }
            .into();
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn not_testable_display() {
            let err = TestsmithError::NotTestable {
                class: "com.example.Account".to_string(),
                method: "getBalance".to_string(),
            };
            assert_eq!(
                err.to_string(),
                "method 'getBalance' of com.example.Account cannot be tested; generation aborted"
            );
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(format!("{}", OutputErrorCode::InvalidArguments), "2");
            assert_eq!(format!("{}", OutputErrorCode::GenerationAborted), "6");
        }
    }
}
