//! Error types for specification generation.
//!
//! Generation is fail-fast: every variant here aborts the request. The
//! recoverable degradations (missing substitutions, failed reference
//! searches) never surface as errors; they are logged where they happen.

use thiserror::Error;

use testsmith_core::error::{ModelError, TestsmithError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while emitting text.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A literal shape uses a placeholder the renderer does not know.
    #[error("unknown placeholder '{placeholder}' in shape '{shape}'")]
    UnknownPlaceholder { placeholder: String, shape: String },

    /// An existing fixture method has no closing brace to insert before.
    #[error("fixture method '{name}' has no closing brace")]
    MalformedFixture { name: String },
}

/// Errors raised while opening the target artifact.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The target does not exist and the store may not create it.
    #[error("target '{name}' does not exist and cannot be created")]
    CreationRefused { name: String },

    /// The target exists but cannot be modified.
    #[error("target '{name}' is not writable")]
    NotWritable { name: String },
}

impl TargetError {
    pub fn target(&self) -> &str {
        match self {
            TargetError::CreationRefused { name } | TargetError::NotWritable { name } => name,
        }
    }
}

/// Errors that abort a generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A selected method fails the testability predicate.
    #[error("method '{method}' of {class} cannot be tested")]
    NotTestable { class: String, method: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

// ============================================================================
// Bridges: generation errors -> TestsmithError
// ============================================================================

impl From<RenderError> for TestsmithError {
    fn from(err: RenderError) -> Self {
        TestsmithError::RenderError {
            message: err.to_string(),
        }
    }
}

impl From<TargetError> for TestsmithError {
    fn from(err: TargetError) -> Self {
        TestsmithError::TargetError {
            target: err.target().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<GenerationError> for TestsmithError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::NotTestable { class, method } => {
                TestsmithError::NotTestable { class, method }
            }
            GenerationError::Render(e) => TestsmithError::from(e),
            GenerationError::Target(e) => TestsmithError::from(e),
            GenerationError::Model(e) => TestsmithError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testsmith_core::error::OutputErrorCode;

    #[test]
    fn bridges_keep_error_codes() {
        let not_testable = TestsmithError::from(GenerationError::NotTestable {
            class: "com.example.Calc".to_string(),
            method: "getTotal".to_string(),
        });
        assert_eq!(not_testable.error_code(), OutputErrorCode::GenerationAborted);

        let target = TestsmithError::from(GenerationError::from(TargetError::NotWritable {
            name: "com.example.CalcTest".to_string(),
        }));
        assert_eq!(target.error_code(), OutputErrorCode::ApplyError);
        match target {
            TestsmithError::TargetError { target, .. } => {
                assert_eq!(target, "com.example.CalcTest")
            }
            other => panic!("unexpected {:?}", other),
        }

        let model = TestsmithError::from(GenerationError::from(ModelError::ClassNotFound {
            name: "com.example.Missing".to_string(),
        }));
        assert_eq!(model.error_code(), OutputErrorCode::ResolutionError);

        let render = TestsmithError::from(GenerationError::from(RenderError::UnknownPlaceholder {
            placeholder: "<KEY>".to_string(),
            shape: "[<KEY>]".to_string(),
        }));
        assert_eq!(render.error_code(), OutputErrorCode::GenerationAborted);
    }
}
