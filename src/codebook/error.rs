//! Error types for codebook operations
//!
//! All fallible codebook, data, and learning operations report through
//! [`CodebookError`] so callers can match on the failure instead of
//! unwinding.

use std::fmt;

use crate::solver::SolverError;

/// Result type alias for codebook operations
pub type CodebookResult<T> = Result<T, CodebookError>;

/// Error type covering codebook construction, coding, and learning
#[derive(Debug, Clone, PartialEq)]
pub enum CodebookError {
    /// Invalid configuration parameter
    InvalidConfiguration {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch between frames, basis vectors, or activations
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    /// Empty frame collection or candidate set
    EmptyCollection { collection: String },

    /// Numerical failure in a least-squares or coding solve
    Numerical { operation: String, details: String },

    /// Sparse-coding solver failure
    Solver(SolverError),
}

impl fmt::Display for CodebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodebookError::InvalidConfiguration {
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid configuration for parameter '{}' with value '{}': {}",
                    parameter, value, reason
                )
            }
            CodebookError::DimensionMismatch {
                expected,
                got,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch in {}: expected {}, got {}",
                    context, expected, got
                )
            }
            CodebookError::EmptyCollection { collection } => {
                write!(f, "Empty collection: {}", collection)
            }
            CodebookError::Numerical { operation, details } => {
                write!(f, "Numerical failure in {}: {}", operation, details)
            }
            CodebookError::Solver(err) => write!(f, "Sparse coding failed: {}", err),
        }
    }
}

impl std::error::Error for CodebookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodebookError::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SolverError> for CodebookError {
    fn from(err: SolverError) -> Self {
        CodebookError::Solver(err)
    }
}

// Convenience constructors for common error patterns
impl CodebookError {
    /// Create an invalid configuration error
    pub fn invalid_config(
        parameter: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodebookError::InvalidConfiguration {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: usize, got: usize, context: impl Into<String>) -> Self {
        CodebookError::DimensionMismatch {
            expected,
            got,
            context: context.into(),
        }
    }

    /// Create an empty collection error
    pub fn empty_collection(collection: impl Into<String>) -> Self {
        CodebookError::EmptyCollection {
            collection: collection.into(),
        }
    }

    /// Create a numerical failure error
    pub fn numerical(operation: impl Into<String>, details: impl Into<String>) -> Self {
        CodebookError::Numerical {
            operation: operation.into(),
            details: details.into(),
        }
    }
}
