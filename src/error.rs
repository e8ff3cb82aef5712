//! Error types for multisample
//!
//! Shape and type failures are raised by inference before any sampling runs.
//! Parameter failures come from the distribution constructors and carry the
//! element index that produced them.

use thiserror::Error;

/// Result type alias using the library's error
pub type Result<T> = std::result::Result<T, SampleError>;

/// Errors that can occur while inferring or running a sampling operator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// Shapes disagree where they must be identical
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Parameter shapes cannot be broadcast together
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// The configured sample shape has a zero dimension
    #[error("Invalid sample shape {shape:?}: every dimension must be non-zero")]
    InvalidSampleShape {
        /// The rejected sample shape
        shape: Vec<usize>,
    },

    /// Element types are unresolved, inconsistent, or not allowed for the output
    #[error("Type mismatch: {reason}")]
    TypeMismatch {
        /// What went wrong
        reason: String,
    },

    /// Operator called with the wrong number of input arrays
    #[error("Operator '{op}' expects {expected} input(s), got {got}")]
    WrongInputCount {
        /// Operator name
        op: &'static str,
        /// Declared number of inputs
        expected: usize,
        /// Number of inputs supplied
        got: usize,
    },

    /// The underlying distribution rejected a parameter value
    #[error("Invalid parameter for {distribution} at element {index}: {reason}")]
    InvalidParameter {
        /// Distribution name
        distribution: &'static str,
        /// Flat index of the parameter element
        index: usize,
        /// Reason reported by the distribution
        reason: String,
    },

    /// The shared random engine lock was poisoned by a panicking holder
    #[error("Random engine resource is unavailable (lock poisoned)")]
    EngineUnavailable,

    /// Worker pool for parallel execution could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl SampleError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::BroadcastError {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the shape-inference class
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::BroadcastError { .. } | Self::InvalidSampleShape { .. }
        )
    }

    /// Attach the failing element index to a parameter error
    pub(crate) fn at_index(self, at: usize) -> Self {
        match self {
            Self::InvalidParameter {
                distribution,
                reason,
                ..
            } => Self::InvalidParameter {
                distribution,
                index: at,
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_class() {
        assert!(SampleError::broadcast(&[3], &[2]).is_shape_error());
        assert!(SampleError::shape_mismatch(&[2], &[3]).is_shape_error());
        assert!(SampleError::InvalidSampleShape { shape: vec![0] }.is_shape_error());
        assert!(!SampleError::type_mismatch("x").is_shape_error());
    }

    #[test]
    fn test_at_index_rewrites_parameter_errors_only() {
        let err = SampleError::InvalidParameter {
            distribution: "gamma",
            index: 0,
            reason: "shape too small".to_string(),
        };
        match err.at_index(7) {
            SampleError::InvalidParameter { index, .. } => assert_eq!(index, 7),
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(
            SampleError::EngineUnavailable.at_index(3),
            SampleError::EngineUnavailable
        );
    }

    #[test]
    fn test_display_messages() {
        let err = SampleError::broadcast(&[3], &[2]);
        assert_eq!(err.to_string(), "Cannot broadcast shapes [3] and [2]");

        let err = SampleError::WrongInputCount {
            op: "sample_uniform",
            expected: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "Operator 'sample_uniform' expects 2 input(s), got 1");
    }
}
