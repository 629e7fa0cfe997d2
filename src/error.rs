use crate::stages::ordering::Order;
use thiserror::Error;

/// Result type for stage and pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building stages or running a traversal
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage or pipeline was constructed with an argument outside its domain
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },

    /// An order-validating stage saw an element that breaks the required order
    #[error("Stage `{stage}` rejected element at position {position}: sequence is not {expected}")]
    OrderViolation {
        stage: String,
        position: u64,
        expected: Order,
    },

    /// The engine asked a stage to merge partial state it cannot merge
    #[error("Stage `{0}` cannot combine partial state")]
    NotCombinable(String),

    /// Stage execution error raised by caller-supplied logic
    #[error("Stage execution failed: {0}")]
    StageError(String),

    /// A parallel split panicked or could not be joined
    #[error("Thread join error: {0}")]
    ThreadError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Fails with [`PipelineError::InvalidArgument`] when `value` is zero.
pub(crate) fn ensure_positive(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(PipelineError::InvalidArgument {
            name,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("n", 3).unwrap(), 3);
        let err = ensure_positive("window_size", 0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidArgument { name: "window_size", .. }
        ));
    }

    #[test]
    fn test_order_violation_message() {
        let err = PipelineError::OrderViolation {
            stage: "validate".into(),
            position: 4,
            expected: Order::Increasing,
        };
        assert_eq!(
            err.to_string(),
            "Stage `validate` rejected element at position 4: sequence is not increasing"
        );
    }
}
