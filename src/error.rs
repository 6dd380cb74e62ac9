//! Error taxonomy for the evaluation engine.
//!
//! Every engine handler reports the first applicable code from this closed
//! set; failures surfaced by the external variable store are passed through
//! verbatim as [`EvalError::Store`].

use thiserror::Error;

/// Failure reported by the external variable store.
///
/// The store is a separate process; its error text is carried through
/// unchanged rather than being re-classified here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// An evaluation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A required node (operand or result) was missing.
    #[error("invalid argument")]
    InvalidArgument,

    /// No handler for the operation, or the operand type is not supported
    /// by the handler. Carries the operation name for diagnostics.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Timer id out of range, or an identifier could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// String buffer growth failed.
    #[error("out of memory")]
    OutOfMemory,

    /// Integer or float division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// Passthrough failure from the external variable store.
    #[error("variable store: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text() {
        assert_eq!(EvalError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(
            EvalError::Unsupported("Band").to_string(),
            "unsupported operation: Band"
        );
        assert_eq!(
            EvalError::NotFound("timer id 300".into()).to_string(),
            "not found: timer id 300"
        );
    }

    #[test]
    fn store_error_passes_through() {
        let e: EvalError = StoreError("var server gone".into()).into();
        assert_eq!(e.to_string(), "variable store: var server gone");
    }
}
