use crate::domain::state::PaymentState;
use thiserror::Error;

/// Every failure the engine, parser and read loop can report.
///
/// Variants carry their context so callers branch on the kind instead of
/// matching on rendered text. The `Display` output is what the read loop
/// prints after the `ERROR ` prefix.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("payment {id} not found")]
    PaymentNotFound { id: String },
    #[error("invalid amount {value}: {reason}")]
    InvalidAmount { value: String, reason: String },
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: PaymentState,
        to: PaymentState,
    },
    #[error("create conflict for payment {id}: existing payment marked as FAILED")]
    CreateConflict { id: String },
    #[error("payment {id} already exists in state {state}")]
    DuplicatePayment { id: String, state: PaymentState },
    #[error("validation error for {field}: {message}")]
    ValidationError { field: String, message: String },
    #[error("malformed input: {reason}")]
    MalformedCommand { reason: String },
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },
    #[error("insufficient arguments for {command}: expected {expected}, got {got}")]
    InsufficientArguments {
        command: String,
        expected: usize,
        got: usize,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;

impl PaymentError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::PaymentNotFound { id: id.into() }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
