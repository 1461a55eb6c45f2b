use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Dimension mismatch in {context}: expected {expected} values but got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The solver stopped without converging. `best_weights` is the best
    /// feasible iterate seen, so callers can still fall back to it.
    #[error("Optimization failed after {iterations} iterations: {message}")]
    OptimizationFailed {
        iterations: u32,
        best_weights: Vec<Decimal>,
        message: String,
    },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(e: serde_json::Error) -> Self {
        PortfolioError::SerializationError(e.to_string())
    }
}
