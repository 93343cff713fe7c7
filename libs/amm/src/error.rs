//! Typed errors for the weighted math core
//!
//! Every quote function fails with a specific kind rather than a generic
//! failure, so callers can distinguish a formula-precondition violation
//! (`InvalidQuote`) from an out-of-domain argument (`InvalidParameter`)
//! without string matching.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the weighted constant-value quote functions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// A formula precondition is violated (extracting at or beyond a reserve,
    /// degenerate pool state, numeric overflow inside the power series)
    #[error("invalid quote: {reason}")]
    InvalidQuote { reason: String },

    /// A caller-supplied argument is outside its allowed domain
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Decimal,
        reason: &'static str,
    },
}

impl MathError {
    pub(crate) fn quote(reason: impl Into<String>) -> Self {
        MathError::InvalidQuote {
            reason: reason.into(),
        }
    }
}
