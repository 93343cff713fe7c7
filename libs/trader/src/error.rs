//! Typed rejection taxonomy for guarded trading operations
//!
//! Every public operation either succeeds with the ledger's confirmation
//! record or fails with exactly one of these kinds. A rejection always means
//! "no action taken": either no collaborator call was issued at all, or the
//! single call that was issued failed with no compensating action implied.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tidepool_amm::MathError;

/// Failure reported by the external ledger collaborator
///
/// Surfaced verbatim and never retried automatically: retrying value-transfer
/// actions risks duplication.
#[derive(Debug, Clone, Error)]
#[error("ledger collaborator failed during {action}: {detail}")]
pub struct CollaboratorError {
    /// Collaborator call that failed (e.g. "authorize_spend")
    pub action: String,
    /// Diagnostic exactly as the collaborator provided it
    pub detail: String,
}

impl CollaboratorError {
    pub fn new(action: impl Into<String>, detail: impl Into<String>) -> Self {
        CollaboratorError {
            action: action.into(),
            detail: detail.into(),
        }
    }
}

/// Which caller-supplied limit a quote violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    MaxIn,
    MinOut,
    MaxPrice,
    MinPrice,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitKind::MaxIn => "max-in",
            LimitKind::MinOut => "min-out",
            LimitKind::MaxPrice => "max-price",
            LimitKind::MinPrice => "min-price",
        };
        f.write_str(name)
    }
}

/// Rejection kinds for trading and liquidity operations
#[derive(Debug, Error)]
pub enum TradeError {
    /// A required collaborator address or context is unset; failed before any
    /// computation
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller input outside its allowed domain
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Decimal,
        reason: &'static str,
    },

    /// Freshly computed quote violates a caller-specified bound
    #[error("{kind} limit exceeded: quoted {quoted}, bound {bound}")]
    LimitExceeded {
        kind: LimitKind,
        quoted: Decimal,
        bound: Decimal,
    },

    /// Requested amount exceeds the reserve-fraction safety ceiling
    #[error("requested {requested} exceeds reserve ceiling {ceiling}")]
    ReserveCeilingExceeded { requested: Decimal, ceiling: Decimal },

    /// Caller's share balance or declared share ceiling cannot cover the exit
    #[error("insufficient shares: required {required}, available {available}")]
    InsufficientShares { required: Decimal, available: Decimal },

    /// A pricing formula's preconditions were violated
    #[error(transparent)]
    InvalidQuote(#[from] MathError),

    /// The external authorization or mutating action failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
