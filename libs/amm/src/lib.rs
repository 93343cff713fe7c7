//! # Tidepool AMM Library - Weighted Pool Mathematics Engine
//!
//! ## Purpose
//!
//! Mathematical core for weighted two-asset reserve pools providing exact
//! arithmetic for swap quoting and single-asset join/exit share accounting.
//! Implements the weighted constant-value invariant with zero precision loss
//! so client-side quotes stay consistent with the authoritative on-ledger
//! engine.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool reserve/weight/fee snapshots from the ledger view
//! - **Output Destinations**: Guard policy checks, trade orchestration,
//!   pre-submission quote displays
//! - **Precision**: Decimal arithmetic throughout, 18 quoted decimal places,
//!   rounding always in the pool's favor
//! - **Validation**: Every argument domain-checked before any arithmetic
//!
//! ## Architecture Role
//!
//! This crate is the pure leaf of the stack: no state, no I/O, no async. The
//! trading layer composes it with a ledger view and a guard policy; nothing
//! here knows that ledgers exist.

pub mod error;
pub mod pool_state;
pub mod weighted_math;

pub use error::MathError;
pub use pool_state::{WeightedPool, WeightedPoolState};
pub use weighted_math::{WeightedMath, MAX_FEE};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
