//! Dispenser eligibility policy
//!
//! A dispenser hands out a bounded supply of a token under per-recipient and
//! per-request ceilings, either drawing down a reservoir or minting fresh
//! supply when authorized. This module is the client-side admissibility
//! check; the authoritative ledger re-evaluates the same conditions
//! atomically at execution time, so a positive answer here is advisory only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Point-in-time status of one dispenser for one token
///
/// Mutated externally by activation, deactivation, and withdraw actions;
/// read-only from this core's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenserStatus {
    /// Whether the dispenser currently accepts requests at all
    pub active: bool,
    /// Largest amount a single request may ask for
    pub max_tokens: Decimal,
    /// Recipients holding this much or more are ineligible
    pub max_balance: Decimal,
    /// Tokens currently held in the dispenser's reservoir
    pub balance: Decimal,
    /// Whether the dispenser may mint new supply beyond its reservoir
    pub is_minter: bool,
}

/// Admissibility policy over a dispenser status snapshot
pub struct DispenserPolicy;

impl DispenserPolicy {
    /// Whether a dispense of `amount` to a recipient holding
    /// `recipient_balance` is currently admissible
    ///
    /// Conditions are evaluated in order; the first failure makes the request
    /// inadmissible. No partial or queued semantics.
    pub fn is_dispensable(
        status: &DispenserStatus,
        recipient_balance: Decimal,
        amount: Decimal,
    ) -> bool {
        if !status.active {
            debug!("dispense inadmissible: dispenser inactive");
            return false;
        }
        if recipient_balance >= status.max_balance {
            debug!(%recipient_balance, max_balance = %status.max_balance,
                "dispense inadmissible: recipient at balance ceiling");
            return false;
        }
        if amount > status.max_tokens {
            debug!(%amount, max_tokens = %status.max_tokens,
                "dispense inadmissible: request above per-request ceiling");
            return false;
        }
        if status.balance < amount && !status.is_minter {
            debug!(%amount, reservoir = %status.balance,
                "dispense inadmissible: reservoir short and dispenser cannot mint");
            return false;
        }
        true
    }

    /// Largest admissible request for a recipient, zero when none is
    pub fn max_dispensable(status: &DispenserStatus, recipient_balance: Decimal) -> Decimal {
        if !status.active || recipient_balance >= status.max_balance {
            return Decimal::ZERO;
        }
        if status.is_minter {
            status.max_tokens
        } else {
            status.max_tokens.min(status.balance)
        }
    }
}
