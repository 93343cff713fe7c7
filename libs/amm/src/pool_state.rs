//! Pool snapshot types and the unified quoting interface

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::weighted_math::WeightedMath;

/// Directional snapshot of a weighted pool
///
/// Reserves and weights are oriented for one trade direction: `_in` is the
/// asset being paid into the pool, `_out` the asset being extracted. A
/// snapshot is a best-effort view; the authoritative ledger may have moved on
/// by the time a quote derived from it is submitted, so callers re-quote
/// immediately before submission and protect themselves with limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoolState {
    pub reserve_in: Decimal,
    pub weight_in: Decimal,
    pub reserve_out: Decimal,
    pub weight_out: Decimal,
    /// Swap fee as a fraction (0.003 = 0.3%)
    pub fee: Decimal,
}

impl WeightedPoolState {
    /// Same pool, opposite trade direction
    pub fn reversed(&self) -> Self {
        WeightedPoolState {
            reserve_in: self.reserve_out,
            weight_in: self.weight_out,
            reserve_out: self.reserve_in,
            weight_out: self.weight_in,
            fee: self.fee,
        }
    }
}

/// Unified quoting interface over any pool-shaped snapshot
pub trait WeightedPool {
    /// Output amount released for a given input
    fn quote_out_given_in(&self, amount_in: Decimal) -> Result<Decimal, MathError>;

    /// Input amount required for a desired output
    fn quote_in_given_out(&self, amount_out: Decimal) -> Result<Decimal, MathError>;

    /// Marginal price of the output asset in input-asset units
    fn spot_price(&self) -> Result<Decimal, MathError>;

    /// Current reserves as (in, out)
    fn reserves(&self) -> (Decimal, Decimal);

    /// Swap fee fraction
    fn swap_fee(&self) -> Decimal;
}

impl WeightedPool for WeightedPoolState {
    fn quote_out_given_in(&self, amount_in: Decimal) -> Result<Decimal, MathError> {
        WeightedMath::out_given_in(
            self.reserve_in,
            self.weight_in,
            self.reserve_out,
            self.weight_out,
            amount_in,
            self.fee,
        )
    }

    fn quote_in_given_out(&self, amount_out: Decimal) -> Result<Decimal, MathError> {
        WeightedMath::in_given_out(
            self.reserve_in,
            self.weight_in,
            self.reserve_out,
            self.weight_out,
            amount_out,
            self.fee,
        )
    }

    fn spot_price(&self) -> Result<Decimal, MathError> {
        WeightedMath::spot_price(
            self.reserve_in,
            self.weight_in,
            self.reserve_out,
            self.weight_out,
            self.fee,
        )
    }

    fn reserves(&self) -> (Decimal, Decimal) {
        (self.reserve_in, self.reserve_out)
    }

    fn swap_fee(&self) -> Decimal {
        self.fee
    }
}
