//! Safety envelope applied before any state-changing ledger call
//!
//! Every mutating operation passes through these checks first: the
//! reserve-fraction ceiling that stops a single operation from moving too much
//! of a pool, the caller's declared slippage/price limits, and share
//! sufficiency for exits. All policy values come from [`GuardConfig`] so they
//! can be tuned and tested without touching formula code.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LimitKind, TradeError};
use crate::units::{from_base_units, to_base_units};

/// Tunable guard policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Maximum fraction of a reserve a single operation may move (in or out)
    pub max_reserve_fraction: Decimal,
    /// Multiplicative reduction applied to the share spend at exit boundaries
    ///
    /// The authoritative engine's own exit-share rounding can land a hair
    /// above a caller's exact-boundary ceiling; shaving the spend by this
    /// factor instead of failing is the documented workaround. Applied only
    /// on the full-exit and single-asset-exit paths.
    pub boundary_epsilon: Decimal,
    /// Relative gap below which a required share amount and the caller's
    /// ceiling count as numerically adjacent
    pub boundary_tolerance: Decimal,
    /// Raw base-unit precision the ledger uses for reserve balances
    pub base_unit_decimals: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            max_reserve_fraction: dec!(0.25),
            boundary_epsilon: dec!(0.9999),
            boundary_tolerance: dec!(0.000000001),
            base_unit_decimals: 18,
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.max_reserve_fraction <= Decimal::ZERO || self.max_reserve_fraction >= Decimal::ONE {
            return Err(TradeError::InvalidParameter {
                name: "max_reserve_fraction",
                value: self.max_reserve_fraction,
                reason: "must be in (0, 1)",
            });
        }
        if self.boundary_epsilon <= Decimal::ZERO || self.boundary_epsilon > Decimal::ONE {
            return Err(TradeError::InvalidParameter {
                name: "boundary_epsilon",
                value: self.boundary_epsilon,
                reason: "must be in (0, 1]",
            });
        }
        if self.boundary_tolerance < Decimal::ZERO {
            return Err(TradeError::InvalidParameter {
                name: "boundary_tolerance",
                value: self.boundary_tolerance,
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}

/// Stateless policy checks over a snapshot and the caller's declared limits
#[derive(Debug, Clone)]
pub struct PoolGuard {
    config: GuardConfig,
}

impl PoolGuard {
    pub fn new(config: GuardConfig) -> Result<Self, TradeError> {
        config.validate()?;
        Ok(PoolGuard { config })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Largest amount a single operation may move for a given reserve
    ///
    /// Computed in raw base units as `floor(reserve * fraction) - 1`; the `-1`
    /// keeps a request strictly under the boundary, where the authoritative
    /// ledger has been observed to reject an exact-limit amount.
    pub fn reserve_ceiling(&self, reserve: Decimal) -> Result<Decimal, TradeError> {
        let scaled = reserve * self.config.max_reserve_fraction;
        let capped = to_base_units(scaled, self.config.base_unit_decimals)?.saturating_sub(1);
        from_base_units(capped, self.config.base_unit_decimals)
    }

    /// Reject a request that would move more than the reserve ceiling
    pub fn check_reserve_ceiling(
        &self,
        requested: Decimal,
        reserve: Decimal,
    ) -> Result<(), TradeError> {
        let ceiling = self.reserve_ceiling(reserve)?;
        if requested > ceiling {
            debug!(%requested, %ceiling, "reserve ceiling exceeded");
            return Err(TradeError::ReserveCeilingExceeded { requested, ceiling });
        }
        Ok(())
    }

    /// Reject a quoted input above the caller's maximum
    pub fn check_max_in(&self, quoted: Decimal, bound: Decimal) -> Result<(), TradeError> {
        if quoted > bound {
            return Err(TradeError::LimitExceeded {
                kind: LimitKind::MaxIn,
                quoted,
                bound,
            });
        }
        Ok(())
    }

    /// Reject a quoted output below the caller's minimum
    pub fn check_min_out(&self, quoted: Decimal, bound: Decimal) -> Result<(), TradeError> {
        if quoted < bound {
            return Err(TradeError::LimitExceeded {
                kind: LimitKind::MinOut,
                quoted,
                bound,
            });
        }
        Ok(())
    }

    /// Reject an effective price above the caller's maximum, if one was given
    pub fn check_max_price(
        &self,
        price: Decimal,
        bound: Option<Decimal>,
    ) -> Result<(), TradeError> {
        if let Some(bound) = bound {
            if price > bound {
                return Err(TradeError::LimitExceeded {
                    kind: LimitKind::MaxPrice,
                    quoted: price,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Reject an effective price below the caller's minimum, if one was given
    pub fn check_min_price(
        &self,
        price: Decimal,
        bound: Option<Decimal>,
    ) -> Result<(), TradeError> {
        if let Some(bound) = bound {
            if price < bound {
                return Err(TradeError::LimitExceeded {
                    kind: LimitKind::MinPrice,
                    quoted: price,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Reject an exit the caller's share balance cannot fund
    pub fn check_share_balance(
        &self,
        balance: Decimal,
        required: Decimal,
    ) -> Result<(), TradeError> {
        if balance < required {
            return Err(TradeError::InsufficientShares {
                required,
                available: balance,
            });
        }
        Ok(())
    }

    /// Resolve the share spend ceiling for a single-asset exit
    ///
    /// The required shares must fit under the caller's ceiling. When the two
    /// are equal or numerically adjacent, the ceiling is shaved by the
    /// boundary epsilon instead of passed through exactly; outside that
    /// boundary the ceiling is used as-is.
    pub fn exit_share_spend(
        &self,
        required: Decimal,
        ceiling: Decimal,
    ) -> Result<Decimal, TradeError> {
        if required > ceiling && !self.adjacent(required, ceiling) {
            return Err(TradeError::InsufficientShares {
                required,
                available: ceiling,
            });
        }
        if required >= ceiling || self.adjacent(required, ceiling) {
            let adjusted = ceiling * self.config.boundary_epsilon;
            warn!(%required, %ceiling, %adjusted, "share spend at exit boundary, applying epsilon");
            return Ok(adjusted);
        }
        Ok(ceiling)
    }

    /// Resolve the share spend for a full-pool exit
    ///
    /// A spend of exactly (or within tolerance of) the caller's entire
    /// balance takes the epsilon reduction; anything above the balance is
    /// rejected outright.
    pub fn full_exit_spend(
        &self,
        share_amount: Decimal,
        balance: Decimal,
    ) -> Result<Decimal, TradeError> {
        if share_amount > balance {
            return Err(TradeError::InsufficientShares {
                required: share_amount,
                available: balance,
            });
        }
        if self.adjacent(share_amount, balance) {
            let adjusted = share_amount * self.config.boundary_epsilon;
            warn!(%share_amount, %balance, %adjusted, "full-balance exit, applying epsilon");
            return Ok(adjusted);
        }
        Ok(share_amount)
    }

    /// Denormalized weight check under the sum-to-ten convention
    pub fn check_weight_convention(&self, weight: Decimal) -> Result<(), TradeError> {
        if weight < Decimal::ONE || weight > dec!(9) {
            return Err(TradeError::InvalidParameter {
                name: "weight",
                value: weight,
                reason: "must be in [1, 9]",
            });
        }
        Ok(())
    }

    /// Pool fee domain check
    pub fn check_fee(&self, fee: Decimal) -> Result<(), TradeError> {
        if fee < Decimal::ZERO || fee > tidepool_amm::MAX_FEE {
            return Err(TradeError::InvalidParameter {
                name: "fee",
                value: fee,
                reason: "must be in [0, 0.1]",
            });
        }
        Ok(())
    }

    fn adjacent(&self, a: Decimal, b: Decimal) -> bool {
        if b.is_zero() {
            return a.is_zero();
        }
        ((a - b) / b).abs() <= self.config.boundary_tolerance
    }
}
