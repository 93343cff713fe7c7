//! Weighted constant-value pool math with exact calculations
//!
//! Implements the full quote surface of a weighted two-asset pool: both swap
//! directions plus the four single-asset join/exit corners, all derived from
//! the same invariant (the weighted product of reserves is held constant net
//! of fees). Preserves full precision using the Decimal type; native floats
//! are never used because representation error compounds across chained
//! quotes.
//!
//! Rounding always favors the pool: amounts the caller must pay in round up,
//! amounts the pool pays out round down. Without this bias a caller could
//! extract value one rounding quantum at a time.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::trace;

use crate::error::MathError;

/// Maximum swap fee accepted by any quote function (10%)
pub const MAX_FEE: Decimal = dec!(0.1);

/// Decimal places carried by every quoted amount
const QUOTE_DP: u32 = 18;

const ONE: Decimal = Decimal::ONE;

/// Weighted-pool math functions with zero precision loss
///
/// All functions are pure and deterministic; none touch any state. Inputs are
/// validated before any arithmetic so a bad argument can never surface as a
/// plausible-looking quote.
pub struct WeightedMath;

impl WeightedMath {
    /// Calculate the output amount released for a given input amount
    ///
    /// # Arguments
    /// * `reserve_in` - Pool reserve of the asset being paid in
    /// * `weight_in` - Denormalized weight of the input asset
    /// * `reserve_out` - Pool reserve of the asset being extracted
    /// * `weight_out` - Denormalized weight of the output asset
    /// * `amount_in` - Input amount, fee charged on this leg
    /// * `fee` - Swap fee as a fraction in `[0, 0.1]`
    ///
    /// # Returns
    /// Output amount after fee, rounded down. Zero input yields zero output.
    /// Strictly decreasing in `fee` for fixed other arguments.
    pub fn out_given_in(
        reserve_in: Decimal,
        weight_in: Decimal,
        reserve_out: Decimal,
        weight_out: Decimal,
        amount_in: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_pool(reserve_in, weight_in, reserve_out, weight_out)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("amount_in", amount_in)?;
        if amount_in.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let adjusted_in =
            Self::non_overflowing(amount_in.checked_mul(ONE - fee), "fee-adjusted input")?;
        let base = Self::non_overflowing(
            reserve_in
                .checked_add(adjusted_in)
                .and_then(|grown| reserve_in.checked_div(grown)),
            "reserve ratio",
        )?;
        let exponent = Self::non_overflowing(weight_in.checked_div(weight_out), "weight ratio")?;
        let power = Self::pow(base, exponent)?;
        let amount_out =
            Self::non_overflowing(reserve_out.checked_mul(ONE - power), "output amount")?;

        trace!(%amount_in, %amount_out, %fee, "out_given_in");
        Ok(Self::round_out(amount_out))
    }

    /// Calculate the input amount required to extract a desired output amount
    ///
    /// Fails with `InvalidQuote` when `amount_out >= reserve_out`: the pool
    /// cannot release more than it holds, and the formula diverges as the
    /// request approaches the full reserve.
    ///
    /// # Returns
    /// Required input amount including fee, rounded up.
    pub fn in_given_out(
        reserve_in: Decimal,
        weight_in: Decimal,
        reserve_out: Decimal,
        weight_out: Decimal,
        amount_out: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_pool(reserve_in, weight_in, reserve_out, weight_out)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("amount_out", amount_out)?;
        if amount_out >= reserve_out {
            return Err(MathError::quote(format!(
                "requested output {amount_out} is at or beyond reserve {reserve_out}"
            )));
        }
        if amount_out.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let base = Self::non_overflowing(
            reserve_out.checked_div(reserve_out - amount_out),
            "reserve ratio",
        )?;
        let exponent = Self::non_overflowing(weight_out.checked_div(weight_in), "weight ratio")?;
        let power = Self::pow(base, exponent)?;
        let amount_in = Self::non_overflowing(
            reserve_in
                .checked_mul(power - ONE)
                .and_then(|gross| gross.checked_div(ONE - fee)),
            "input amount",
        )?;

        trace!(%amount_out, %amount_in, %fee, "in_given_out");
        Ok(Self::round_in(amount_in))
    }

    /// Calculate pool shares minted for a single-asset deposit
    ///
    /// The fee applies only to the portion of the deposit that is implicitly
    /// traded into the other asset, hence the `(1 - normalized_weight)`
    /// scaling of the fee.
    pub fn pool_out_given_single_in(
        reserve_in: Decimal,
        weight_in: Decimal,
        share_supply: Decimal,
        total_weight: Decimal,
        amount_in: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_single_side(reserve_in, weight_in, share_supply, total_weight)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("amount_in", amount_in)?;
        if amount_in.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let normalized =
            Self::non_overflowing(weight_in.checked_div(total_weight), "normalized weight")?;
        let in_after_fee = Self::non_overflowing(
            amount_in.checked_mul(ONE - (ONE - normalized) * fee),
            "fee-adjusted input",
        )?;
        let ratio = Self::non_overflowing(
            reserve_in
                .checked_add(in_after_fee)
                .and_then(|grown| grown.checked_div(reserve_in)),
            "reserve growth ratio",
        )?;
        let share_ratio = Self::pow(ratio, normalized)?;
        let share_out =
            Self::non_overflowing(share_supply.checked_mul(share_ratio - ONE), "minted shares")?;

        Ok(Self::round_out(share_out))
    }

    /// Calculate the single-asset deposit required to mint a desired amount
    /// of pool shares
    pub fn single_in_given_pool_out(
        reserve_in: Decimal,
        weight_in: Decimal,
        share_supply: Decimal,
        total_weight: Decimal,
        share_amount_out: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_single_side(reserve_in, weight_in, share_supply, total_weight)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("share_amount_out", share_amount_out)?;
        if share_amount_out.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let normalized =
            Self::non_overflowing(weight_in.checked_div(total_weight), "normalized weight")?;
        let share_ratio = Self::non_overflowing(
            share_supply
                .checked_add(share_amount_out)
                .and_then(|grown| grown.checked_div(share_supply)),
            "share growth ratio",
        )?;
        let inverse_weight =
            Self::non_overflowing(ONE.checked_div(normalized), "inverse weight")?;
        let token_ratio = Self::pow(share_ratio, inverse_weight)?;
        let amount_in = Self::non_overflowing(
            reserve_in
                .checked_mul(token_ratio - ONE)
                .and_then(|gross| gross.checked_div(ONE - (ONE - normalized) * fee)),
            "required deposit",
        )?;

        Ok(Self::round_in(amount_in))
    }

    /// Calculate the single-asset amount released for burning pool shares
    ///
    /// Fails with `InvalidQuote` when `share_amount_in >= share_supply`: the
    /// supply can never be redeemed below zero.
    pub fn single_out_given_pool_in(
        reserve_out: Decimal,
        weight_out: Decimal,
        share_supply: Decimal,
        total_weight: Decimal,
        share_amount_in: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_single_side(reserve_out, weight_out, share_supply, total_weight)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("share_amount_in", share_amount_in)?;
        if share_amount_in >= share_supply {
            return Err(MathError::quote(format!(
                "share redemption {share_amount_in} is at or beyond total supply {share_supply}"
            )));
        }
        if share_amount_in.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let normalized =
            Self::non_overflowing(weight_out.checked_div(total_weight), "normalized weight")?;
        let share_ratio = Self::non_overflowing(
            (share_supply - share_amount_in).checked_div(share_supply),
            "share ratio",
        )?;
        let inverse_weight =
            Self::non_overflowing(ONE.checked_div(normalized), "inverse weight")?;
        let token_ratio = Self::pow(share_ratio, inverse_weight)?;
        let out_before_fee = Self::non_overflowing(
            reserve_out.checked_mul(token_ratio).map(|kept| reserve_out - kept),
            "gross output",
        )?;
        let amount_out = Self::non_overflowing(
            out_before_fee.checked_mul(ONE - (ONE - normalized) * fee),
            "output amount",
        )?;

        Ok(Self::round_out(amount_out))
    }

    /// Calculate the pool shares that must be burned to extract an exact
    /// single-asset amount
    ///
    /// Fails with `InvalidQuote` when the fee-grossed request reaches the
    /// reserve.
    pub fn pool_in_given_single_out(
        reserve_out: Decimal,
        weight_out: Decimal,
        share_supply: Decimal,
        total_weight: Decimal,
        amount_out: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_single_side(reserve_out, weight_out, share_supply, total_weight)?;
        Self::validate_fee(fee)?;
        Self::validate_amount("amount_out", amount_out)?;
        if amount_out.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let normalized =
            Self::non_overflowing(weight_out.checked_div(total_weight), "normalized weight")?;
        let out_before_fee = Self::non_overflowing(
            amount_out.checked_div(ONE - (ONE - normalized) * fee),
            "gross output",
        )?;
        if out_before_fee >= reserve_out {
            return Err(MathError::quote(format!(
                "requested output {amount_out} (gross {out_before_fee}) is at or beyond reserve {reserve_out}"
            )));
        }
        let ratio = Self::non_overflowing(
            (reserve_out - out_before_fee).checked_div(reserve_out),
            "reserve ratio",
        )?;
        let share_ratio = Self::pow(ratio, normalized)?;
        let share_in =
            Self::non_overflowing(share_supply.checked_mul(ONE - share_ratio), "burned shares")?;

        Ok(Self::round_in(share_in))
    }

    /// Calculate the marginal price of the output asset in units of the input
    /// asset, including the fee markup
    ///
    /// This is the price an infinitesimal trade would pay; finite trades pay
    /// strictly more (see [`Self::price_impact`]).
    pub fn spot_price(
        reserve_in: Decimal,
        weight_in: Decimal,
        reserve_out: Decimal,
        weight_out: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_pool(reserve_in, weight_in, reserve_out, weight_out)?;
        Self::validate_fee(fee)?;

        let numer = Self::non_overflowing(reserve_in.checked_div(weight_in), "input rate")?;
        let denom = Self::non_overflowing(reserve_out.checked_div(weight_out), "output rate")?;
        Self::non_overflowing(
            numer
                .checked_div(denom)
                .and_then(|price| price.checked_div(ONE - fee)),
            "spot price",
        )
    }

    /// Calculate the percentage deviation of the executed rate from the spot
    /// rate for a given trade size
    ///
    /// Returns a percentage (2.5 = 2.5%). Zero input has zero impact.
    pub fn price_impact(
        reserve_in: Decimal,
        weight_in: Decimal,
        reserve_out: Decimal,
        weight_out: Decimal,
        amount_in: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, MathError> {
        Self::validate_amount("amount_in", amount_in)?;
        if amount_in.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let spot = Self::spot_price(reserve_in, weight_in, reserve_out, weight_out, fee)?;
        let ideal_out = Self::non_overflowing(amount_in.checked_div(spot), "ideal output")?;
        let actual_out =
            Self::out_given_in(reserve_in, weight_in, reserve_out, weight_out, amount_in, fee)?;

        Self::non_overflowing(
            (ideal_out - actual_out)
                .checked_div(ideal_out)
                .and_then(|deviation| deviation.checked_mul(dec!(100))),
            "price impact",
        )
    }

    /// Fractional power via the decimal exp/ln series
    ///
    /// Callers guarantee `base > 0`; a `None` from the checked power means the
    /// series overflowed, which only happens for degenerate pool ratios.
    fn pow(base: Decimal, exponent: Decimal) -> Result<Decimal, MathError> {
        if base <= Decimal::ZERO {
            return Err(MathError::quote(format!("non-positive power base {base}")));
        }
        if base == ONE || exponent.is_zero() {
            return Ok(ONE);
        }
        if exponent == ONE {
            return Ok(base);
        }
        base.checked_powd(exponent).ok_or_else(|| {
            MathError::quote(format!("power overflow: {base}^{exponent}"))
        })
    }

    /// Map a checked-arithmetic overflow onto a typed quote failure
    ///
    /// Inputs are validated before any arithmetic, so a `None` here means an
    /// intermediate value left the representable decimal range, not that an
    /// argument was out of domain.
    fn non_overflowing(value: Option<Decimal>, what: &'static str) -> Result<Decimal, MathError> {
        value.ok_or_else(|| MathError::quote(format!("decimal overflow computing {what}")))
    }

    /// Round an amount the caller must pay in: up, toward the pool
    fn round_in(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(QUOTE_DP, RoundingStrategy::AwayFromZero)
    }

    /// Round an amount the pool pays out: down, toward the pool
    fn round_out(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(QUOTE_DP, RoundingStrategy::ToZero)
    }

    fn validate_pool(
        reserve_in: Decimal,
        weight_in: Decimal,
        reserve_out: Decimal,
        weight_out: Decimal,
    ) -> Result<(), MathError> {
        Self::validate_positive("reserve_in", reserve_in)?;
        Self::validate_positive("weight_in", weight_in)?;
        Self::validate_positive("reserve_out", reserve_out)?;
        Self::validate_positive("weight_out", weight_out)
    }

    fn validate_single_side(
        reserve: Decimal,
        weight: Decimal,
        share_supply: Decimal,
        total_weight: Decimal,
    ) -> Result<(), MathError> {
        Self::validate_positive("reserve", reserve)?;
        Self::validate_positive("weight", weight)?;
        Self::validate_positive("share_supply", share_supply)?;
        Self::validate_positive("total_weight", total_weight)?;
        if weight > total_weight {
            return Err(MathError::InvalidParameter {
                name: "weight",
                value: weight,
                reason: "exceeds total pool weight",
            });
        }
        Ok(())
    }

    fn validate_fee(fee: Decimal) -> Result<(), MathError> {
        if fee < Decimal::ZERO || fee > MAX_FEE {
            return Err(MathError::InvalidParameter {
                name: "fee",
                value: fee,
                reason: "must be in [0, 0.1]",
            });
        }
        Ok(())
    }

    fn validate_amount(name: &'static str, value: Decimal) -> Result<(), MathError> {
        if value < Decimal::ZERO {
            return Err(MathError::InvalidParameter {
                name,
                value,
                reason: "must be non-negative",
            });
        }
        Ok(())
    }

    fn validate_positive(name: &'static str, value: Decimal) -> Result<(), MathError> {
        if value <= Decimal::ZERO {
            return Err(MathError::InvalidParameter {
                name,
                value,
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
