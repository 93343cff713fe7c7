//! Centralized decimal / raw-base-unit conversion
//!
//! The ledger speaks raw integer base units; everything else in this stack
//! speaks `Decimal`. These two functions are the only place the
//! representations meet, so conversion bugs cannot be scattered through the
//! call sites.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::TradeError;

/// Largest scale `Decimal` can carry
const MAX_DECIMALS: u32 = 28;

/// Convert a decimal amount to raw integer base units, truncating any
/// sub-quantum remainder
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<u128, TradeError> {
    if amount < Decimal::ZERO {
        return Err(TradeError::InvalidParameter {
            name: "amount",
            value: amount,
            reason: "must be non-negative",
        });
    }
    if decimals > MAX_DECIMALS {
        return Err(TradeError::InvalidParameter {
            name: "decimals",
            value: Decimal::from(decimals),
            reason: "exceeds decimal precision",
        });
    }

    let scale = Decimal::from(10u128.pow(decimals));
    let scaled = amount.checked_mul(scale).ok_or(TradeError::InvalidParameter {
        name: "amount",
        value: amount,
        reason: "overflows base-unit range",
    })?;
    scaled.trunc().to_u128().ok_or(TradeError::InvalidParameter {
        name: "amount",
        value: amount,
        reason: "overflows base-unit range",
    })
}

/// Convert raw integer base units back to a decimal amount
pub fn from_base_units(units: u128, decimals: u32) -> Result<Decimal, TradeError> {
    if decimals > MAX_DECIMALS {
        return Err(TradeError::InvalidParameter {
            name: "decimals",
            value: Decimal::from(decimals),
            reason: "exceeds decimal precision",
        });
    }
    // Decimal carries a 96-bit mantissa; anything above cannot be represented
    const MAX_MANTISSA: u128 = (1u128 << 96) - 1;
    if units > MAX_MANTISSA {
        return Err(TradeError::InvalidParameter {
            name: "units",
            value: Decimal::MAX,
            reason: "overflows decimal range",
        });
    }
    Ok(Decimal::from_i128_with_scale(units as i128, decimals))
}
