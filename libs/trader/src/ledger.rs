//! Collaborator contracts at the ledger boundary
//!
//! The authoritative ledger owns all balances, reserves, and share supply;
//! this module defines the read and write seams the trading core consumes.
//! Reads are best-effort snapshots with no staleness bound and no transaction
//! consistency across calls. Writes each return an opaque [`Confirmation`]
//! record on success.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::dispenser::DispenserStatus;
use crate::error::CollaboratorError;

/// 20-byte ledger address, displayed as 0x-prefixed hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Address(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Opaque confirmation record returned by a successful mutating action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Ledger-assigned identifier (transaction hash or equivalent)
    pub id: String,
    /// Whatever diagnostic payload the collaborator attached
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Confirmation {
    pub fn new(id: impl Into<String>) -> Self {
        Confirmation {
            id: id.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// Read-only snapshot access over a pool's committed state
///
/// Every call may reflect a different ledger state; a decision composed from
/// several calls is a best-effort snapshot, not a transaction-consistent view.
#[async_trait]
pub trait ReserveLedgerView: Send + Sync {
    async fn reserve_of(&self, pool: Address, asset: Address) -> Result<Decimal, CollaboratorError>;

    async fn weight_of(&self, pool: Address, asset: Address) -> Result<Decimal, CollaboratorError>;

    async fn total_weight(&self, pool: Address) -> Result<Decimal, CollaboratorError>;

    async fn share_supply(&self, pool: Address) -> Result<Decimal, CollaboratorError>;

    async fn swap_fee(&self, pool: Address) -> Result<Decimal, CollaboratorError>;

    async fn share_balance_of(
        &self,
        holder: Address,
        pool: Address,
    ) -> Result<Decimal, CollaboratorError>;
}

/// State-changing actions executed by the ledger
///
/// Each call either fully succeeds with a [`Confirmation`] or fails with no
/// partial effect implied on our side. Callers never see a retried call from
/// this core.
#[async_trait]
pub trait LedgerActions: Send + Sync {
    /// Grant `spender` permission to move up to `amount` of `asset`
    async fn authorize_spend(
        &self,
        asset: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<Confirmation, CollaboratorError>;

    /// Swap paying at most `max_amount_in` for exactly `amount_out`
    async fn swap_exact_out(
        &self,
        pool: Address,
        asset_in: Address,
        max_amount_in: Decimal,
        asset_out: Address,
        amount_out: Decimal,
        max_price: Option<Decimal>,
    ) -> Result<Confirmation, CollaboratorError>;

    /// Swap exactly `amount_in` for at least `min_amount_out`
    async fn swap_exact_in(
        &self,
        pool: Address,
        asset_in: Address,
        amount_in: Decimal,
        asset_out: Address,
        min_amount_out: Decimal,
        min_price: Option<Decimal>,
    ) -> Result<Confirmation, CollaboratorError>;

    /// Deposit a single asset, minting at least `min_shares_out` pool shares
    async fn join_single_asset(
        &self,
        pool: Address,
        asset: Address,
        amount: Decimal,
        min_shares_out: Decimal,
    ) -> Result<Confirmation, CollaboratorError>;

    /// Withdraw an exact single-asset amount, burning at most `max_shares_in`
    async fn exit_single_asset(
        &self,
        pool: Address,
        asset: Address,
        amount: Decimal,
        max_shares_in: Decimal,
    ) -> Result<Confirmation, CollaboratorError>;

    /// Burn `share_amount` for proportional amounts of both assets
    async fn exit_pool(
        &self,
        pool: Address,
        share_amount: Decimal,
        min_amounts_out: [Decimal; 2],
    ) -> Result<Confirmation, CollaboratorError>;
}

/// Access to a dispenser's current status record
#[async_trait]
pub trait DispenserStatusSource: Send + Sync {
    async fn dispenser_status(&self, token: Address) -> Result<DispenserStatus, CollaboratorError>;
}
