//! # Tidepool Trader - Guarded Pool Trading and Liquidity Engine
//!
//! ## Purpose
//!
//! Client-side mirror of a weighted two-asset pool engine: quotes, guards,
//! and orchestrates trades and liquidity operations before they are submitted
//! to the authoritative ledger, plus the eligibility policy for a
//! bounded-supply token dispenser. The ledger remains the source of truth;
//! this crate's job is to never issue an action that its own fresh quote and
//! the caller's declared limits do not justify.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots via [`ledger::ReserveLedgerView`],
//!   dispenser status via [`ledger::DispenserStatusSource`]
//! - **Output Destinations**: Mutating calls via [`ledger::LedgerActions`]
//! - **Math Core**: All pricing delegated to `tidepool-amm`
//! - **Policy**: Reserve ceilings, limits, and the exit boundary epsilon in
//!   [`guard::PoolGuard`], configured through [`config::TraderConfig`]
//!
//! ## Concurrency Model
//!
//! No internal threads, locks, or long-lived shared state. Suspension happens
//! only at collaborator calls; everything between awaits is synchronous and
//! side-effect free. Ordering between distinct operations against the same
//! pool is the ledger's business; staleness between quote and execution is
//! tolerated via limit parameters, never eliminated.

pub mod config;
pub mod dispenser;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod orchestrator;
pub mod units;

pub use config::TraderConfig;
pub use dispenser::{DispenserPolicy, DispenserStatus};
pub use error::{CollaboratorError, LimitKind, TradeError};
pub use guard::{GuardConfig, PoolGuard};
pub use ledger::{
    Address, Confirmation, DispenserStatusSource, LedgerActions, ReserveLedgerView,
};
pub use orchestrator::TradingOrchestrator;
