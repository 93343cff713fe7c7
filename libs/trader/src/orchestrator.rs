//! # Trading Orchestrator - Guarded Operation Sequencing
//!
//! ## Purpose
//!
//! Sequences every guarded multi-step operation end-to-end: snapshot the pool
//! through the ledger view, compute a fresh quote, run the full guard policy,
//! and only then issue the authorization plus the single mutating action.
//! Any failure before the action means no collaborator call with side effects
//! was ever issued.
//!
//! ## Architecture Role
//!
//! Composition, not inheritance: the orchestrator is generic over the ledger
//! view and action collaborators and owns a [`PoolGuard`], so each layer is
//! independently testable and there are no fragile base-class call chains.
//!
//! ## Known exposure
//!
//! Each mutating method issues exactly one authorization step (when required)
//! followed by exactly one state-changing action. If the authorization
//! succeeds and the action then fails, the authorization is neither retried
//! nor reversed; the caller owns revoking or bounding the dangling grant.
//! Quotes are computed from a best-effort snapshot and may be stale by the
//! time the action reaches the ledger; the caller's limits, not this core,
//! are the protection against that race.

use rust_decimal::Decimal;
use tracing::{debug, info};

use tidepool_amm::{WeightedMath, WeightedPool, WeightedPoolState};

use crate::config::TraderConfig;
use crate::error::TradeError;
use crate::guard::PoolGuard;
use crate::ledger::{Address, Confirmation, LedgerActions, ReserveLedgerView};

/// Guarded trading and liquidity operations over one ledger
pub struct TradingOrchestrator<V, A> {
    view: V,
    actions: A,
    guard: PoolGuard,
    account: Address,
    quote_asset: Address,
}

impl<V: ReserveLedgerView, A: LedgerActions> TradingOrchestrator<V, A> {
    /// Build an orchestrator, failing fast on unset collaborator context
    pub fn new(view: V, actions: A, config: TraderConfig) -> Result<Self, TradeError> {
        config.validate()?;
        let guard = PoolGuard::new(config.guard)?;
        Ok(TradingOrchestrator {
            view,
            actions,
            guard,
            account: config.account,
            quote_asset: config.quote_asset,
        })
    }

    pub fn guard(&self) -> &PoolGuard {
        &self.guard
    }

    /// Buy an exact amount of a pool's traded asset, paying the quote asset
    ///
    /// Quotes the required input, rejects if either leg breaches the reserve
    /// ceiling (the output drawn or the input deposited), or if the quote
    /// breaches `max_in` or `max_price` (effective input per unit bought),
    /// authorizes the pool to pull up to `max_in` of the quote asset, then
    /// issues the swap.
    pub async fn buy(
        &self,
        pool: Address,
        asset: Address,
        amount_out: Decimal,
        max_in: Decimal,
        max_price: Option<Decimal>,
    ) -> Result<Confirmation, TradeError> {
        ensure_positive("amount_out", amount_out)?;
        ensure_positive("max_in", max_in)?;

        let state = self.swap_snapshot(pool, self.quote_asset, asset).await?;
        self.guard.check_reserve_ceiling(amount_out, state.reserve_out)?;

        let required_in = state.quote_in_given_out(amount_out)?;
        self.guard.check_reserve_ceiling(required_in, state.reserve_in)?;
        self.guard.check_max_in(required_in, max_in)?;
        self.guard.check_max_price(required_in / amount_out, max_price)?;
        debug!(%pool, %asset, %amount_out, %required_in, "buy quote accepted");

        self.actions
            .authorize_spend(self.quote_asset, pool, max_in)
            .await?;
        let confirmation = self
            .actions
            .swap_exact_out(pool, self.quote_asset, max_in, asset, amount_out, max_price)
            .await?;
        info!(%pool, %asset, %amount_out, id = %confirmation.id, "buy executed");
        Ok(confirmation)
    }

    /// Sell an exact amount of a pool's traded asset for the quote asset
    pub async fn sell(
        &self,
        pool: Address,
        asset: Address,
        amount_in: Decimal,
        min_out: Decimal,
        min_price: Option<Decimal>,
    ) -> Result<Confirmation, TradeError> {
        ensure_positive("amount_in", amount_in)?;

        let state = self.swap_snapshot(pool, asset, self.quote_asset).await?;
        self.guard.check_reserve_ceiling(amount_in, state.reserve_in)?;

        let expected_out = state.quote_out_given_in(amount_in)?;
        self.guard.check_reserve_ceiling(expected_out, state.reserve_out)?;
        self.guard.check_min_out(expected_out, min_out)?;
        self.guard.check_min_price(expected_out / amount_in, min_price)?;
        debug!(%pool, %asset, %amount_in, %expected_out, "sell quote accepted");

        self.actions.authorize_spend(asset, pool, amount_in).await?;
        let confirmation = self
            .actions
            .swap_exact_in(pool, asset, amount_in, self.quote_asset, min_out, min_price)
            .await?;
        info!(%pool, %asset, %amount_in, id = %confirmation.id, "sell executed");
        Ok(confirmation)
    }

    /// Deposit a single asset into a pool, minting pool shares
    pub async fn add_liquidity_single(
        &self,
        pool: Address,
        asset: Address,
        amount: Decimal,
    ) -> Result<Confirmation, TradeError> {
        ensure_positive("amount", amount)?;

        let (reserve, weight, supply, total_weight, fee) =
            self.single_side_snapshot(pool, asset).await?;
        self.guard.check_reserve_ceiling(amount, reserve)?;

        let expected_shares =
            WeightedMath::pool_out_given_single_in(reserve, weight, supply, total_weight, amount, fee)?;
        debug!(%pool, %asset, %amount, %expected_shares, "join quote accepted");

        self.actions.authorize_spend(asset, pool, amount).await?;
        let confirmation = self
            .actions
            .join_single_asset(pool, asset, amount, Decimal::ZERO)
            .await?;
        info!(%pool, %asset, %amount, id = %confirmation.id, "single-asset join executed");
        Ok(confirmation)
    }

    /// Withdraw an exact single-asset amount, burning at most `max_shares`
    ///
    /// The boundary epsilon applies here: a share requirement equal or
    /// numerically adjacent to `max_shares` shaves the spend ceiling instead
    /// of failing, matching the authoritative engine's exit rounding.
    pub async fn remove_liquidity_single(
        &self,
        pool: Address,
        asset: Address,
        amount: Decimal,
        max_shares: Decimal,
    ) -> Result<Confirmation, TradeError> {
        ensure_positive("amount", amount)?;
        ensure_positive("max_shares", max_shares)?;

        let (reserve, weight, supply, total_weight, fee) =
            self.single_side_snapshot(pool, asset).await?;
        self.guard.check_reserve_ceiling(amount, reserve)?;

        let required_shares =
            WeightedMath::pool_in_given_single_out(reserve, weight, supply, total_weight, amount, fee)?;
        let balance = self.view.share_balance_of(self.account, pool).await?;
        self.guard.check_share_balance(balance, max_shares)?;
        let spend_ceiling = self.guard.exit_share_spend(required_shares, max_shares)?;
        debug!(%pool, %asset, %amount, %required_shares, %spend_ceiling, "exit quote accepted");

        let confirmation = self
            .actions
            .exit_single_asset(pool, asset, amount, spend_ceiling)
            .await?;
        info!(%pool, %asset, %amount, id = %confirmation.id, "single-asset exit executed");
        Ok(confirmation)
    }

    /// Burn pool shares for proportional amounts of both assets
    ///
    /// A `share_amount` exactly equal to the caller's full balance takes the
    /// epsilon reduction before the exit is issued, and the spend can never
    /// exceed the tracked balance.
    pub async fn remove_all_liquidity(
        &self,
        pool: Address,
        share_amount: Decimal,
        min_out_a: Decimal,
        min_out_b: Decimal,
    ) -> Result<Confirmation, TradeError> {
        ensure_positive("share_amount", share_amount)?;

        let balance = self.view.share_balance_of(self.account, pool).await?;
        let spend = self.guard.full_exit_spend(share_amount, balance)?;
        debug!(%pool, %share_amount, %spend, "full exit accepted");

        let confirmation = self
            .actions
            .exit_pool(pool, spend, [min_out_a, min_out_b])
            .await?;
        info!(%pool, %spend, id = %confirmation.id, "full exit executed");
        Ok(confirmation)
    }

    /// Quote the input required to buy an exact output, without acting
    ///
    /// Callers re-quote immediately before submitting; a stale quote is a
    /// correctness risk the limit parameters absorb.
    pub async fn quote_buy(
        &self,
        pool: Address,
        asset: Address,
        amount_out: Decimal,
    ) -> Result<Decimal, TradeError> {
        let state = self.swap_snapshot(pool, self.quote_asset, asset).await?;
        Ok(state.quote_in_given_out(amount_out)?)
    }

    /// Quote the output for selling an exact input, without acting
    pub async fn quote_sell(
        &self,
        pool: Address,
        asset: Address,
        amount_in: Decimal,
    ) -> Result<Decimal, TradeError> {
        let state = self.swap_snapshot(pool, asset, self.quote_asset).await?;
        Ok(state.quote_out_given_in(amount_in)?)
    }

    /// Assemble a directional swap snapshot from the ledger view
    ///
    /// Several reads compose one best-effort snapshot; there is no
    /// transaction consistency between them.
    async fn swap_snapshot(
        &self,
        pool: Address,
        asset_in: Address,
        asset_out: Address,
    ) -> Result<WeightedPoolState, TradeError> {
        let reserve_in = self.view.reserve_of(pool, asset_in).await?;
        let weight_in = self.view.weight_of(pool, asset_in).await?;
        let reserve_out = self.view.reserve_of(pool, asset_out).await?;
        let weight_out = self.view.weight_of(pool, asset_out).await?;
        let fee = self.view.swap_fee(pool).await?;
        self.guard.check_weight_convention(weight_in)?;
        self.guard.check_weight_convention(weight_out)?;
        self.guard.check_fee(fee)?;

        Ok(WeightedPoolState {
            reserve_in,
            weight_in,
            reserve_out,
            weight_out,
            fee,
        })
    }

    /// Snapshot the single-asset side used by join/exit quotes
    async fn single_side_snapshot(
        &self,
        pool: Address,
        asset: Address,
    ) -> Result<(Decimal, Decimal, Decimal, Decimal, Decimal), TradeError> {
        let reserve = self.view.reserve_of(pool, asset).await?;
        let weight = self.view.weight_of(pool, asset).await?;
        let supply = self.view.share_supply(pool).await?;
        let total_weight = self.view.total_weight(pool).await?;
        let fee = self.view.swap_fee(pool).await?;
        self.guard.check_weight_convention(weight)?;
        self.guard.check_fee(fee)?;

        Ok((reserve, weight, supply, total_weight, fee))
    }
}

fn ensure_positive(name: &'static str, value: Decimal) -> Result<(), TradeError> {
    if value <= Decimal::ZERO {
        return Err(TradeError::InvalidParameter {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}
