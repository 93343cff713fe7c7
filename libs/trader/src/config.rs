//! Trader configuration with file loading and environment overrides
//!
//! All runtime parameters live here rather than as compiled-in literals:
//! the acting account, the quote asset every pool trades against, and the
//! guard policy. Supports JSON file loading, `TIDEPOOL_*` environment
//! variable overrides, and a validation pass that fails fast before any
//! collaborator call is made.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::TradeError;
use crate::guard::GuardConfig;
use crate::ledger::Address;

/// Complete configuration for the trading orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderConfig {
    /// Account whose balances are spent and whose shares are redeemed
    pub account: Address,
    /// The quote-side asset paired against every pool's traded asset
    pub quote_asset: Address,
    /// Guard policy (reserve ceilings, boundary epsilon)
    #[serde(default)]
    pub guard: GuardConfig,
}

impl TraderConfig {
    pub fn new(account: Address, quote_asset: Address) -> Self {
        TraderConfig {
            account,
            quote_asset,
            guard: GuardConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: TraderConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply `TIDEPOOL_*` environment variable overrides
    ///
    /// Unparseable values are logged and skipped rather than failing startup.
    pub fn apply_env_overrides(&mut self) {
        let vars: HashMap<String, String> = std::env::vars().collect();
        self.apply_overrides(&vars);
    }

    /// Apply `TIDEPOOL_*` overrides from an explicit variable map
    ///
    /// Split out from [`Self::apply_env_overrides`] so override handling can
    /// be exercised without touching the process-global environment.
    pub fn apply_overrides(&mut self, vars: &HashMap<String, String>) {
        if let Some(raw) = vars.get("TIDEPOOL_ACCOUNT") {
            match raw.parse() {
                Ok(addr) => self.account = addr,
                Err(e) => warn!(%raw, error = %e, "ignoring invalid TIDEPOOL_ACCOUNT"),
            }
        }
        if let Some(raw) = vars.get("TIDEPOOL_QUOTE_ASSET") {
            match raw.parse() {
                Ok(addr) => self.quote_asset = addr,
                Err(e) => warn!(%raw, error = %e, "ignoring invalid TIDEPOOL_QUOTE_ASSET"),
            }
        }
        if let Some(raw) = vars.get("TIDEPOOL_MAX_RESERVE_FRACTION") {
            match raw.parse() {
                Ok(fraction) => self.guard.max_reserve_fraction = fraction,
                Err(e) => warn!(%raw, error = %e, "ignoring invalid TIDEPOOL_MAX_RESERVE_FRACTION"),
            }
        }
        if let Some(raw) = vars.get("TIDEPOOL_BOUNDARY_EPSILON") {
            match raw.parse() {
                Ok(epsilon) => self.guard.boundary_epsilon = epsilon,
                Err(e) => warn!(%raw, error = %e, "ignoring invalid TIDEPOOL_BOUNDARY_EPSILON"),
            }
        }
    }

    /// Fail fast on unset collaborator context or out-of-domain policy
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.account.is_zero() {
            return Err(TradeError::Configuration(
                "account address is unset".to_string(),
            ));
        }
        if self.quote_asset.is_zero() {
            return Err(TradeError::Configuration(
                "quote asset address is unset".to_string(),
            ));
        }
        self.guard.validate()
    }
}
