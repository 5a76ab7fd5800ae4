//! Enumeration types for sale outcomes.

use serde::{Deserialize, Serialize};

/// Why selling is switched off for a player.
///
/// Both modes reject the sale identically; they only select a more
/// specific message for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellDisabledMode {
    /// Sell price is exactly zero: blocks may be bought but not sold.
    BuyOnly,
    /// Sell price is negative or unset: block trading is fully disabled.
    FullyDisabled,
}

/// The reason a sale was rejected.
///
/// Every rejection is terminal and leaves the player's resource account
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// No external economy integration is installed.
    EconomyUnavailable,
    /// The player's sell price is zero or negative.
    SellingDisabled {
        /// Which flavor of "disabled" applies.
        mode: SellDisabledMode,
    },
    /// The external ledger could not resolve an account for the player.
    NoExternalAccount,
    /// The requested quantity was zero or negative.
    InvalidQuantity {
        /// The quantity as typed by the caller.
        requested: i64,
    },
    /// The requested quantity exceeds the blocks available for sale.
    InsufficientBalance {
        /// The quantity as typed by the caller.
        requested: i64,
        /// Blocks available at the time of the request.
        available: u64,
    },
    /// The external ledger rejected the deposit, errored, or timed out.
    DepositFailed {
        /// Upstream reason, passed through opaquely.
        reason: String,
    },
}

impl RejectReason {
    /// Short machine-readable tag, used as a structured log field.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::EconomyUnavailable => "economy_unavailable",
            Self::SellingDisabled { .. } => "selling_disabled",
            Self::NoExternalAccount => "no_external_account",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::DepositFailed { .. } => "deposit_failed",
        }
    }
}
