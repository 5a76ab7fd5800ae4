//! Core value structs: the player's block account, the sale request, and
//! the terminal outcome of a sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::RejectReason;
use crate::ids::{PlayerId, WorldId};

// ---------------------------------------------------------------------------
// Resource account
// ---------------------------------------------------------------------------

/// A player's claim block balances in one world.
///
/// Blocks are held in two pools. Bonus blocks (granted or promotional) are
/// always spent before accrued blocks (earned or purchased). Both pools are
/// unsigned, so they can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAccount {
    /// The owning player.
    pub player_id: PlayerId,
    /// The world this account belongs to.
    pub world_id: WorldId,
    /// Earned or purchased blocks.
    pub accrued_blocks: u64,
    /// Promotional or granted blocks.
    pub bonus_blocks: u64,
    /// Separately tracked remaining total used when economy mode is off.
    ///
    /// Maintained by the wider claim system; it need not equal
    /// `accrued_blocks + bonus_blocks`.
    pub legacy_remaining_blocks: u64,
    /// Currency paid per block sold. Zero or negative disables selling.
    pub unit_sell_price: Decimal,
    /// When true, availability is `accrued + bonus`; otherwise the legacy
    /// remaining total.
    pub economy_mode: bool,
}

impl ResourceAccount {
    /// Blocks the player may currently sell.
    pub const fn available_blocks(&self) -> u64 {
        if self.economy_mode {
            self.pooled_blocks()
        } else {
            self.legacy_remaining_blocks
        }
    }

    /// Sum of both pools, saturating at `u64::MAX`.
    pub const fn pooled_blocks(&self) -> u64 {
        self.accrued_blocks.saturating_add(self.bonus_blocks)
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// A currency understood by the external ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// Display name, e.g. `Dollar`.
    pub name: String,
    /// Symbol prefixed to rendered amounts, e.g. `$`.
    pub symbol: String,
}

impl Currency {
    /// Create a currency from its name and symbol.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Render an amount with this currency's symbol, e.g. `$14.0`.
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{amount}", self.symbol)
    }
}

// ---------------------------------------------------------------------------
// Request and outcome
// ---------------------------------------------------------------------------

/// A single sell request. Created and consumed within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationRequest {
    /// The already-authorized player making the request.
    pub player_id: PlayerId,
    /// Quantity as typed by the caller. `None` asks for a quote only.
    pub quantity: Option<i64>,
}

impl LiquidationRequest {
    /// A quote request: report price and availability without selling.
    pub const fn quote(player_id: PlayerId) -> Self {
        Self {
            player_id,
            quantity: None,
        }
    }

    /// A request to sell `quantity` blocks.
    pub const fn sell(player_id: PlayerId, quantity: i64) -> Self {
        Self {
            player_id,
            quantity: Some(quantity),
        }
    }
}

/// Details of a confirmed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// Blocks removed from the player's pools.
    pub quantity: u64,
    /// Price per block at the time of sale.
    pub unit_price: Decimal,
    /// Amount deposited into the external account (`quantity * unit_price`).
    pub deposit_amount: Decimal,
    /// Currency the deposit was made in.
    pub currency: Currency,
    /// External balance after the deposit, if the ledger answered in time.
    pub external_balance: Option<Decimal>,
    /// Blocks still available for sale after this one.
    pub remaining_blocks: u64,
    /// Bonus pool after depletion.
    pub bonus_blocks: u64,
    /// Accrued pool after depletion.
    pub accrued_blocks: u64,
    /// Whether the account was in economy mode, which decides how
    /// `remaining_blocks` was computed.
    pub economy_mode: bool,
    /// When the sale was confirmed.
    pub settled_at: DateTime<Utc>,
}

/// Terminal value of a sale transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiquidationOutcome {
    /// No quantity was given; price and availability are reported.
    Quoted {
        /// Price per block.
        unit_price: Decimal,
        /// Blocks available for sale.
        available_blocks: u64,
    },
    /// Currency was deposited and blocks were removed.
    Succeeded(SaleReceipt),
    /// The sale did not happen; no state changed.
    Rejected(RejectReason),
}

impl LiquidationOutcome {
    /// The rejection reason, if this outcome is a rejection.
    pub const fn rejection(&self) -> Option<&RejectReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Quoted { .. } | Self::Succeeded(_) => None,
        }
    }

    /// The receipt, if the sale succeeded.
    pub const fn receipt(&self) -> Option<&SaleReceipt> {
        match self {
            Self::Succeeded(receipt) => Some(receipt),
            Self::Quoted { .. } | Self::Rejected(_) => None,
        }
    }
}
