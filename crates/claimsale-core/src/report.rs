//! Confirmation reporting and player-facing messages.
//!
//! [`ConfirmationReporter`] maps a [`LiquidationOutcome`] to a
//! [`SaleReport`]: a message key plus named string arguments. Rendering is
//! a separate step, done by a [`MessageCatalog`] holding one `minijinja`
//! template per key. Built-in English templates can be overridden per key
//! from configuration.

use std::collections::BTreeMap;

use claimsale_types::{LiquidationOutcome, RejectReason, SaleReceipt, SellDisabledMode};
use minijinja::Environment;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

// ---------------------------------------------------------------------------
// Message keys
// ---------------------------------------------------------------------------

/// Every message the sale can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKey {
    /// No economy integration installed.
    EconomyNotInstalled,
    /// Buying and selling blocks is disabled.
    BuySellDisabled,
    /// Blocks may be bought but not sold.
    OnlyBuy,
    /// No external account for the player. Args: `player`.
    PlayerNotFound,
    /// Price quote. Args: `amount` (price per block), `balance` (blocks).
    SellQuote,
    /// Quantity was zero or negative.
    InvalidBlockCount,
    /// Quantity exceeds the blocks available.
    BlocksNotAvailable,
    /// The deposit failed. Args: `reason`.
    SellError,
    /// Sale confirmed in economy mode. Args: `deposit`, `balance`, `amount`.
    EconomyModeSaleConfirmation,
    /// Sale confirmed in legacy mode. Args: `deposit`, `amount`.
    SaleConfirmation,
}

impl MessageKey {
    /// All keys, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::EconomyNotInstalled,
        Self::BuySellDisabled,
        Self::OnlyBuy,
        Self::PlayerNotFound,
        Self::SellQuote,
        Self::InvalidBlockCount,
        Self::BlocksNotAvailable,
        Self::SellError,
        Self::EconomyModeSaleConfirmation,
        Self::SaleConfirmation,
    ];

    /// The key's name as used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EconomyNotInstalled => "economy-not-installed",
            Self::BuySellDisabled => "buy-sell-disabled",
            Self::OnlyBuy => "only-buy",
            Self::PlayerNotFound => "player-not-found",
            Self::SellQuote => "sell-quote",
            Self::InvalidBlockCount => "invalid-block-count",
            Self::BlocksNotAvailable => "blocks-not-available",
            Self::SellError => "sell-error",
            Self::EconomyModeSaleConfirmation => "economy-mode-sale-confirmation",
            Self::SaleConfirmation => "sale-confirmation",
        }
    }

    /// Look a key up by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    const fn default_template(self) -> &'static str {
        match self {
            Self::EconomyNotInstalled => "No economy plugin is installed.",
            Self::BuySellDisabled => "Buying and selling claim blocks is disabled.",
            Self::OnlyBuy => "Claim blocks may only be bought, not sold.",
            Self::PlayerNotFound => "No economy account found for player {{ player }}.",
            Self::SellQuote => {
                "Each claim block sells for {{ amount }}. You have {{ balance }} blocks available for sale."
            }
            Self::InvalidBlockCount => "Block count must be greater than 0.",
            Self::BlocksNotAvailable => "You don't have that many claim blocks available for sale.",
            Self::SellError => "Could not sell claim blocks. Reason: {{ reason }}.",
            Self::EconomyModeSaleConfirmation => {
                "Deposited {{ deposit }} in your account. Your balance is now {{ balance }}. You have {{ amount }} claim blocks remaining."
            }
            Self::SaleConfirmation => {
                "Deposited {{ deposit }} in your account. You now have {{ amount }} available claim blocks."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// A message ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReport {
    /// Which message to show.
    pub key: MessageKey,
    /// Template arguments.
    pub args: BTreeMap<&'static str, String>,
}

impl SaleReport {
    const fn bare(key: MessageKey) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
        }
    }

    fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.args.insert(name, value.to_string());
        self
    }
}

/// Turns outcomes into [`SaleReport`]s for one player.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationReporter<'a> {
    /// Display name used in "player not found".
    pub player_name: &'a str,
}

impl ConfirmationReporter<'_> {
    /// Describe `outcome`. Pure; nothing is mutated.
    pub fn report(&self, outcome: &LiquidationOutcome) -> SaleReport {
        match outcome {
            LiquidationOutcome::Quoted {
                unit_price,
                available_blocks,
            } => SaleReport::bare(MessageKey::SellQuote)
                .with("amount", unit_price)
                .with("balance", available_blocks),
            LiquidationOutcome::Succeeded(receipt) => Self::confirmation(receipt),
            LiquidationOutcome::Rejected(reason) => self.rejection(reason),
        }
    }

    fn confirmation(receipt: &SaleReceipt) -> SaleReport {
        // Economy mode confirmations include the external balance.
        if receipt.economy_mode {
            let balance = receipt.external_balance.map_or_else(
                || String::from("unknown"),
                |amount| receipt.currency.format(amount),
            );
            SaleReport::bare(MessageKey::EconomyModeSaleConfirmation)
                .with("deposit", receipt.deposit_amount)
                .with("balance", balance)
                .with("amount", receipt.remaining_blocks)
        } else {
            SaleReport::bare(MessageKey::SaleConfirmation)
                .with("deposit", receipt.deposit_amount)
                .with("amount", receipt.remaining_blocks)
        }
    }

    fn rejection(&self, reason: &RejectReason) -> SaleReport {
        match reason {
            RejectReason::EconomyUnavailable => SaleReport::bare(MessageKey::EconomyNotInstalled),
            RejectReason::SellingDisabled {
                mode: SellDisabledMode::BuyOnly,
            } => SaleReport::bare(MessageKey::OnlyBuy),
            RejectReason::SellingDisabled {
                mode: SellDisabledMode::FullyDisabled,
            } => SaleReport::bare(MessageKey::BuySellDisabled),
            RejectReason::NoExternalAccount => {
                SaleReport::bare(MessageKey::PlayerNotFound).with("player", self.player_name)
            }
            RejectReason::InvalidQuantity { .. } => {
                SaleReport::bare(MessageKey::InvalidBlockCount)
            }
            RejectReason::InsufficientBalance { .. } => {
                SaleReport::bare(MessageKey::BlocksNotAvailable)
            }
            RejectReason::DepositFailed { reason } => {
                SaleReport::bare(MessageKey::SellError).with("reason", reason)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Compiled message templates, one per [`MessageKey`].
pub struct MessageCatalog {
    env: Environment<'static>,
}

impl MessageCatalog {
    /// Build the catalog from the built-in templates, replacing any whose
    /// name appears in `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::UnknownMessageKey`] for an override that names
    /// no message, or [`ReportError::Template`] if a template fails to parse.
    pub fn new(overrides: &BTreeMap<String, String>) -> Result<Self, ReportError> {
        let mut env = Environment::new();

        for name in overrides.keys() {
            if MessageKey::from_name(name).is_none() {
                return Err(ReportError::UnknownMessageKey(name.clone()));
            }
        }

        for key in MessageKey::ALL {
            let source = overrides
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| key.default_template().to_owned());
            env.add_template_owned(key.as_str(), source).map_err(|e| {
                ReportError::Template(format!("failed to add {} template: {e}", key.as_str()))
            })?;
        }

        Ok(Self { env })
    }

    /// Render `report` to text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Template`] if rendering fails.
    pub fn render(&self, report: &SaleReport) -> Result<String, ReportError> {
        let name = report.key.as_str();
        self.env
            .get_template(name)
            .map_err(|e| ReportError::Template(format!("missing {name} template: {e}")))?
            .render(&report.args)
            .map_err(|e| ReportError::Template(format!("{name} render failed: {e}")))
    }
}
