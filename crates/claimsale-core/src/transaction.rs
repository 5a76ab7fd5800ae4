//! The claim block liquidation transaction.
//!
//! A transaction is single-shot: it is built for one request and consumed
//! by [`LiquidationTransaction::execute`]. The stages run in order and
//! never repeat:
//!
//! ```text
//! GateCheck ──> Rejected
//!     │
//! QuantityCheck ──> Quoted | Rejected
//!     │
//! Settling ──> Rejected(DepositFailed)
//!     │
//! Mutating ──> Confirmed
//! ```
//!
//! # Atomicity
//!
//! The pool depletion plan is computed before the deposit but applied only
//! after the external ledger reports success. A refused, failed, or
//! timed-out deposit leaves the [`ResourceAccount`] exactly as it was. The
//! store is asked to persist the account exactly once, after a confirmed
//! sale.
//!
//! The transaction does no locking of its own. Callers that may run two
//! sales for the same player at once go through
//! [`ClaimBlockSales`](crate::service::ClaimBlockSales), which serializes
//! them per player.

use std::time::Duration;

use chrono::Utc;
use claimsale_types::{
    LiquidationOutcome, LiquidationRequest, RejectReason, ResourceAccount, SaleReceipt,
};
use rust_decimal::Decimal;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::depletion::{self, DepletionPlan};
use crate::economy::{CurrencyAccount, DepositCause, EconomyService};
use crate::gate;
use crate::store::PlayerDataStore;

/// Runtime bounds for calls into the external ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleSettings {
    /// Deadline for the deposit. Expiry is treated as a failed deposit.
    pub deposit_timeout: Duration,
    /// Deadline for reading the balance after a successful deposit.
    pub balance_timeout: Duration,
}

impl Default for SaleSettings {
    fn default() -> Self {
        Self {
            deposit_timeout: Duration::from_secs(5),
            balance_timeout: Duration::from_secs(2),
        }
    }
}

/// One sell (or quote) request against one player's account.
pub struct LiquidationTransaction<'a, E, S> {
    economy: &'a E,
    store: &'a S,
    settings: SaleSettings,
    request: LiquidationRequest,
}

impl<'a, E, S> LiquidationTransaction<'a, E, S>
where
    E: EconomyService,
    S: PlayerDataStore,
{
    /// Prepare a transaction for `request`.
    pub const fn new(
        economy: &'a E,
        store: &'a S,
        settings: SaleSettings,
        request: LiquidationRequest,
    ) -> Self {
        Self {
            economy,
            store,
            settings,
            request,
        }
    }

    /// Run the transaction against `account`, which must belong to the
    /// requesting player.
    ///
    /// Never fails: every problem becomes a [`LiquidationOutcome::Rejected`].
    pub async fn execute(self, account: &mut ResourceAccount) -> LiquidationOutcome {
        let player_id = account.player_id;

        let pass = match gate::check(self.economy, account) {
            Ok(pass) => pass,
            Err(reason) => return reject(&self.request, reason),
        };

        let Some(requested) = self.request.quantity else {
            debug!(
                player_id = %player_id,
                unit_price = %pass.unit_price,
                available_blocks = pass.available_blocks,
                "claim block sale quoted"
            );
            return LiquidationOutcome::Quoted {
                unit_price: pass.unit_price,
                available_blocks: pass.available_blocks,
            };
        };

        let plan = match validate_quantity(requested, pass.available_blocks, account) {
            Ok(plan) => plan,
            Err(reason) => return reject(&self.request, reason),
        };

        let Some(deposit_amount) = Decimal::from(plan.quantity).checked_mul(pass.unit_price) else {
            return reject(&self.request, RejectReason::InvalidQuantity { requested });
        };

        // --- Settling ---
        let currency = self.economy.default_currency();
        let cause = DepositCause {
            player_id,
            blocks_sold: plan.quantity,
        };
        let deposit = pass
            .external_account
            .deposit(&currency, deposit_amount, &cause);
        match timeout(self.settings.deposit_timeout, deposit).await {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => {
                warn!(
                    player_id = %player_id,
                    deposit = %deposit_amount,
                    reason = failure.reason,
                    "claim block sale deposit refused"
                );
                return reject(
                    &self.request,
                    RejectReason::DepositFailed {
                        reason: failure.reason,
                    },
                );
            }
            Err(_elapsed) => {
                let timeout_ms = self.settings.deposit_timeout.as_millis();
                warn!(
                    player_id = %player_id,
                    deposit = %deposit_amount,
                    timeout_ms,
                    "claim block sale deposit timed out"
                );
                return reject(
                    &self.request,
                    RejectReason::DepositFailed {
                        reason: format!("deposit timed out after {timeout_ms}ms"),
                    },
                );
            }
        }

        // --- Mutating ---
        plan.apply(account);

        let external_balance =
            match timeout(self.settings.balance_timeout, pass.external_account.balance(&currency))
                .await
            {
                Ok(balance) => Some(balance),
                Err(_elapsed) => {
                    warn!(player_id = %player_id, "balance lookup timed out after sale");
                    None
                }
            };

        if let Err(e) = self.store.persist(account) {
            // The currency is already deposited; the sale stands.
            error!(
                player_id = %player_id,
                world_id = %account.world_id,
                error = %e,
                "failed to persist player data after claim block sale"
            );
        }

        let receipt = SaleReceipt {
            quantity: plan.quantity,
            unit_price: pass.unit_price,
            deposit_amount,
            currency,
            external_balance,
            remaining_blocks: account.available_blocks(),
            bonus_blocks: account.bonus_blocks,
            accrued_blocks: account.accrued_blocks,
            economy_mode: account.economy_mode,
            settled_at: Utc::now(),
        };

        info!(
            player_id = %player_id,
            quantity = receipt.quantity,
            deposit = %receipt.deposit_amount,
            remaining_blocks = receipt.remaining_blocks,
            "claim block sale confirmed"
        );

        LiquidationOutcome::Succeeded(receipt)
    }
}

/// Turn the caller's raw quantity into a depletion plan, or a rejection.
///
/// Also refuses quantities the pools cannot cover, which only happens in
/// legacy mode where availability is tracked separately.
fn validate_quantity(
    requested: i64,
    available: u64,
    account: &ResourceAccount,
) -> Result<DepletionPlan, RejectReason> {
    let quantity = u64::try_from(requested)
        .ok()
        .filter(|&q| q > 0)
        .ok_or(RejectReason::InvalidQuantity { requested })?;

    if quantity > available {
        return Err(RejectReason::InsufficientBalance {
            requested,
            available,
        });
    }

    depletion::deplete(account, quantity).map_err(|e| {
        debug!(error = %e, "legacy availability exceeds block pools");
        RejectReason::InsufficientBalance {
            requested,
            available,
        }
    })
}

fn reject(request: &LiquidationRequest, reason: RejectReason) -> LiquidationOutcome {
    debug!(
        player_id = %request.player_id,
        requested = ?request.quantity,
        reason = reason.tag(),
        "claim block sale rejected"
    );
    LiquidationOutcome::Rejected(reason)
}
