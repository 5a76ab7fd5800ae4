//! Price and eligibility gate.
//!
//! Runs before any quantity handling. Checks, in order:
//! 1. An economy integration is installed.
//! 2. The player's sell price is positive.
//! 3. The ledger can resolve an account for the player.
//!
//! On pass, the resolved account, the unit price, and the blocks currently
//! available are returned for quoting and later validation.

use claimsale_types::{RejectReason, ResourceAccount, SellDisabledMode};
use rust_decimal::Decimal;

use crate::economy::EconomyService;

/// Everything a passed gate check hands to the rest of the transaction.
#[derive(Debug)]
pub struct GatePass<A> {
    /// The player's external currency account.
    pub external_account: A,
    /// Price per block.
    pub unit_price: Decimal,
    /// Blocks available for sale.
    pub available_blocks: u64,
}

/// Classify a non-positive price. Returns `None` when selling is allowed.
pub fn sell_disabled_mode(price: Decimal) -> Option<SellDisabledMode> {
    if price.is_zero() {
        Some(SellDisabledMode::BuyOnly)
    } else if price.is_sign_negative() {
        Some(SellDisabledMode::FullyDisabled)
    } else {
        None
    }
}

/// Decide whether `account` may sell, and at what price.
///
/// # Errors
///
/// Returns the terminal [`RejectReason`] for the first check that fails.
pub fn check<E: EconomyService>(
    economy: &E,
    account: &ResourceAccount,
) -> Result<GatePass<E::Account>, RejectReason> {
    if !economy.is_available() {
        return Err(RejectReason::EconomyUnavailable);
    }

    if let Some(mode) = sell_disabled_mode(account.unit_sell_price) {
        return Err(RejectReason::SellingDisabled { mode });
    }

    let external_account = economy
        .get_or_create_account(account.player_id)
        .ok_or(RejectReason::NoExternalAccount)?;

    Ok(GatePass {
        external_account,
        unit_price: account.unit_sell_price,
        available_blocks: account.available_blocks(),
    })
}

#[cfg(test)]
mod tests {
    use claimsale_types::{Currency, PlayerId, WorldId};

    use super::*;
    use crate::economy::InMemoryEconomy;

    fn account(price: Decimal) -> ResourceAccount {
        ResourceAccount {
            player_id: PlayerId::new(),
            world_id: WorldId::new(),
            accrued_blocks: 10,
            bonus_blocks: 5,
            legacy_remaining_blocks: 3,
            unit_sell_price: price,
            economy_mode: true,
        }
    }

    fn economy() -> InMemoryEconomy {
        InMemoryEconomy::new(Currency::new("Dollar", "$"))
    }

    #[test]
    fn zero_price_is_buy_only() {
        assert_eq!(sell_disabled_mode(Decimal::ZERO), Some(SellDisabledMode::BuyOnly));
    }

    #[test]
    fn negative_price_is_fully_disabled() {
        assert_eq!(
            sell_disabled_mode(Decimal::NEGATIVE_ONE),
            Some(SellDisabledMode::FullyDisabled)
        );
    }

    #[test]
    fn positive_price_passes() {
        let result = check(&economy(), &account(Decimal::new(2, 0)));
        assert!(result.is_ok());
        if let Ok(pass) = result {
            assert_eq!(pass.unit_price, Decimal::new(2, 0));
            assert_eq!(pass.available_blocks, 15);
        }
    }

    #[test]
    fn legacy_mode_reports_legacy_availability() {
        let mut acct = account(Decimal::ONE);
        acct.economy_mode = false;
        let result = check(&economy(), &acct);
        assert!(matches!(result, Ok(GatePass { available_blocks: 3, .. })));
    }

    #[test]
    fn missing_economy_is_checked_first() {
        let unavailable = InMemoryEconomy::unavailable(Currency::new("Dollar", "$"));
        let result = check(&unavailable, &account(Decimal::ZERO));
        assert!(matches!(result, Err(RejectReason::EconomyUnavailable)));
    }

    #[test]
    fn disabled_price_is_checked_before_account_resolution() {
        let economy = economy();
        let acct = account(Decimal::ZERO);
        economy.refuse_account(acct.player_id);
        let result = check(&economy, &acct);
        assert!(matches!(
            result,
            Err(RejectReason::SellingDisabled {
                mode: SellDisabledMode::BuyOnly
            })
        ));
    }

    #[test]
    fn unresolvable_account_is_rejected() {
        let economy = economy();
        let acct = account(Decimal::ONE);
        economy.refuse_account(acct.player_id);
        assert!(matches!(
            check(&economy, &acct),
            Err(RejectReason::NoExternalAccount)
        ));
    }
}
