//! Pool depletion engine.
//!
//! Selling removes blocks from two pools in a fixed order: bonus blocks
//! first, then accrued blocks. The plan is computed as a pure function of
//! the two counters so it can be checked before any money moves and
//! applied only after the deposit succeeds.

use claimsale_types::ResourceAccount;

/// Errors from planning a depletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DepletionError {
    /// The pools together hold fewer blocks than requested.
    #[error("cannot remove {quantity} blocks from pools holding {pooled}")]
    ExceedsPools {
        /// Blocks requested.
        quantity: u64,
        /// Blocks held across both pools.
        pooled: u64,
    },
}

/// New pool values after removing `quantity` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepletionPlan {
    /// Blocks removed.
    pub quantity: u64,
    /// Bonus pool after removal.
    pub new_bonus: u64,
    /// Accrued pool after removal.
    pub new_accrued: u64,
}

impl DepletionPlan {
    /// Write the planned pool values into `account`.
    ///
    /// In legacy mode the separately tracked remaining total shrinks by the
    /// same quantity, floored at zero.
    pub fn apply(&self, account: &mut ResourceAccount) {
        account.bonus_blocks = self.new_bonus;
        account.accrued_blocks = self.new_accrued;
        if !account.economy_mode {
            account.legacy_remaining_blocks =
                account.legacy_remaining_blocks.saturating_sub(self.quantity);
        }
    }
}

/// Split `quantity` across the pools, bonus first.
///
/// # Errors
///
/// Returns [`DepletionError::ExceedsPools`] if `quantity > bonus + accrued`.
pub fn split(bonus: u64, accrued: u64, quantity: u64) -> Result<DepletionPlan, DepletionError> {
    if let Some(new_bonus) = bonus.checked_sub(quantity) {
        return Ok(DepletionPlan {
            quantity,
            new_bonus,
            new_accrued: accrued,
        });
    }

    let remaining = quantity.saturating_sub(bonus);
    let new_accrued = accrued
        .checked_sub(remaining)
        .ok_or(DepletionError::ExceedsPools {
            quantity,
            pooled: bonus.saturating_add(accrued),
        })?;

    Ok(DepletionPlan {
        quantity,
        new_bonus: 0,
        new_accrued,
    })
}

/// Plan the removal of `quantity` blocks from `account`'s pools.
///
/// # Errors
///
/// Returns [`DepletionError::ExceedsPools`] if the pools cannot cover it.
pub fn deplete(account: &ResourceAccount, quantity: u64) -> Result<DepletionPlan, DepletionError> {
    split(account.bonus_blocks, account.accrued_blocks, quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use claimsale_types::{PlayerId, WorldId};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn account(bonus: u64, accrued: u64, economy_mode: bool) -> ResourceAccount {
        ResourceAccount {
            player_id: PlayerId::new(),
            world_id: WorldId::new(),
            accrued_blocks: accrued,
            bonus_blocks: bonus,
            legacy_remaining_blocks: 20,
            unit_sell_price: Decimal::ONE,
            economy_mode,
        }
    }

    #[test]
    fn bonus_covers_whole_quantity() {
        let plan = split(5, 10, 3).unwrap();
        assert_eq!((plan.new_bonus, plan.new_accrued), (2, 10));
    }

    #[test]
    fn overflow_into_accrued() {
        let plan = split(5, 10, 7).unwrap();
        assert_eq!((plan.new_bonus, plan.new_accrued), (0, 8));
    }

    #[test]
    fn empty_bonus_draws_from_accrued() {
        let plan = split(0, 10, 4).unwrap();
        assert_eq!((plan.new_bonus, plan.new_accrued), (0, 6));
    }

    #[test]
    fn exact_total_empties_both_pools() {
        let plan = split(5, 10, 15).unwrap();
        assert_eq!((plan.new_bonus, plan.new_accrued), (0, 0));
    }

    #[test]
    fn more_than_pools_is_an_error() {
        assert_eq!(
            split(5, 10, 16),
            Err(DepletionError::ExceedsPools {
                quantity: 16,
                pooled: 15
            })
        );
    }

    #[test]
    fn apply_in_economy_mode_leaves_legacy_total() {
        let mut acct = account(5, 10, true);
        deplete(&acct, 7).unwrap().apply(&mut acct);
        assert_eq!((acct.bonus_blocks, acct.accrued_blocks), (0, 8));
        assert_eq!(acct.legacy_remaining_blocks, 20);
    }

    #[test]
    fn apply_in_legacy_mode_reduces_legacy_total() {
        let mut acct = account(5, 10, false);
        deplete(&acct, 7).unwrap().apply(&mut acct);
        assert_eq!(acct.legacy_remaining_blocks, 13);
    }

    proptest! {
        #[test]
        fn bonus_is_always_spent_first(
            bonus in 0u64..10_000,
            accrued in 0u64..10_000,
            seed in 0u64..20_000,
        ) {
            let quantity = seed % (bonus + accrued + 1);
            let plan = split(bonus, accrued, quantity).unwrap();
            if bonus >= quantity {
                prop_assert_eq!(plan.new_bonus, bonus - quantity);
                prop_assert_eq!(plan.new_accrued, accrued);
            } else {
                prop_assert_eq!(plan.new_bonus, 0);
                prop_assert_eq!(plan.new_accrued, accrued - (quantity - bonus));
            }
            prop_assert_eq!(plan.new_bonus + plan.new_accrued, bonus + accrued - quantity);
        }

        #[test]
        fn quantities_beyond_pools_are_refused(
            bonus in 0u64..10_000,
            accrued in 0u64..10_000,
            extra in 1u64..100,
        ) {
            prop_assert!(split(bonus, accrued, bonus + accrued + extra).is_err());
        }
    }
}
