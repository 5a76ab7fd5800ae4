//! External currency ledger capabilities and an in-memory stub.
//!
//! The sale transaction never reaches into a global economy service.
//! Instead it is handed an [`EconomyService`], from which it resolves a
//! [`CurrencyAccount`] for the player. Deposits are async and fallible,
//! and report failure as a value ([`DepositFailure`]) so that nothing can
//! unwind past the transaction and leave the block pools half-updated.
//!
//! [`InMemoryEconomy`] implements both traits over a shared map. It backs
//! the engine binary and the tests, and can simulate locked accounts,
//! unresolvable players, slow deposits, and slow balance reads.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use claimsale_types::{Currency, PlayerId};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// A deposit the external ledger refused or could not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DepositFailure {
    /// Upstream reason, passed through to the player untouched.
    pub reason: String,
}

impl DepositFailure {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Attribution attached to a deposit so the ledger can record its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositCause {
    /// The player selling blocks.
    pub player_id: PlayerId,
    /// Number of blocks being sold for this deposit.
    pub blocks_sold: u64,
}

/// A player's account in the external currency ledger.
pub trait CurrencyAccount: Send + Sync {
    /// Credit `amount` of `currency` to this account.
    ///
    /// May block for an unbounded time; callers wrap it in a timeout.
    fn deposit(
        &self,
        currency: &Currency,
        amount: Decimal,
        cause: &DepositCause,
    ) -> impl Future<Output = Result<(), DepositFailure>> + Send;

    /// Current balance of `currency` in this account.
    fn balance(&self, currency: &Currency) -> impl Future<Output = Decimal> + Send;
}

/// The external economy integration.
pub trait EconomyService: Send + Sync {
    /// The account handle this service hands out.
    type Account: CurrencyAccount;

    /// Whether an economy integration is installed and usable.
    fn is_available(&self) -> bool;

    /// The currency block sales are paid in.
    fn default_currency(&self) -> Currency;

    /// Resolve (creating if needed) the player's account, or `None` if the
    /// ledger has no account for this player.
    fn get_or_create_account(&self, player_id: PlayerId) -> Option<Self::Account>;
}

// ---------------------------------------------------------------------------
// In-memory economy
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LedgerState {
    balances: BTreeMap<PlayerId, Decimal>,
    locked: BTreeSet<PlayerId>,
    unresolvable: BTreeSet<PlayerId>,
    deposit_delay: Option<Duration>,
    balance_delay: Option<Duration>,
    deposits: u64,
}

/// An in-memory currency ledger.
///
/// Cloning shares the underlying balances, so a test can keep a handle for
/// inspection after moving a clone into the sale service.
#[derive(Debug, Clone)]
pub struct InMemoryEconomy {
    state: Arc<Mutex<LedgerState>>,
    currency: Currency,
    available: bool,
}

impl InMemoryEconomy {
    /// Create an available economy using `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            currency,
            available: true,
        }
    }

    /// Create an economy that reports itself as not installed.
    pub fn unavailable(currency: Currency) -> Self {
        Self {
            available: false,
            ..Self::new(currency)
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a player's balance.
    pub fn set_balance(&self, player_id: PlayerId, amount: Decimal) {
        self.state().balances.insert(player_id, amount);
    }

    /// A player's balance (zero if never credited).
    pub fn balance_of(&self, player_id: PlayerId) -> Decimal {
        self.state()
            .balances
            .get(&player_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Make every deposit to this player's account fail.
    pub fn lock_account(&self, player_id: PlayerId) {
        self.state().locked.insert(player_id);
    }

    /// Make account resolution fail for this player.
    pub fn refuse_account(&self, player_id: PlayerId) {
        self.state().unresolvable.insert(player_id);
    }

    /// Delay every deposit by `delay` before it is applied.
    pub fn set_deposit_delay(&self, delay: Option<Duration>) {
        self.state().deposit_delay = delay;
    }

    /// Delay every balance read by `delay`.
    pub fn set_balance_delay(&self, delay: Option<Duration>) {
        self.state().balance_delay = delay;
    }

    /// Number of deposits that were applied.
    pub fn deposit_count(&self) -> u64 {
        self.state().deposits
    }
}

impl EconomyService for InMemoryEconomy {
    type Account = InMemoryAccount;

    fn is_available(&self) -> bool {
        self.available
    }

    fn default_currency(&self) -> Currency {
        self.currency.clone()
    }

    fn get_or_create_account(&self, player_id: PlayerId) -> Option<InMemoryAccount> {
        if self.state().unresolvable.contains(&player_id) {
            return None;
        }
        Some(InMemoryAccount {
            player_id,
            state: Arc::clone(&self.state),
        })
    }
}

/// Account handle returned by [`InMemoryEconomy`].
#[derive(Debug, Clone)]
pub struct InMemoryAccount {
    player_id: PlayerId,
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryAccount {
    fn state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CurrencyAccount for InMemoryAccount {
    async fn deposit(
        &self,
        _currency: &Currency,
        amount: Decimal,
        _cause: &DepositCause,
    ) -> Result<(), DepositFailure> {
        let delay = self.state().deposit_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        if state.locked.contains(&self.player_id) {
            return Err(DepositFailure::new("account locked"));
        }
        let current = state
            .balances
            .get(&self.player_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| DepositFailure::new("balance overflow"))?;
        state.balances.insert(self.player_id, updated);
        state.deposits = state.deposits.saturating_add(1);
        Ok(())
    }

    async fn balance(&self, _currency: &Currency) -> Decimal {
        let delay = self.state().balance_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state()
            .balances
            .get(&self.player_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars() -> Currency {
        Currency::new("Dollar", "$")
    }

    fn cause(player_id: PlayerId) -> DepositCause {
        DepositCause {
            player_id,
            blocks_sold: 1,
        }
    }

    #[tokio::test]
    async fn deposit_credits_balance() {
        let economy = InMemoryEconomy::new(dollars());
        let player = PlayerId::new();
        economy.set_balance(player, Decimal::new(5, 0));

        let account = economy.get_or_create_account(player);
        assert!(account.is_some());
        if let Some(account) = account {
            let result = account
                .deposit(&dollars(), Decimal::new(25, 1), &cause(player))
                .await;
            assert!(result.is_ok());
            assert_eq!(account.balance(&dollars()).await, Decimal::new(75, 1));
        }
        assert_eq!(economy.deposit_count(), 1);
    }

    #[tokio::test]
    async fn locked_account_rejects_deposit() {
        let economy = InMemoryEconomy::new(dollars());
        let player = PlayerId::new();
        economy.lock_account(player);

        if let Some(account) = economy.get_or_create_account(player) {
            let result = account.deposit(&dollars(), Decimal::ONE, &cause(player)).await;
            assert_eq!(result, Err(DepositFailure::new("account locked")));
        }
        assert_eq!(economy.balance_of(player), Decimal::ZERO);
        assert_eq!(economy.deposit_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn balance_read_waits_for_delay() {
        let economy = InMemoryEconomy::new(dollars());
        let player = PlayerId::new();
        economy.set_balance(player, Decimal::new(3, 0));
        economy.set_balance_delay(Some(Duration::from_secs(10)));

        if let Some(account) = economy.get_or_create_account(player) {
            let started = tokio::time::Instant::now();
            assert_eq!(account.balance(&dollars()).await, Decimal::new(3, 0));
            assert!(started.elapsed() >= Duration::from_secs(10));
        }
    }

    #[test]
    fn refused_player_has_no_account() {
        let economy = InMemoryEconomy::new(dollars());
        let player = PlayerId::new();
        economy.refuse_account(player);
        assert!(economy.get_or_create_account(player).is_none());
    }

    #[test]
    fn resolving_an_account_does_not_touch_balances() {
        let economy = InMemoryEconomy::new(dollars());
        let player = PlayerId::new();
        let _account = economy.get_or_create_account(player);
        assert!(economy.state().balances.is_empty());
    }

    #[test]
    fn unavailable_economy_reports_so() {
        assert!(!InMemoryEconomy::unavailable(dollars()).is_available());
        assert!(InMemoryEconomy::new(dollars()).is_available());
    }
}
