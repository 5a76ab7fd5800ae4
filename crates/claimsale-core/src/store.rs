//! Player data persistence.
//!
//! The sale transaction reads a [`ResourceAccount`] that was loaded before
//! it started, and hands the mutated account back to a [`PlayerDataStore`]
//! exactly once after a confirmed sale. [`InMemoryPlayerStore`] is a
//! map-backed implementation with get-or-create semantics.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use claimsale_types::{PlayerId, ResourceAccount, WorldId};
use rust_decimal::Decimal;

/// Errors raised by a player data store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No data exists for the player and the store does not create it.
    #[error("no player data for {player_id} in world {world_id}")]
    NotFound {
        /// The player looked up.
        player_id: PlayerId,
        /// The world looked up.
        world_id: WorldId,
    },

    /// Writing the account failed.
    #[error("failed to persist player data: {0}")]
    Persist(String),
}

/// Durable storage for per-world player block accounts.
pub trait PlayerDataStore: Send + Sync {
    /// Load the player's account in `world_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the account cannot be produced.
    fn load(&self, world_id: WorldId, player_id: PlayerId) -> Result<ResourceAccount, StoreError>;

    /// Durably save `account`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the write fails.
    fn persist(&self, account: &ResourceAccount) -> Result<(), StoreError>;
}

/// Values given to accounts the store creates on first load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountDefaults {
    /// Sell price per block.
    pub unit_sell_price: Decimal,
    /// Whether the account uses economy-mode availability.
    pub economy_mode: bool,
}

#[derive(Debug)]
struct StoreState {
    accounts: BTreeMap<(WorldId, PlayerId), ResourceAccount>,
    defaults: AccountDefaults,
    persist_calls: u64,
    fail_persist: bool,
}

/// Map-backed [`PlayerDataStore`]. Clones share the same map.
#[derive(Debug, Clone)]
pub struct InMemoryPlayerStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryPlayerStore {
    /// Create an empty store that creates accounts from `defaults`.
    pub fn new(defaults: AccountDefaults) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                accounts: BTreeMap::new(),
                defaults,
                persist_calls: 0,
                fail_persist: false,
            })),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace an account.
    pub fn insert(&self, account: ResourceAccount) {
        self.state()
            .accounts
            .insert((account.world_id, account.player_id), account);
    }

    /// The stored account, if any.
    pub fn get(&self, world_id: WorldId, player_id: PlayerId) -> Option<ResourceAccount> {
        self.state().accounts.get(&(world_id, player_id)).cloned()
    }

    /// Number of times [`PlayerDataStore::persist`] was called.
    pub fn persist_calls(&self) -> u64 {
        self.state().persist_calls
    }

    /// Make subsequent persists fail.
    pub fn set_fail_persist(&self, fail: bool) {
        self.state().fail_persist = fail;
    }
}

impl PlayerDataStore for InMemoryPlayerStore {
    fn load(&self, world_id: WorldId, player_id: PlayerId) -> Result<ResourceAccount, StoreError> {
        let mut state = self.state();
        let defaults = state.defaults;
        let account = state
            .accounts
            .entry((world_id, player_id))
            .or_insert_with(|| ResourceAccount {
                player_id,
                world_id,
                accrued_blocks: 0,
                bonus_blocks: 0,
                legacy_remaining_blocks: 0,
                unit_sell_price: defaults.unit_sell_price,
                economy_mode: defaults.economy_mode,
            });
        Ok(account.clone())
    }

    fn persist(&self, account: &ResourceAccount) -> Result<(), StoreError> {
        let mut state = self.state();
        state.persist_calls = state.persist_calls.saturating_add(1);
        if state.fail_persist {
            return Err(StoreError::Persist(String::from("store is read-only")));
        }
        state
            .accounts
            .insert((account.world_id, account.player_id), account.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn defaults() -> AccountDefaults {
        AccountDefaults {
            unit_sell_price: Decimal::new(15, 1),
            economy_mode: true,
        }
    }

    #[test]
    fn load_creates_account_from_defaults() {
        let store = InMemoryPlayerStore::new(defaults());
        let world = WorldId::new();
        let player = PlayerId::new();

        let account = store.load(world, player).unwrap();
        assert_eq!(account.unit_sell_price, Decimal::new(15, 1));
        assert!(account.economy_mode);
        assert_eq!(account.pooled_blocks(), 0);
        assert!(store.get(world, player).is_some());
    }

    #[test]
    fn accounts_are_per_world() {
        let store = InMemoryPlayerStore::new(defaults());
        let player = PlayerId::new();
        let mut account = store.load(WorldId::new(), player).unwrap();
        account.bonus_blocks = 9;
        store.persist(&account).unwrap();

        let other = store.load(WorldId::new(), player).unwrap();
        assert_eq!(other.bonus_blocks, 0);
        assert_eq!(store.load(account.world_id, player).unwrap().bonus_blocks, 9);
    }

    #[test]
    fn persist_counts_calls_even_when_failing() {
        let store = InMemoryPlayerStore::new(defaults());
        let account = store.load(WorldId::new(), PlayerId::new()).unwrap();
        store.set_fail_persist(true);
        assert!(matches!(store.persist(&account), Err(StoreError::Persist(_))));
        assert_eq!(store.persist_calls(), 1);
    }
}
