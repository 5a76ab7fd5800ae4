//! The sale service: load, lock, transact.
//!
//! [`ClaimBlockSales`] owns the economy and the store and is the entry point
//! callers use once a command has been parsed and authorized. Each call
//! takes the player's lock, loads the player's account for the world, and
//! runs a fresh [`LiquidationTransaction`] against it.

use claimsale_types::{LiquidationOutcome, LiquidationRequest, WorldId};
use tracing::debug;

use crate::economy::EconomyService;
use crate::error::SaleError;
use crate::locks::PlayerLocks;
use crate::store::PlayerDataStore;
use crate::transaction::{LiquidationTransaction, SaleSettings};

/// Claim block sales for every player, serialized per player.
pub struct ClaimBlockSales<E, S> {
    economy: E,
    store: S,
    locks: PlayerLocks,
    settings: SaleSettings,
}

impl<E, S> ClaimBlockSales<E, S>
where
    E: EconomyService,
    S: PlayerDataStore,
{
    /// Create a service over the given economy and store.
    pub fn new(economy: E, store: S, settings: SaleSettings) -> Self {
        Self {
            economy,
            store,
            locks: PlayerLocks::new(),
            settings,
        }
    }

    /// The economy integration.
    pub const fn economy(&self) -> &E {
        &self.economy
    }

    /// The player data store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Quote or sell for `request.player_id` in `world_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::Store`] if the player's account cannot be
    /// loaded. Every other problem is a rejected outcome.
    pub async fn sell(
        &self,
        world_id: WorldId,
        request: LiquidationRequest,
    ) -> Result<LiquidationOutcome, SaleError> {
        let _guard = self.locks.acquire(request.player_id).await;
        let mut account = self.store.load(world_id, request.player_id)?;
        debug!(
            player_id = %request.player_id,
            world_id = %world_id,
            available_blocks = account.available_blocks(),
            "player data loaded for claim block sale"
        );

        let outcome = LiquidationTransaction::new(&self.economy, &self.store, self.settings, request)
            .execute(&mut account)
            .await;
        Ok(outcome)
    }
}
