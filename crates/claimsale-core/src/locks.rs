//! Per-player mutual exclusion.
//!
//! A sale reads the account, waits on the external ledger, then writes the
//! account back. Two overlapping sales for the same player could both pass
//! validation against the same balance, so they are serialized here. Sales
//! for different players never wait on each other.
//!
//! Entries only live while a sale holds or awaits them, so the registry is
//! bounded by the number of players with a sale in flight.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use claimsale_types::PlayerId;
use tokio::sync::OwnedMutexGuard;

type LockMap = BTreeMap<PlayerId, Arc<tokio::sync::Mutex<()>>>;

/// Registry of one async mutex per player.
#[derive(Debug, Default)]
pub struct PlayerLocks {
    locks: Mutex<LockMap>,
}

impl PlayerLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to `player_id`. Released when the guard
    /// is dropped.
    pub async fn acquire(&self, player_id: PlayerId) -> PlayerLockGuard<'_> {
        let lock = Arc::clone(self.map().entry(player_id).or_default());
        let guard = lock.lock_owned().await;
        PlayerLockGuard {
            registry: self,
            player_id,
            guard: Some(guard),
        }
    }

    /// Drop the player's entry if only the registry still refers to it.
    fn prune(&self, player_id: PlayerId) {
        let mut locks = self.map();
        if locks
            .get(&player_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&player_id);
        }
    }

    /// Number of players with a sale holding or awaiting their lock.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Whether no player currently has a lock entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one player's sales.
#[derive(Debug)]
#[must_use = "the player is unlocked as soon as the guard is dropped"]
pub struct PlayerLockGuard<'a> {
    registry: &'a PlayerLocks,
    player_id: PlayerId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PlayerLockGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own reference no longer counts.
        drop(self.guard.take());
        self.registry.prune(self.player_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_player_is_exclusive() {
        let locks = PlayerLocks::new();
        let player = PlayerId::new();

        let guard = locks.acquire(player).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(player)).await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(20), locks.acquire(player)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_players_do_not_block() {
        let locks = PlayerLocks::new();
        let _first = locks.acquire(PlayerId::new()).await;
        let other = tokio::time::timeout(Duration::from_millis(20), locks.acquire(PlayerId::new())).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = PlayerLocks::new();
        let first = locks.acquire(PlayerId::new()).await;
        let second = locks.acquire(PlayerId::new()).await;
        assert_eq!(locks.len(), 2);

        drop(first);
        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_survives_while_a_sale_is_waiting() {
        let locks = PlayerLocks::new();
        let player = PlayerId::new();
        let first = locks.acquire(player).await;

        let release = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(first);
            locks.len()
        };
        let (len_after_release, second) = tokio::join!(release, locks.acquire(player));

        assert_eq!(len_after_release, 1);
        drop(second);
        assert!(locks.is_empty());
    }
}
