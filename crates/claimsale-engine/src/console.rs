//! Line-oriented console front end.
//!
//! Turns parsed commands into sale requests, runs them through
//! [`ClaimBlockSales`], and renders the outcome with the message catalog.

use claimsale_core::{
    ClaimBlockSales, ConfirmationReporter, EconomyService, MessageCatalog, PlayerDataStore,
};
use claimsale_types::{LiquidationRequest, PlayerId, WorldId};
use tracing::{info, warn};

use crate::command::{self, Command};
use crate::players::PlayerDirectory;

/// Console session state.
pub struct Console<E, S> {
    sales: ClaimBlockSales<E, S>,
    catalog: MessageCatalog,
    players: PlayerDirectory,
    world_id: WorldId,
}

impl<E, S> Console<E, S>
where
    E: EconomyService,
    S: PlayerDataStore,
{
    /// Create a console operating on a single world.
    pub fn new(sales: ClaimBlockSales<E, S>, catalog: MessageCatalog, world_id: WorldId) -> Self {
        Self {
            sales,
            catalog,
            players: PlayerDirectory::new(),
            world_id,
        }
    }

    /// Handle one input line, returning the reply to print (if any).
    pub async fn handle(&mut self, line: &str) -> Option<String> {
        let parsed = match command::parse_line(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return None,
            Err(e) => return Some(format!("error: {e}")),
        };

        let player_id = self.players.resolve(parsed.player);
        let reply = match parsed.command {
            Command::SellBlocks { amount } => {
                let request = LiquidationRequest {
                    player_id,
                    quantity: amount,
                };
                self.sell(parsed.player, request).await
            }
            Command::GiveBlocks { amount } => self.give(parsed.player, player_id, amount),
        };
        Some(reply)
    }

    async fn sell(&self, player_name: &str, request: LiquidationRequest) -> String {
        let outcome = match self.sales.sell(self.world_id, request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(player = player_name, error = %e, "claim block sale could not start");
                return format!("error: {e}");
            }
        };

        let report = ConfirmationReporter { player_name }.report(&outcome);
        self.catalog.render(&report).unwrap_or_else(|e| {
            warn!(key = report.key.as_str(), error = %e, "message render failed");
            format!("error: {e}")
        })
    }

    fn give(&self, player_name: &str, player_id: PlayerId, amount: u64) -> String {
        let store = self.sales.store();
        let mut account = match store.load(self.world_id, player_id) {
            Ok(account) => account,
            Err(e) => return format!("error: {e}"),
        };
        account.bonus_blocks = account.bonus_blocks.saturating_add(amount);
        account.legacy_remaining_blocks = account.legacy_remaining_blocks.saturating_add(amount);
        if let Err(e) = store.persist(&account) {
            return format!("error: {e}");
        }
        info!(player = player_name, amount, "bonus claim blocks granted");
        format!(
            "Gave {amount} bonus claim blocks to {player_name}. Available for sale: {}.",
            account.available_blocks()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use claimsale_core::SaleSettings;
    use claimsale_core::economy::InMemoryEconomy;
    use claimsale_core::store::{AccountDefaults, InMemoryPlayerStore};
    use claimsale_types::Currency;
    use rust_decimal::Decimal;

    use super::*;

    fn console(price: Decimal, economy_mode: bool) -> Console<InMemoryEconomy, InMemoryPlayerStore> {
        let sales = ClaimBlockSales::new(
            InMemoryEconomy::new(Currency::new("Dollar", "$")),
            InMemoryPlayerStore::new(AccountDefaults {
                unit_sell_price: price,
                economy_mode,
            }),
            SaleSettings::default(),
        );
        Console::new(
            sales,
            MessageCatalog::new(&BTreeMap::new()).unwrap(),
            WorldId::new(),
        )
    }

    #[tokio::test]
    async fn grant_quote_and_sell() {
        let mut console = console(Decimal::new(2, 0), true);

        let granted = console.handle("alex giveblocks 10").await.unwrap();
        assert_eq!(granted, "Gave 10 bonus claim blocks to alex. Available for sale: 10.");

        let quote = console.handle("alex sellblocks").await.unwrap();
        assert_eq!(
            quote,
            "Each claim block sells for 2. You have 10 blocks available for sale."
        );

        let sold = console.handle("alex sell blocks 4").await.unwrap();
        assert_eq!(
            sold,
            "Deposited 8 in your account. Your balance is now $8. You have 6 claim blocks remaining."
        );
    }

    #[tokio::test]
    async fn legacy_confirmation_has_no_balance() {
        let mut console = console(Decimal::ONE, false);
        console.handle("sam giveblocks 3").await;
        let sold = console.handle("sam sellclaim 3").await.unwrap();
        assert_eq!(
            sold,
            "Deposited 3 in your account. You now have 0 available claim blocks."
        );
    }

    #[tokio::test]
    async fn buy_only_price_is_explained() {
        let mut console = console(Decimal::ZERO, true);
        let reply = console.handle("alex sellclaimblocks 1").await.unwrap();
        assert_eq!(reply, "Claim blocks may only be bought, not sold.");
    }

    #[tokio::test]
    async fn parse_errors_are_reported() {
        let mut console = console(Decimal::ONE, true);
        let reply = console.handle("alex sellblocks many").await.unwrap();
        assert!(reply.starts_with("error: invalid amount"));
        assert_eq!(console.handle("").await, None);
    }

    #[tokio::test]
    async fn overselling_is_refused() {
        let mut console = console(Decimal::ONE, true);
        console.handle("alex giveblocks 2").await;
        let reply = console.handle("alex sellblocks 3").await.unwrap();
        assert_eq!(reply, "You don't have that many claim blocks available for sale.");
    }
}
