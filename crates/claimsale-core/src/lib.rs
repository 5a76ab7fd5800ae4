//! Claim block sales: converting a player's claim blocks into currency in
//! an external economy.
//!
//! # Architecture
//!
//! - [`gate`] -- Economy availability, sell price, and account resolution.
//! - [`depletion`] -- Pure bonus-first pool depletion.
//! - [`transaction`] -- [`LiquidationTransaction`], the single-shot sale.
//! - [`report`] -- [`ConfirmationReporter`] and the [`MessageCatalog`].
//! - [`economy`] -- External ledger capabilities and an in-memory stub.
//! - [`store`] -- Player data persistence and an in-memory stub.
//! - [`locks`] -- Per-player serialization.
//! - [`service`] -- [`ClaimBlockSales`], the load/lock/run entry point.
//! - [`config`] -- YAML configuration.
//!
//! # Atomicity
//!
//! Blocks are removed only after the external deposit reports success. A
//! refused, failed, or timed-out deposit leaves the player's account
//! exactly as it was, and nothing is persisted.
//!
//! # Usage
//!
//! ```
//! use claimsale_core::economy::InMemoryEconomy;
//! use claimsale_core::store::{AccountDefaults, InMemoryPlayerStore, PlayerDataStore};
//! use claimsale_core::transaction::{LiquidationTransaction, SaleSettings};
//! use claimsale_types::{Currency, LiquidationRequest, PlayerId, WorldId};
//! use rust_decimal::Decimal;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().map(|rt| rt.block_on(async {
//! let economy = InMemoryEconomy::new(Currency::new("Dollar", "$"));
//! let store = InMemoryPlayerStore::new(AccountDefaults {
//!     unit_sell_price: Decimal::new(2, 0),
//!     economy_mode: true,
//! });
//!
//! let player = PlayerId::new();
//! if let Ok(mut account) = store.load(WorldId::new(), player) {
//!     account.bonus_blocks = 5;
//!     account.accrued_blocks = 10;
//!
//!     let request = LiquidationRequest::sell(player, 7);
//!     let outcome = LiquidationTransaction::new(&economy, &store, SaleSettings::default(), request)
//!         .execute(&mut account)
//!         .await;
//!
//!     assert!(outcome.receipt().is_some());
//!     assert_eq!((account.bonus_blocks, account.accrued_blocks), (0, 8));
//! }
//! # })).ok();
//! ```

pub mod config;
pub mod depletion;
pub mod economy;
pub mod error;
pub mod gate;
pub mod locks;
pub mod report;
pub mod service;
pub mod store;
pub mod transaction;

// Re-export primary types at crate root.
pub use config::{ConfigError, EnvOverrideError, SaleConfig};
pub use economy::{CurrencyAccount, DepositCause, DepositFailure, EconomyService};
pub use error::{ReportError, SaleError};
pub use report::{ConfirmationReporter, MessageCatalog, MessageKey, SaleReport};
pub use service::ClaimBlockSales;
pub use store::{PlayerDataStore, StoreError};
pub use transaction::{LiquidationTransaction, SaleSettings};
