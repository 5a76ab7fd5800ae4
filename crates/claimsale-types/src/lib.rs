//! Shared type definitions for the claim block sale service.
//!
//! This crate is the single source of truth for the values that cross the
//! boundary between the sale transaction, the player data store, and the
//! external currency ledger.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for players and worlds
//! - [`enums`] -- Rejection reasons and selling modes
//! - [`structs`] -- Resource accounts, requests, receipts, and outcomes

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{RejectReason, SellDisabledMode};
pub use ids::{PlayerId, WorldId};
pub use structs::{
    Currency, LiquidationOutcome, LiquidationRequest, ResourceAccount, SaleReceipt,
};
