//! Error types for the claimsale-core crate.
//!
//! Business rejections (bad quantity, selling disabled, deposit refused)
//! are not errors: they travel as [`RejectReason`] values inside a
//! [`LiquidationOutcome`]. The errors here cover the infrastructure around
//! the transaction.
//!
//! [`RejectReason`]: claimsale_types::RejectReason
//! [`LiquidationOutcome`]: claimsale_types::LiquidationOutcome

use crate::store::StoreError;

/// Errors that can occur while running a sale through [`ClaimBlockSales`].
///
/// [`ClaimBlockSales`]: crate::service::ClaimBlockSales
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// The player's resource account could not be loaded.
    #[error("player data unavailable: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Errors raised while building or rendering player messages.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A configured message override names a key that does not exist.
    #[error("unknown message key: {0}")]
    UnknownMessageKey(String),

    /// A message template failed to compile or render.
    #[error("template error: {0}")]
    Template(String),
}
