//! Player name to [`PlayerId`] mapping for the console session.
//!
//! Identity resolution belongs to the host; the console only needs stable
//! IDs for the lifetime of the process.

use std::collections::BTreeMap;

use claimsale_types::PlayerId;

/// Names seen so far and the IDs assigned to them.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    ids: BTreeMap<String, PlayerId>,
}

impl PlayerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ID for `name`, assigning a new one on first sight.
    pub fn resolve(&mut self, name: &str) -> PlayerId {
        *self.ids.entry(name.to_owned()).or_default()
    }
}
