//! The conversion session driven by the View.

use currency_catalog::{CATALOG, Currency};
use serde::Serialize;

use super::amount::Amount;

/// What the user currently asks to convert.
///
/// `from` and `to` are always catalog members; they may be equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Session {
    pub amount: Amount,
    pub from: Currency,
    pub to: Currency,
}

impl Session {
    /// Exchanges source and target currencies.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}

impl Default for Session {
    /// Zero amount, converting the first catalog entry into the second.
    fn default() -> Self {
        Self {
            amount: Amount::ZERO,
            from: CATALOG[0],
            to: CATALOG[1],
        }
    }
}
