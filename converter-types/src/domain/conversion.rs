//! Conversion outcomes and fetch bookkeeping.

use chrono::{DateTime, Utc};
use currency_catalog::Currency;
use serde::Serialize;
use std::fmt;

use super::amount::Amount;

/// Identifier assigned to each dispatched fetch, increasing per engine.
///
/// The default value `0` is never assigned; the first dispatch gets `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the identifier that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a fetch is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "request_id", rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Idle,
    InFlight(RequestId),
}

/// A successful conversion together with the inputs it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    /// Amount of `from` sent upstream.
    pub amount: Amount,
    pub from: Currency,
    pub to: Currency,
    /// Amount of `to` returned upstream.
    pub converted: f64,
    /// `converted / amount`.
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl ConversionResult {
    /// Builds a result; `amount` must be positive.
    pub fn new(amount: Amount, from: Currency, to: Currency, converted: f64) -> Self {
        Self {
            amount,
            from,
            to,
            converted,
            rate: converted / amount.value(),
            fetched_at: Utc::now(),
        }
    }
}
