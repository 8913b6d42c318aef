//! Data Transfer Objects for the upstream exchange service.

use serde::{Deserialize, Serialize};

/// Body of a successful `GET .../{amount}-{from}/{to}/latest`.
///
/// Upstream encodes the amount as a JSON string, e.g.
/// `{"amount":"86.42","currency":"EUR"}`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    /// Converted amount as decimal text
    pub amount: String,
    /// Echo of the target currency code
    pub currency: String,
}

impl ConversionResponse {
    /// Parses the amount text, `None` when it is not a number.
    pub fn parsed_amount(&self) -> Option<f64> {
        self.amount.trim().parse::<f64>().ok()
    }
}
