//! Remote conversion port.
//!
//! This trait defines the interface for the upstream exchange service.
//! Implementations can be HTTP clients, stubs for tests, etc.

use crate::domain::Amount;
use crate::error::RateError;

/// Port trait for a single remote conversion.
///
/// A call may be cancelled at any await point by dropping the future; an
/// implementation must not produce side effects the caller relies on after
/// that.
#[async_trait::async_trait]
pub trait RateClient: Send + Sync + 'static {
    /// Converts `amount` of `from` into `to` at the latest quote.
    ///
    /// The caller guarantees `amount` is positive. `from` and `to` are
    /// passed through as opaque codes, without checking them against the
    /// catalog.
    async fn fetch(&self, amount: Amount, from: &str, to: &str) -> Result<f64, RateError>;
}
