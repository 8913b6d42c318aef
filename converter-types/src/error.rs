//! Error types for the conversion engine.

/// Domain-level errors (input rule violations).
///
/// These never reach the observer: rejected input leaves the session as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount is too long: {length} characters, at most {max} allowed")]
    AmountTooLong { length: usize, max: usize },

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error(transparent)]
    UnknownCurrency(#[from] currency_catalog::UnknownCurrency),
}

/// Errors surfaced by a remote conversion fetch.
///
/// The `Display` text is what the observer receives in `on_error`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No data received")]
    EmptyBody,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Currency mismatch: requested {expected}, received {got}")]
    CurrencyMismatch { expected: String, got: String },
}

impl RateError {
    /// Whether the next trigger can reasonably be expected to succeed.
    ///
    /// A malformed URL will be malformed again until the inputs change.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RateError::InvalidUrl(_))
    }
}
