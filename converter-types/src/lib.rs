//! # Converter Types
//!
//! Domain types and port traits for the currency conversion engine.
//! This crate has ZERO external IO dependencies - only data structures,
//! input rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Amount, Session, ConversionResult)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Wire shapes of the upstream exchange service
//! - `error/` - Domain and remote-fetch error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use currency_catalog::{CATALOG, Currency, CurrencyCode, UnknownCurrency, catalog};
pub use domain::{Amount, ConversionResult, FetchState, RequestId, Session};
pub use dto::ConversionResponse;
pub use error::{DomainError, RateError};
pub use ports::{Clock, RateClient, TickFn, TimerHandle};
