//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The engine depends on these traits, not concrete implementations.

mod clock;
mod rate_client;

pub use clock::{Clock, TickFn, TimerHandle};
pub use rate_client::RateClient;
