//! # Converter Engine
//!
//! Holds the conversion session, refreshes it periodically and reports
//! results to an observer.
//!
//! ## Architecture
//!
//! - `state` - Pure state machine (session, request ids, supersession)
//! - `engine` - Runtime task and the handle the View talks to
//! - `clock` - Timer adapters (tokio and virtual)
//! - `observer` - Callback port towards the View
//! - `testing` - Stub client and recording observer
//!
//! The runtime is generic over `C: RateClient` and `K: Clock`, allowing
//! different adapters to be injected.

pub mod clock;
pub mod engine;
pub mod observer;
pub mod state;
pub mod testing;

#[cfg(test)]
mod engine_tests;

pub use clock::{ManualClock, TokioClock};
pub use engine::{ConversionEngine, DEFAULT_REFRESH_INTERVAL, EngineConfig, EngineSnapshot};
pub use observer::{CallbackObserver, ConversionObserver};
pub use state::{ConversionRequest, EngineState, Notification};
