//! Domain models for the conversion engine.

pub mod amount;
pub mod conversion;
pub mod session;

pub use amount::{Amount, MAX_INPUT_LEN};
pub use conversion::{ConversionResult, FetchState, RequestId};
pub use session::Session;
