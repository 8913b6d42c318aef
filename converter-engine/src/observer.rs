//! Observer port through which the engine reports to the View.

use converter_types::ConversionResult;

/// Receives fetch outcomes.
///
/// Callbacks run on the engine task, one at a time, in completion order.
/// They must return quickly; calling back into the engine from a callback is
/// fine because engine operations only enqueue work.
pub trait ConversionObserver: Send + Sync + 'static {
    /// A fetch succeeded. `result` also carries the amount and currencies
    /// it was computed from.
    fn on_result(&self, result: &ConversionResult);

    /// A fetch failed; `message` is the error's display text.
    fn on_error(&self, message: &str);
}

/// Observer built from two closures.
pub struct CallbackObserver<R, E> {
    on_result: R,
    on_error: E,
}

impl<R, E> CallbackObserver<R, E>
where
    R: Fn(&ConversionResult) + Send + Sync + 'static,
    E: Fn(&str) + Send + Sync + 'static,
{
    pub fn new(on_result: R, on_error: E) -> Self {
        Self {
            on_result,
            on_error,
        }
    }
}

impl<R, E> ConversionObserver for CallbackObserver<R, E>
where
    R: Fn(&ConversionResult) + Send + Sync + 'static,
    E: Fn(&str) + Send + Sync + 'static,
{
    fn on_result(&self, result: &ConversionResult) {
        (self.on_result)(result)
    }

    fn on_error(&self, message: &str) {
        (self.on_error)(message)
    }
}
