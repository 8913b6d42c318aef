//! Test doubles for driving the engine without a network.
//!
//! Pair them with [`crate::ManualClock`] for fully deterministic runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use converter_types::{Amount, ConversionResult, RateClient, RateError};
use tokio::sync::{mpsc, oneshot};

// ============================================================================
// Stub Rate Client
// ============================================================================

/// A fetch as seen by the stub.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFetch {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

enum StubReply {
    Ready(Result<f64, RateError>),
    Gated(oneshot::Receiver<Result<f64, RateError>>),
}

/// Rate client that answers from a queue, in call order.
///
/// With nothing queued a fetch fails with a transport error.
#[derive(Default)]
pub struct StubRateClient {
    replies: Mutex<VecDeque<StubReply>>,
    calls: Mutex<Vec<RecordedFetch>>,
}

impl StubRateClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful conversion.
    pub fn queue_ok(&self, converted: f64) {
        self.push(StubReply::Ready(Ok(converted)));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: RateError) {
        self.push(StubReply::Ready(Err(error)));
    }

    /// Queue a reply that is held back until the returned sender fires.
    /// Dropping the sender fails the fetch.
    pub fn queue_gated(&self) -> oneshot::Sender<Result<f64, RateError>> {
        let (tx, rx) = oneshot::channel();
        self.push(StubReply::Gated(rx));
        tx
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Yields to the scheduler until at least `count` calls were made.
    /// Returns false if that did not happen within a bounded number of yields.
    pub async fn wait_for_calls(&self, count: usize) -> bool {
        for _ in 0..1_000 {
            if self.call_count() >= count {
                return true;
            }
            tokio::task::yield_now().await;
        }
        self.call_count() >= count
    }

    fn push(&self, reply: StubReply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl RateClient for StubRateClient {
    async fn fetch(&self, amount: Amount, from: &str, to: &str) -> Result<f64, RateError> {
        self.calls.lock().unwrap().push(RecordedFetch {
            amount: amount.value(),
            from: from.to_string(),
            to: to.to_string(),
        });

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(StubReply::Ready(outcome)) => outcome,
            Some(StubReply::Gated(gate)) => gate
                .await
                .unwrap_or_else(|_| Err(RateError::Transport("gate dropped".into()))),
            None => Err(RateError::Transport("No stub reply queued".into())),
        }
    }
}

// ============================================================================
// Recording Observer
// ============================================================================

/// A callback as seen by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Result(ConversionResult),
    Error(String),
}

/// Observer that forwards every callback into a channel.
pub struct RecordingObserver {
    events: mpsc::UnboundedSender<Observed>,
}

impl RecordingObserver {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Observed>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { events }), rx)
    }
}

impl crate::ConversionObserver for RecordingObserver {
    fn on_result(&self, result: &ConversionResult) {
        let _ = self.events.send(Observed::Result(result.clone()));
    }

    fn on_error(&self, message: &str) {
        let _ = self.events.send(Observed::Error(message.to_string()));
    }
}
