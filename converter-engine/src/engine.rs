//! Conversion Engine Runtime
//!
//! One tokio task owns the [`EngineState`] and is the only place that mutates
//! it or calls the observer. View operations, timer ticks and fetch
//! completions all reach that task as commands on a single ordered channel,
//! so a `set_from` followed by a tick is seen in that order.
//!
//! Each fetch runs on its own task. When a newer trigger supersedes it the
//! task is aborted, and a completion that still slips through is dropped by
//! request id.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use converter_types::{
    Amount, Clock, ConversionResult, Currency, CurrencyCode, DomainError, FetchState, RateClient,
    RateError, RequestId, Session, TimerHandle, UnknownCurrency, catalog,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::observer::ConversionObserver;
use crate::state::{ConversionRequest, EngineState, Notification};

/// Refresh cadence of a started engine.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub refresh_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Point-in-time view of the engine, published after every command.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub session: Session,
    pub last_result: Option<ConversionResult>,
    pub fetch_state: FetchState,
}

enum Command {
    SetAmount(Amount),
    SetFrom(Currency),
    SetTo(Currency),
    Swap,
    Tick,
    Start,
    Stop,
    Completed {
        id: RequestId,
        outcome: Result<f64, RateError>,
    },
    Flush(oneshot::Sender<()>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle the View talks to.
///
/// Every operation is non-blocking: it validates its input, enqueues a
/// command and returns. Dropping the handle stops the engine.
pub struct ConversionEngine {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<EngineSnapshot>,
    stopped: Arc<AtomicBool>,
}

impl ConversionEngine {
    /// Spawns the engine task.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn<C, K>(
        client: Arc<C>,
        clock: Arc<K>,
        observer: Arc<dyn ConversionObserver>,
        config: EngineConfig,
    ) -> Self
    where
        C: RateClient,
        K: Clock,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let state = EngineState::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&state));
        let stopped = Arc::new(AtomicBool::new(false));

        let runtime = EngineRuntime {
            state,
            client,
            clock,
            observer,
            config,
            commands_tx: commands_tx.downgrade(),
            commands_rx,
            snapshot_tx,
            stopped: stopped.clone(),
            in_flight: None,
            timer: None,
        };
        tokio::spawn(runtime.run());

        Self {
            commands: commands_tx,
            snapshot: snapshot_rx,
            stopped,
        }
    }

    /// Sets the amount from text input.
    ///
    /// Rejected input leaves the session untouched and reaches no observer;
    /// the error is returned so the View can restore its field.
    pub fn set_amount(&self, input: &str) -> Result<(), DomainError> {
        let amount = Amount::parse(input)?;
        self.send(Command::SetAmount(amount));
        Ok(())
    }

    /// Sets the amount from numeric input, under the same rules as text.
    pub fn set_amount_value(&self, value: f64) -> Result<(), DomainError> {
        let amount = Amount::from_value(value)?;
        self.send(Command::SetAmount(amount));
        Ok(())
    }

    pub fn set_from(&self, code: CurrencyCode) {
        self.send(Command::SetFrom(code.currency()));
    }

    pub fn set_to(&self, code: CurrencyCode) {
        self.send(Command::SetTo(code.currency()));
    }

    /// Sets the source currency from a code typed or picked by the user.
    /// Codes outside the catalog are rejected and leave the session as is.
    pub fn set_from_code(&self, code: &str) -> Result<(), DomainError> {
        let currency = lookup_currency(code)?;
        self.send(Command::SetFrom(currency));
        Ok(())
    }

    /// Target-currency counterpart of [`ConversionEngine::set_from_code`].
    pub fn set_to_code(&self, code: &str) -> Result<(), DomainError> {
        let currency = lookup_currency(code)?;
        self.send(Command::SetTo(currency));
        Ok(())
    }

    /// Exchanges source and target currencies.
    pub fn swap(&self) {
        self.send(Command::Swap);
    }

    /// Starts the periodic refresh. Calling it again has no effect.
    pub fn start(&self) {
        self.send(Command::Start);
    }

    /// Cancels the refresh and any outstanding fetch. No callback starts
    /// after this returns.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.send(Command::Stop);
    }

    /// The supported currencies, in picker order.
    pub fn currencies(&self) -> &'static [Currency] {
        catalog()
    }

    /// Latest published state. Commands still queued are not reflected;
    /// await [`ConversionEngine::flush`] first when that matters.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn session(&self) -> Session {
        self.snapshot.borrow().session
    }

    /// Whether the engine task is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Resolves once every command sent before it has been processed, or
    /// immediately if the engine has stopped.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Conversion engine has stopped, ignoring command");
        }
    }
}

fn lookup_currency(code: &str) -> Result<Currency, DomainError> {
    let code = code.trim();
    Currency::lookup(code).ok_or_else(|| UnknownCurrency(code.to_string()).into())
}

impl Drop for ConversionEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime
// ─────────────────────────────────────────────────────────────────────────────

struct EngineRuntime<C: RateClient, K: Clock> {
    state: EngineState,
    client: Arc<C>,
    clock: Arc<K>,
    observer: Arc<dyn ConversionObserver>,
    config: EngineConfig,
    /// Weak so that neither the timer nor the runtime keeps the channel open.
    commands_tx: mpsc::WeakUnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
    stopped: Arc<AtomicBool>,
    in_flight: Option<(RequestId, JoinHandle<()>)>,
    timer: Option<TimerHandle>,
}

impl<C: RateClient, K: Clock> EngineRuntime<C, K> {
    async fn run(mut self) {
        tracing::info!("Conversion engine started");

        while let Some(command) = self.commands_rx.recv().await {
            if matches!(command, Command::Stop) {
                break;
            }
            self.handle(command);
            self.snapshot_tx.send_replace(snapshot_of(&self.state));
        }

        self.shutdown();
        tracing::info!("Conversion engine stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetAmount(amount) => {
                let request = self.state.set_amount(amount);
                self.dispatch(request);
            }
            Command::SetFrom(currency) => {
                let request = self.state.set_from(currency);
                self.dispatch(request);
            }
            Command::SetTo(currency) => {
                let request = self.state.set_to(currency);
                self.dispatch(request);
            }
            Command::Swap => {
                let request = self.state.swap();
                self.dispatch(request);
            }
            Command::Tick => {
                let request = self.state.tick();
                self.dispatch(request);
            }
            Command::Start => self.start_timer(),
            Command::Completed { id, outcome } => self.complete(id, outcome),
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Stop => {}
        }
    }

    fn start_timer(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let commands = self.commands_tx.clone();
        let handle = self.clock.schedule_periodic(
            self.config.refresh_interval,
            Box::new(move || {
                if let Some(commands) = commands.upgrade() {
                    let _ = commands.send(Command::Tick);
                }
            }),
        );
        tracing::info!(
            timer = %handle,
            interval = ?self.config.refresh_interval,
            "Periodic refresh started"
        );
        self.timer = Some(handle);
    }

    fn dispatch(&mut self, request: Option<ConversionRequest>) {
        let Some(request) = request else {
            return;
        };

        if let Some((superseded, task)) = self.in_flight.take() {
            task.abort();
            tracing::debug!(request_id = %superseded, by = %request.id, "Fetch superseded");
        }

        let Some(commands) = self.commands_tx.upgrade() else {
            return;
        };

        tracing::debug!(
            request_id = %request.id,
            amount = %request.amount,
            from = %request.from,
            to = %request.to,
            "Dispatching conversion fetch"
        );

        let client = self.client.clone();
        let task = tokio::spawn(async move {
            let outcome = client
                .fetch(request.amount, request.from.code.code(), request.to.code.code())
                .await;
            let _ = commands.send(Command::Completed {
                id: request.id,
                outcome,
            });
        });
        self.in_flight = Some((request.id, task));
    }

    fn complete(&mut self, id: RequestId, outcome: Result<f64, RateError>) {
        let Some(notification) = self.state.complete(id, outcome) else {
            tracing::debug!(request_id = %id, "Dropping stale completion");
            return;
        };

        if matches!(&self.in_flight, Some((current, _)) if *current == id) {
            self.in_flight = None;
        }

        // stop() may have been called from another thread after this command
        // was queued.
        if self.stopped.load(Ordering::SeqCst) {
            tracing::debug!(request_id = %id, "Engine stopping, suppressing callback");
            return;
        }

        match notification {
            Notification::Result(result) => {
                tracing::debug!(
                    request_id = %id,
                    converted = result.converted,
                    rate = result.rate,
                    fetched_at = %result.fetched_at,
                    "Conversion succeeded"
                );
                self.observer.on_result(&result);
            }
            Notification::Error(err) => {
                if err.is_transient() {
                    tracing::warn!(request_id = %id, error = %err, "Conversion fetch failed");
                } else {
                    tracing::error!(request_id = %id, error = %err, "Conversion fetch failed");
                }
                self.observer.on_error(&err.to_string());
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.clock.cancel(handle);
        }
        if let Some((id, task)) = self.in_flight.take() {
            task.abort();
            tracing::debug!(request_id = %id, "Fetch cancelled by stop");
        }
        self.state.stop();
        self.snapshot_tx.send_replace(snapshot_of(&self.state));
    }
}

fn snapshot_of(state: &EngineState) -> EngineSnapshot {
    EngineSnapshot {
        session: *state.session(),
        last_result: state.last_result().cloned(),
        fetch_state: state.fetch_state(),
    }
}
