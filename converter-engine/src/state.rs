//! Conversion state machine.
//!
//! Pure bookkeeping for one session: no I/O, no timers, no callbacks. Each
//! trigger returns the request the runtime must dispatch, and each completion
//! returns the notification the runtime must deliver.
//!
//! ```text
//! Idle         --trigger-->          InFlight(n)
//! InFlight(n)  --trigger-->          InFlight(n+1)   (n superseded)
//! InFlight(n)  --response(n) ok-->   Idle + result
//! InFlight(n)  --response(n) err-->  Idle + error
//! InFlight(n)  --response(m != n)--> dropped
//! ```

use converter_types::{
    Amount, ConversionResult, Currency, FetchState, RateError, RequestId, Session,
};

/// A fetch the runtime must issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub id: RequestId,
    pub amount: Amount,
    pub from: Currency,
    pub to: Currency,
}

/// What the observer must hear about a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Result(ConversionResult),
    Error(RateError),
}

/// Session state plus fetch bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    session: Session,
    last_result: Option<ConversionResult>,
    pending: Option<ConversionRequest>,
    last_id: RequestId,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn last_result(&self) -> Option<&ConversionResult> {
        self.last_result.as_ref()
    }

    pub fn fetch_state(&self) -> FetchState {
        match &self.pending {
            Some(request) => FetchState::InFlight(request.id),
            None => FetchState::Idle,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Triggers
    // ─────────────────────────────────────────────────────────────────────────────

    /// Updates the amount. Writing the current value again is a no-op.
    pub fn set_amount(&mut self, amount: Amount) -> Option<ConversionRequest> {
        if amount == self.session.amount {
            return None;
        }
        self.session.amount = amount;
        self.trigger()
    }

    pub fn set_from(&mut self, currency: Currency) -> Option<ConversionRequest> {
        self.session.from = currency;
        self.trigger()
    }

    pub fn set_to(&mut self, currency: Currency) -> Option<ConversionRequest> {
        self.session.to = currency;
        self.trigger()
    }

    pub fn swap(&mut self) -> Option<ConversionRequest> {
        self.session.swap();
        self.trigger()
    }

    /// Periodic refresh.
    pub fn tick(&mut self) -> Option<ConversionRequest> {
        self.trigger()
    }

    /// Issues a fresh request for the current session, superseding any
    /// outstanding one. Nothing happens while the amount is zero.
    pub fn trigger(&mut self) -> Option<ConversionRequest> {
        if !self.session.amount.is_positive() {
            return None;
        }

        self.last_id = self.last_id.next();
        let request = ConversionRequest {
            id: self.last_id,
            amount: self.session.amount,
            from: self.session.from,
            to: self.session.to,
        };
        self.pending = Some(request);
        Some(request)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Completion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records the outcome of request `id`. Outcomes of superseded requests
    /// yield nothing.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<f64, RateError>,
    ) -> Option<Notification> {
        let request = self.pending.filter(|pending| pending.id == id)?;
        self.pending = None;

        match outcome {
            Ok(converted) => {
                // The rate is always relative to what was sent upstream.
                let result =
                    ConversionResult::new(request.amount, request.from, request.to, converted);
                self.last_result = Some(result.clone());
                Some(Notification::Result(result))
            }
            Err(err) => Some(Notification::Error(err)),
        }
    }

    /// Forgets the outstanding request, returning its id if there was one.
    pub fn stop(&mut self) -> Option<RequestId> {
        self.pending.take().map(|request| request.id)
    }
}
