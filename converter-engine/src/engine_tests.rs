//! ConversionEngine unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use converter_types::{CurrencyCode, DomainError, FetchState, RateError};
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::testing::{Observed, RecordingObserver, StubRateClient};
    use crate::{ConversionEngine, EngineConfig, ManualClock};

    const REFRESH: Duration = Duration::from_secs(10);

    /// Engine wired to a stub client, a virtual clock and a recording observer.
    pub struct Harness {
        pub engine: ConversionEngine,
        pub client: Arc<StubRateClient>,
        pub clock: Arc<ManualClock>,
        pub events: UnboundedReceiver<Observed>,
    }

    pub fn harness() -> Harness {
        let client = Arc::new(StubRateClient::new());
        let clock = Arc::new(ManualClock::new());
        let (observer, events) = RecordingObserver::new();
        let engine = ConversionEngine::spawn(
            client.clone(),
            clock.clone(),
            observer,
            EngineConfig::default(),
        );
        Harness {
            engine,
            client,
            clock,
            events,
        }
    }

    pub async fn next_event(events: &mut UnboundedReceiver<Observed>) -> Observed {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for a callback")
            .expect("observer channel closed")
    }

    /// Lets spawned fetches and their completions run to quiescence.
    pub async fn settle(engine: &ConversionEngine) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            engine.flush().await;
        }
    }

    #[tokio::test]
    async fn test_set_amount_emits_result() {
        let mut h = harness();
        h.client.queue_ok(86.42);

        h.engine.set_amount("100").unwrap();

        match next_event(&mut h.events).await {
            Observed::Result(result) => {
                assert_eq!(result.converted, 86.42);
                assert!((result.rate - 0.8642).abs() < 1e-12);
                assert_eq!(result.from.code, CurrencyCode::USD);
                assert_eq!(result.to.code, CurrencyCode::EUR);
            }
            other => panic!("unexpected callback: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_same_amount_twice_fetches_once() {
        let mut h = harness();
        h.client.queue_ok(1.0);
        h.client.queue_ok(2.0);

        h.engine.set_amount("5").unwrap();
        h.engine.set_amount("5.0").unwrap();
        next_event(&mut h.events).await;
        settle(&h.engine).await;

        assert_eq!(h.client.call_count(), 1);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejected_amount_is_silent() {
        let mut h = harness();

        let err = h.engine.set_amount("12345678901").unwrap_err();
        assert!(matches!(err, DomainError::AmountTooLong { .. }));
        assert!(matches!(
            h.engine.set_amount("abc"),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            h.engine.set_amount_value(-3.0),
            Err(DomainError::NegativeAmount)
        ));
        settle(&h.engine).await;

        assert_eq!(h.client.call_count(), 0);
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.engine.session().amount.value(), 0.0);
    }

    #[tokio::test]
    async fn test_numeric_amount_input() {
        let mut h = harness();
        h.client.queue_ok(3.0);

        h.engine.set_amount_value(2.5).unwrap();
        next_event(&mut h.events).await;

        assert_eq!(h.client.calls()[0].amount, 2.5);
    }

    #[tokio::test]
    async fn test_swap_twice_restores_pair_and_fetches_each_time() {
        let mut h = harness();
        h.client.queue_ok(0.9);
        h.client.queue_ok(1.1);
        h.client.queue_ok(0.9);

        h.engine.set_amount("1").unwrap();
        next_event(&mut h.events).await;

        h.engine.swap();
        match next_event(&mut h.events).await {
            Observed::Result(result) => {
                assert_eq!(result.from.code, CurrencyCode::EUR);
                assert_eq!(result.to.code, CurrencyCode::USD);
            }
            other => panic!("unexpected callback: {:?}", other),
        }

        h.engine.swap();
        next_event(&mut h.events).await;
        h.engine.flush().await;

        let session = h.engine.session();
        assert_eq!(session.from.code, CurrencyCode::USD);
        assert_eq!(session.to.code, CurrencyCode::EUR);
        assert_eq!(h.client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let h = harness();

        h.engine.start();
        h.engine.start();
        h.engine.flush().await;

        assert_eq!(h.clock.active_timers(), 1);
    }

    #[tokio::test]
    async fn test_set_from_then_tick_uses_new_currency() {
        let mut h = harness();
        h.client.queue_ok(0.9);
        h.engine.start();
        h.engine.set_amount("1").unwrap();
        next_event(&mut h.events).await;

        h.client.queue_ok(0.8);
        h.client.queue_ok(0.8);
        h.engine.set_from(CurrencyCode::GBP);
        h.clock.advance(REFRESH);

        match next_event(&mut h.events).await {
            Observed::Result(result) => assert_eq!(result.from.code, CurrencyCode::GBP),
            other => panic!("unexpected callback: {:?}", other),
        }
        settle(&h.engine).await;

        let calls = h.client.calls();
        assert!(calls[1..].iter().all(|call| call.from == "GBP"));
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_zero_amount_keeps_in_flight_fetch_and_its_basis() {
        let mut h = harness();
        let gate = h.client.queue_gated();

        h.engine.set_amount("10").unwrap();
        assert!(h.client.wait_for_calls(1).await);
        h.engine.set_amount("0").unwrap();
        h.engine.flush().await;
        gate.send(Ok(9.0)).unwrap();

        match next_event(&mut h.events).await {
            Observed::Result(result) => {
                assert_eq!(result.amount.value(), 10.0);
                assert!((result.rate - 0.9).abs() < 1e-12);
            }
            other => panic!("unexpected callback: {:?}", other),
        }
        assert_eq!(h.engine.session().amount.value(), 0.0);
    }

    #[tokio::test]
    async fn test_error_message_is_error_display() {
        let mut h = harness();
        h.client.queue_error(RateError::EmptyBody);

        h.engine.set_amount("1").unwrap();

        assert_eq!(
            next_event(&mut h.events).await,
            Observed::Error("No data received".to_string())
        );
    }

    #[tokio::test]
    async fn test_snapshot_tracks_fetch_state() {
        let mut h = harness();
        let gate = h.client.queue_gated();

        h.engine.set_amount("4").unwrap();
        h.engine.flush().await;
        assert!(matches!(h.engine.snapshot().fetch_state, FetchState::InFlight(_)));

        assert!(h.client.wait_for_calls(1).await);
        gate.send(Ok(2.0)).unwrap();
        next_event(&mut h.events).await;
        h.engine.flush().await;

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.fetch_state, FetchState::Idle);
        assert_eq!(snapshot.last_result.unwrap().converted, 2.0);
    }

    #[tokio::test]
    async fn test_stop_cancels_timer_and_in_flight_fetch() {
        let mut h = harness();
        let gate = h.client.queue_gated();
        h.engine.start();
        h.engine.set_amount("5").unwrap();
        assert!(h.client.wait_for_calls(1).await);

        h.engine.stop();
        // The fetch task is aborted, so its gate may already be gone.
        let _ = gate.send(Ok(3.0));
        h.engine.flush().await;
        h.clock.advance(REFRESH * 3);
        settle(&h.engine).await;

        assert!(!h.engine.is_running());
        assert_eq!(h.clock.active_timers(), 0);
        assert_eq!(h.client.call_count(), 1);
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.engine.snapshot().fetch_state, FetchState::Idle);
    }

    #[tokio::test]
    async fn test_operations_after_stop_are_ignored() {
        let mut h = harness();
        h.engine.stop();
        h.engine.flush().await;

        h.engine.set_amount("7").unwrap();
        h.engine.swap();
        h.engine.start();
        settle(&h.engine).await;

        assert_eq!(h.client.call_count(), 0);
        assert_eq!(h.clock.active_timers(), 0);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropping_engine_cancels_timer() {
        let h = harness();
        h.engine.start();
        h.engine.flush().await;
        assert_eq!(h.clock.active_timers(), 1);

        let Harness { engine, clock, .. } = h;
        drop(engine);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(clock.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_set_currency_by_code() {
        let mut h = harness();
        h.client.queue_ok(1.0);
        h.client.queue_ok(2.0);
        h.client.queue_ok(3.0);
        h.engine.set_amount("1").unwrap();
        next_event(&mut h.events).await;

        h.engine.set_from_code(" gbp ").unwrap();
        h.engine.set_to_code("JPY").unwrap();
        settle(&h.engine).await;

        let session = h.engine.session();
        assert_eq!(session.from.code, CurrencyCode::GBP);
        assert_eq!(session.to.code, CurrencyCode::JPY);
        assert_eq!(h.client.calls().last().unwrap().from, "GBP");
    }

    #[tokio::test]
    async fn test_unknown_currency_code_is_rejected() {
        let mut h = harness();
        h.client.queue_ok(1.0);
        h.engine.set_amount("1").unwrap();
        next_event(&mut h.events).await;

        let err = h.engine.set_to_code("XYZ").unwrap_err();
        assert!(matches!(err, DomainError::UnknownCurrency(_)));
        assert_eq!(err.to_string(), "Unknown currency: XYZ");
        assert!(h.engine.set_from_code("").is_err());
        settle(&h.engine).await;

        assert_eq!(h.client.call_count(), 1);
        assert_eq!(h.engine.session().to.code, CurrencyCode::EUR);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_currencies_is_catalog() {
        let h = harness();
        let currencies = h.engine.currencies();
        assert_eq!(currencies.len(), 51);
        assert_eq!(currencies[0].code, CurrencyCode::USD);
        assert_eq!(currencies[1].code, CurrencyCode::EUR);
    }
}
