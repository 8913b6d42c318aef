//! End-to-end scenarios for the conversion engine.
//!
//! These tests drive the engine the way a View would: push inputs, move the
//! virtual clock, and watch the observer callbacks.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode};
use converter_client::EvpClient;
use converter_engine::testing::{Observed, RecordingObserver, StubRateClient};
use converter_engine::{ConversionEngine, EngineConfig, ManualClock};
use converter_types::{CurrencyCode, RateError};
use tokio::sync::mpsc::UnboundedReceiver;

const TICK: Duration = Duration::from_secs(10);

/// Helper to build an engine around a stub client and a virtual clock.
fn stub_engine() -> (
    ConversionEngine,
    Arc<StubRateClient>,
    Arc<ManualClock>,
    UnboundedReceiver<Observed>,
) {
    let client = Arc::new(StubRateClient::new());
    let clock = Arc::new(ManualClock::new());
    let (observer, events) = RecordingObserver::new();
    let engine = ConversionEngine::spawn(
        client.clone(),
        clock.clone(),
        observer,
        EngineConfig::default(),
    );
    (engine, client, clock, events)
}

/// Helper to wait for the next callback.
async fn next_event(events: &mut UnboundedReceiver<Observed>) -> Observed {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for a callback")
        .expect("observer channel closed")
}

/// Helper to unwrap a result callback.
async fn next_result(events: &mut UnboundedReceiver<Observed>) -> (f64, f64, CurrencyCode) {
    match next_event(events).await {
        Observed::Result(result) => (result.converted, result.rate, result.to.code),
        Observed::Error(message) => panic!("expected a result, got error {:?}", message),
    }
}

/// Helper to let in-flight work drain.
async fn settle(engine: &ConversionEngine) {
    for _ in 0..10 {
        tokio::task::yield_now().await;
        engine.flush().await;
    }
}

#[tokio::test]
async fn test_happy_path_reports_result_and_rate() {
    let (engine, client, _clock, mut events) = stub_engine();
    client.queue_ok(86.42);

    engine.set_amount("100").unwrap();

    let (converted, rate, to) = next_result(&mut events).await;
    assert_eq!(converted, 86.42);
    assert!((rate - 0.8642).abs() < 1e-12);
    assert_eq!(to, CurrencyCode::EUR);

    engine.flush().await;
    let session = engine.session();
    assert_eq!(session.from.code, CurrencyCode::USD);
    assert_eq!(session.to.code, CurrencyCode::EUR);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].amount, 100.0);
    assert_eq!((calls[0].from.as_str(), calls[0].to.as_str()), ("USD", "EUR"));
}

#[tokio::test]
async fn test_periodic_refresh_reports_each_tick() {
    let (engine, client, clock, mut events) = stub_engine();
    client.queue_ok(0.90);
    engine.start();
    engine.set_amount("1").unwrap();
    // The amount change itself fetches once.
    next_result(&mut events).await;

    client.queue_ok(0.91);
    client.queue_ok(0.92);
    client.queue_ok(0.93);
    clock
        .advance_with(Duration::from_secs(30), || settle(&engine))
        .await;

    for expected in [0.91, 0.92, 0.93] {
        let (converted, rate, _) = next_result(&mut events).await;
        assert_eq!(converted, expected);
        assert!((rate - expected).abs() < 1e-12);
    }
    settle(&engine).await;

    assert_eq!(clock.now(), Duration::from_secs(30));
    assert_eq!(client.call_count(), 4);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_currency_change_supersedes_in_flight_fetch() {
    let (engine, client, _clock, mut events) = stub_engine();
    let first = client.queue_gated();
    client.queue_ok(1500.0);

    engine.set_amount("10").unwrap();
    assert!(client.wait_for_calls(1).await);
    engine.set_to(CurrencyCode::JPY);

    let (converted, rate, to) = next_result(&mut events).await;
    assert_eq!(converted, 1500.0);
    assert!((rate - 150.0).abs() < 1e-9);
    assert_eq!(to, CurrencyCode::JPY);

    // The first request was cancelled; even a late answer must stay silent.
    let _ = first.send(Ok(9.1));
    settle(&engine).await;
    assert!(events.try_recv().is_err());

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].to, "EUR");
    assert_eq!(calls[1].to, "JPY");
}

#[tokio::test]
async fn test_error_then_recovery_on_next_tick() {
    let (engine, client, clock, mut events) = stub_engine();
    client.queue_error(RateError::Transport("connection reset".into()));
    client.queue_ok(0.5);
    engine.start();

    engine.set_amount("2").unwrap();
    match next_event(&mut events).await {
        Observed::Error(message) => assert!(message.contains("connection reset")),
        other => panic!("expected an error, got {:?}", other),
    }

    clock.advance(TICK);
    let (converted, rate, _) = next_result(&mut events).await;
    assert_eq!(converted, 0.5);
    assert!((rate - 0.25).abs() < 1e-12);

    engine.flush().await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.last_result.map(|r| r.converted), Some(0.5));
    assert_eq!(snapshot.fetch_state, converter_types::FetchState::Idle);
}

#[tokio::test]
async fn test_zero_amount_never_fetches() {
    let (engine, client, clock, mut events) = stub_engine();
    engine.start();

    engine.set_amount("0").unwrap();
    engine.flush().await;
    for _ in 0..3 {
        clock.advance(TICK);
    }
    settle(&engine).await;

    assert_eq!(client.call_count(), 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_refresh_keeps_running_through_errors() {
    let (engine, client, clock, mut events) = stub_engine();
    client.queue_ok(1.0);
    engine.start();
    engine.set_amount("1").unwrap();
    next_result(&mut events).await;

    for _ in 0..3 {
        client.queue_error(RateError::EmptyBody);
        clock.advance(TICK);
        assert_eq!(
            next_event(&mut events).await,
            Observed::Error("No data received".to_string())
        );
    }

    client.queue_ok(1.2);
    clock.advance(TICK);
    assert_eq!(next_result(&mut events).await.0, 1.2);
}

/// Helper to start an upstream that always returns `body`.
async fn spawn_upstream(body: &'static str) -> String {
    let app = Router::new().fallback(move || async move { (StatusCode::OK, body) });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_non_numeric_upstream_amount_reads_as_zero() {
    let base = spawn_upstream(r#"{"amount":"not-a-number","currency":"EUR"}"#).await;
    let client = Arc::new(EvpClient::new(base));
    let clock = Arc::new(ManualClock::new());
    let (observer, mut events) = RecordingObserver::new();
    let engine = ConversionEngine::spawn(client, clock, observer, EngineConfig::default());

    engine.set_amount("10").unwrap();

    let (converted, rate, to) = next_result(&mut events).await;
    assert_eq!(converted, 0.0);
    assert_eq!(rate, 0.0);
    assert_eq!(to, CurrencyCode::EUR);
}
