//! End-to-end tests driving the Monitor facade with fake probers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use pollwell::{
    aggregate, Monitor, MonitorConfig, MonitorError, ProbeError, ProbeOutcome, Prober, Sample,
    SampleStatus, Target, TargetKind,
};

struct AlwaysUp;

#[async_trait]
impl Prober for AlwaysUp {
    async fn probe(&self, _target: &Target) -> Result<ProbeOutcome, ProbeError> {
        Ok(ProbeOutcome::up(1.5))
    }
}

struct AlwaysFailing;

#[async_trait]
impl Prober for AlwaysFailing {
    async fn probe(&self, _target: &Target) -> Result<ProbeOutcome, ProbeError> {
        Err(ProbeError::Network("metrics source unreachable".to_string()))
    }
}

struct Flapping {
    calls: AtomicUsize,
}

#[async_trait]
impl Prober for Flapping {
    async fn probe(&self, _target: &Target) -> Result<ProbeOutcome, ProbeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n % 2 == 0 {
            Ok(ProbeOutcome::up(2.0))
        } else {
            Ok(ProbeOutcome::down())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn test_config() -> MonitorConfig {
    MonitorConfig {
        window_ms: 60_000,
        bucket_ms: 1_000,
        hub_capacity: 8,
        default_uptime: 100.0,
    }
}

fn target(id: &str) -> Target {
    Target {
        id: id.to_string(),
        kind: TargetKind::Container,
        address: "http://127.0.0.1:1".to_string(),
        poll_interval_ms: 1_000,
        timeout_ms: 100,
    }
}

// Runs in real time: samples are stamped with wall-clock `Utc::now`, so a
// paused tokio clock would collapse every poll into one bucket.
#[tokio::test]
async fn healthy_target_reports_operational() {
    init_tracing();
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    monitor.register(target("web")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    let view = monitor.snapshot("web").unwrap();
    assert_eq!(view.uptime_percentage, 100.0);
    assert_eq!(view.status_label, pollwell::StatusLabel::Operational);

    let now = Utc::now().timestamp_millis();
    let to = now - now.rem_euclid(1_000);
    let samples = monitor.query("web", to - 60_000, to).unwrap();
    assert_eq!(samples.len(), 60, "one bucket per second of window");
    assert!(samples.iter().any(|s| s.status == SampleStatus::Up));
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    assert!(matches!(
        monitor.snapshot("ghost"),
        Err(MonitorError::NotFound(_))
    ));
    assert!(matches!(
        monitor.query("ghost", 0, 1_000),
        Err(MonitorError::NotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn snapshot_is_idempotent_between_appends() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    // Long interval: only the immediate first poll writes.
    let mut t = target("quiet");
    t.poll_interval_ms = 50_000;
    monitor.register(t).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let first = monitor.snapshot("quiet").unwrap();
    let second = monitor.snapshot("quiet").unwrap();
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn failing_prober_yields_unknown_series_and_default_uptime() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysFailing));

    monitor.register(target("dark")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    // The target exists and has a series, but every bucket is unknown.
    let now = Utc::now().timestamp_millis();
    let samples = monitor.query("dark", now - 10_000, now).unwrap();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| s.status == SampleStatus::Unknown));

    // No recorded points yet is reported as healthy by policy, not error.
    let view = monitor.snapshot("dark").unwrap();
    assert_eq!(view.uptime_percentage, 100.0);
    assert_eq!(view.formatted_duration, "0m");
}

#[tokio::test(start_paused = true)]
async fn register_list_unregister_roundtrip() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    monitor.register(target("a")).await.unwrap();
    monitor.register(target("b")).await.unwrap();
    monitor.register(target("a")).await.unwrap();

    let mut ids: Vec<String> = monitor.list().await.into_iter().map(|t| t.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    monitor.unregister("a").await.unwrap();
    assert!(matches!(
        monitor.unregister("a").await,
        Err(MonitorError::NotFound(_))
    ));
    assert_eq!(monitor.list().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_appends_without_polling() {
    let monitor = Monitor::with_config(test_config(), Arc::new(Flapping {
        calls: AtomicUsize::new(0),
    }));

    let mut sub = monitor.subscribe("flappy");
    monitor.register(target("flappy")).await.unwrap();

    let event = sub.recv().await.expect("first poll should notify");
    assert_eq!(event.target_id, "flappy");
    assert_eq!(event.sample.status, SampleStatus::Up);

    sub.cancel();
    sub.cancel();
    assert!(sub.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn unregister_ends_subscriptions() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    let mut sub = monitor.subscribe("web");
    monitor.register(target("web")).await.unwrap();
    assert!(sub.recv().await.is_some());

    monitor.unregister("web").await.unwrap();

    // Drain anything buffered; the stream must then terminate.
    while sub.recv().await.is_some() {}
}

// Runs in real time for the same wall-clock-stamping reason as
// `healthy_target_reports_operational`.
#[tokio::test]
async fn query_output_collapses_into_display_bars() {
    let monitor = Monitor::with_config(test_config(), Arc::new(AlwaysUp));

    monitor.register(target("bars")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    let now = Utc::now().timestamp_millis();
    let samples = monitor.query("bars", now - 60_000, now).unwrap();

    let bars = aggregate::normalize_to_fixed_bars(&samples, 30, now, 60_000);
    assert_eq!(bars.len(), 30);
    assert!(bars.iter().any(|b| b.status == SampleStatus::Up));
    assert!(bars.iter().any(|b| b.status == SampleStatus::Unknown));
}

#[tokio::test]
async fn recorded_points_only_uptime_math() {
    // Feed a known mix straight through the aggregation functions to pin
    // down the recorded-points-only math at the facade boundary.
    let samples: Vec<Sample> = vec![
        Sample::new(0, SampleStatus::Up),
        Sample::new(1_000, SampleStatus::Up),
        Sample::new(2_000, SampleStatus::Down),
        Sample::new(3_000, SampleStatus::Unknown),
        Sample::new(4_000, SampleStatus::Up),
    ];
    let pct = aggregate::uptime_percentage(&samples);
    assert_eq!(pct, 75.0);
    assert_eq!(aggregate::classify(pct), pollwell::StatusLabel::MajorOutage);
}
