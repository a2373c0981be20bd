use std::thread;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tremor_monitor::analysis::classifier::Symptom;
use tremor_monitor::error::MonitorError;
use tremor_monitor::sensor::{SyntheticMotion, SyntheticSensor};
use tremor_monitor::{AppConfig, Monitor, Notifier};

fn tremor_sensor() -> SyntheticSensor {
    SyntheticSensor::new(SyntheticMotion::oscillation(4.0, 0.4).with_noise(0.01), 104.0)
}

#[test]
fn test_monitor_reports_tremor_to_subscriber() {
    let mut config = AppConfig::default();
    config.pipeline.cycle_interval_ms = 5;
    let monitor = Monitor::new(config);
    let mut rx = monitor.subscribe();
    let mut reports = monitor.hub().subscribe_reports();

    monitor.start(tremor_sensor()).unwrap();

    let mut states = Vec::new();
    for _ in 0..9 {
        states.push(rx.blocking_recv().unwrap());
    }
    let stats = monitor.stop().unwrap();

    assert!(states[..8].iter().all(|s| s.symptom == Symptom::Stable));
    assert_eq!(states[8].symptom, Symptom::Tremor);
    assert!(stats.cycles_completed >= 9);

    let first = reports.try_recv().unwrap();
    assert_eq!(first.cycle, 0);
    assert!(first.vote.tremor);
}

#[test]
fn test_monitor_without_clients_keeps_running() {
    let mut config = AppConfig::default();
    config.window.window_size = 128;
    let monitor = Monitor::new(config);
    monitor.start(tremor_sensor()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while monitor.hub().undelivered_count() < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(monitor.is_running());
    assert!(monitor.hub().undelivered_count() >= 3);

    monitor.stop().unwrap();
    assert_eq!(monitor.stop(), Err(MonitorError::NotRunning));
}

#[test]
fn test_classification_stream_follows_monitor() {
    let mut config = AppConfig::default();
    config.pipeline.cycle_interval_ms = 5;
    let monitor = Monitor::new(config);
    let stream = monitor.hub().classification_stream();
    monitor.start(tremor_sensor()).unwrap();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let states: Vec<_> = runtime.block_on(stream.take(10).collect());
    monitor.stop().unwrap();

    assert_eq!(states.len(), 10);
    assert_eq!(states[9].symptom, Symptom::Tremor);
}

#[test]
fn test_hub_is_a_notifier() {
    fn assert_notifier<N: Notifier + Clone + 'static>(_: &N) {}
    let monitor = Monitor::default();
    assert_notifier(monitor.hub());
}
