//! Integration tests for telemetry initialization and span helpers.

use fanout_bench::model::{RunParams, TimelineWrite, WorkItem};
use fanout_bench::telemetry::work::{record_write_outcome, start_run_span, start_write_span};
use fanout_bench::telemetry::{TelemetryConfig, init_telemetry, metrics};
use uuid::Uuid;

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process, so a second
    // initialization in the same test binary returns Err; that is fine.
    let config = TelemetryConfig {
        endpoint: None,
        service_name: "fanout-test".to_string(),
        log_level: "debug".to_string(),
    };
    if let Ok(guard) = init_telemetry(config) {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn run_span_is_created() {
    let params = RunParams {
        worker_count: 4,
        message_count: 10,
        follower_count: 1000,
    };
    let span = start_run_span(&Uuid::new_v4(), &params);
    let _enter = span.enter();
}

#[test]
fn write_span_records_outcome() {
    let item = WorkItem::new(Uuid::new_v4(), Uuid::new_v4(), "Test Message 0");
    let write = TimelineWrite::bind(&item);
    let span = start_write_span(3, &write);
    record_write_outcome(&span, true);
    record_write_outcome(&span, false);
}

#[test]
fn metric_instruments_work_without_a_provider() {
    metrics::items_enqueued().add(10, &[]);
    metrics::writes_acknowledged().add(1, &[]);
    metrics::writes_failed().add(1, &[]);
    metrics::write_duration_ms().record(1.5, &[]);
    metrics::run_duration_s().record(0.25, &[]);
}
