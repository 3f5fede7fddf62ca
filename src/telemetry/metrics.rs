//! Metric instrument factories for fanout-bench.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

pub const METER_NAME: &str = "fanout-bench";

fn meter() -> Meter {
    opentelemetry::global::meter(METER_NAME)
}

/// Counter: work items pushed onto the queue.
pub fn items_enqueued() -> Counter<u64> {
    meter()
        .u64_counter("fanout.items.enqueued")
        .with_description("Work items enqueued by the dispatcher")
        .build()
}

/// Counter: writes acknowledged by the store.
/// Labels: `worker`.
pub fn writes_acknowledged() -> Counter<u64> {
    meter()
        .u64_counter("fanout.writes.acknowledged")
        .with_description("Timeline writes acknowledged by the store")
        .build()
}

/// Counter: writes the store rejected or that errored.
/// Labels: `worker`.
pub fn writes_failed() -> Counter<u64> {
    meter()
        .u64_counter("fanout.writes.failed")
        .with_description("Timeline writes that returned an error")
        .build()
}

/// Histogram: single write latency in milliseconds.
/// Labels: `worker`.
pub fn write_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("fanout.write.duration_ms")
        .with_description("Timeline write latency")
        .with_unit("ms")
        .build()
}

/// Histogram: wall-clock duration of a whole run in seconds.
/// Labels: `completion`.
pub fn run_duration_s() -> Histogram<f64> {
    meter()
        .f64_histogram("fanout.run.duration_s")
        .with_description("Time from first enqueue to observed completion")
        .with_unit("s")
        .build()
}
