use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::time::Duration;

pub(crate) struct ScanMetrics {
    duration: Histogram<f64>,
    scans: Counter<u64>,
    failures: Counter<u64>,
}

impl ScanMetrics {
    pub(crate) fn new(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 20.0, 30.0,
        ];

        Self {
            duration: meter
                .f64_histogram("scan_duration_seconds")
                .with_description("Time from upload to result (normalize + classify + interpret)")
                .with_unit("s")
                .with_boundaries(latency_buckets.to_vec())
                .build(),
            scans: meter
                .u64_counter("scans_total")
                .with_description("Total scans completed, by outcome")
                .build(),
            failures: meter
                .u64_counter("scan_failures_total")
                .with_description("Total scans that ended in an error")
                .build(),
        }
    }

    pub(crate) fn record(&self, elapsed: Duration, outcome: &'static str, failed: bool) {
        self.duration.record(elapsed.as_secs_f64(), &[]);
        self.scans.add(1, &[KeyValue::new("outcome", outcome)]);
        if failed {
            self.failures.add(1, &[]);
        }
    }
}
