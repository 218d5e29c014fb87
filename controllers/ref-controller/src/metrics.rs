//! Prometheus metrics for reconciliation passes.

use crate::error::ErrorClass;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Reconciliation counters and timings
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounter,
    failures: IntCounterVec,
    duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = IntCounter::new(
            "ref_controller_reconciliations_total",
            "Reconciliation passes started",
        )?;
        let failures = IntCounterVec::new(
            Opts::new(
                "ref_controller_reconcile_errors_total",
                "Failed reconciliation passes by error class",
            ),
            &["class"],
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "ref_controller_reconcile_duration_seconds",
            "Duration of reconciliation passes",
        ))?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            failures,
            duration,
        })
    }

    /// Record one finished pass
    pub fn observe(&self, elapsed: Duration, outcome: Result<(), ErrorClass>) {
        self.reconciliations.inc();
        self.duration.observe(elapsed.as_secs_f64());
        if let Err(class) = outcome {
            self.failures.with_label_values(&[class.as_str()]).inc();
        }
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_failures_by_class() {
        let metrics = Metrics::new().unwrap();
        metrics.observe(Duration::from_millis(5), Ok(()));
        metrics.observe(Duration::from_millis(5), Err(ErrorClass::Conflict));
        metrics.observe(Duration::from_millis(5), Err(ErrorClass::Conflict));

        let text = metrics.render().unwrap();
        assert!(text.contains("ref_controller_reconciliations_total 3"));
        assert!(text.contains("ref_controller_reconcile_errors_total{class=\"conflict\"} 2"));
        assert!(text.contains("ref_controller_reconcile_duration_seconds_count 3"));
    }
}
