//! Transition metrics.
//!
//! The engine reports to a [`MetricsSink`]. [`NoopMetrics`] is the default so
//! a machine works with nothing configured; [`PrometheusMetrics`] exports the
//! counters and histogram to a `prometheus::Registry`.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;

/// Receiver of per-transition measurements.
pub trait MetricsSink: Send + Sync {
    /// A transition completed successfully.
    fn record_transition(&self, from: &str, to: &str, event: &str, duration: Duration);

    /// A completed transition carries an auto-chained event.
    fn record_auto_transition(&self, from: &str, to: &str, event: &str);

    /// A transition failed.
    ///
    /// `category` is [`TransitionError::category`](crate::engine::TransitionError::category).
    fn record_error(&self, from: &str, event: &str, category: &str);
}

/// Discards every measurement.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_transition(&self, _from: &str, _to: &str, _event: &str, _duration: Duration) {}

    fn record_auto_transition(&self, _from: &str, _to: &str, _event: &str) {}

    fn record_error(&self, _from: &str, _event: &str, _category: &str) {}
}

/// Prometheus-backed metrics.
#[derive(Clone)]
pub struct PrometheusMetrics {
    transitions_total: IntCounterVec,
    transition_errors: IntCounterVec,
    transition_duration: HistogramVec,
    auto_transitions_total: IntCounterVec,
}

impl PrometheusMetrics {
    /// Create the collectors and register them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let transitions_total = IntCounterVec::new(
            Opts::new("machina_transitions_total", "Total number of state transitions"),
            &["from_state", "to_state", "event"],
        )?;
        let transition_errors = IntCounterVec::new(
            Opts::new("machina_transition_errors_total", "Total number of transition errors"),
            &["from_state", "event", "error_type"],
        )?;
        let transition_duration = HistogramVec::new(
            HistogramOpts::new(
                "machina_transition_duration_seconds",
                "Duration of state transitions in seconds",
            ),
            &["from_state", "to_state", "event"],
        )?;
        let auto_transitions_total = IntCounterVec::new(
            Opts::new("machina_auto_transitions_total", "Total number of automatic transitions"),
            &["from_state", "to_state", "event"],
        )?;

        registry.register(Box::new(transitions_total.clone()))?;
        registry.register(Box::new(transition_errors.clone()))?;
        registry.register(Box::new(transition_duration.clone()))?;
        registry.register(Box::new(auto_transitions_total.clone()))?;

        Ok(Self {
            transitions_total,
            transition_errors,
            transition_duration,
            auto_transitions_total,
        })
    }
}

impl MetricsSink for PrometheusMetrics {
    fn record_transition(&self, from: &str, to: &str, event: &str, duration: Duration) {
        self.transitions_total
            .with_label_values(&[from, to, event])
            .inc();
        self.transition_duration
            .with_label_values(&[from, to, event])
            .observe(duration.as_secs_f64());
    }

    fn record_auto_transition(&self, from: &str, to: &str, event: &str) {
        self.auto_transitions_total
            .with_label_values(&[from, to, event])
            .inc();
    }

    fn record_error(&self, from: &str, event: &str, category: &str) {
        self.transition_errors
            .with_label_values(&[from, event, category])
            .inc();
    }
}
