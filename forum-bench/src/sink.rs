//! Per-action metric samples.
//!
//! The action library records through an injected [`Sink`] rather than the
//! global `metrics` recorder directly, so it can be exercised in tests without
//! a live metrics backend.

use std::sync::Mutex;
use std::time::Duration;

/// Destination for the one duration sample and one success/error sample that
/// every API action emits.
pub trait Sink: Send + Sync {
    /// One timed call plus the aggregate outcome of its checks.
    fn sample(&self, action: &'static str, latency: Duration, ok: bool);

    /// A check failure with no timed request behind it, e.g. an expected field
    /// missing from an otherwise successful response.
    fn failure(&self, action: &'static str);
}

/// Forwards samples to the global `metrics` recorder.
///
/// Emits a `<action>_duration` histogram (nanoseconds) and
/// `<action>_success` / `<action>_error` counters; the error-rate and
/// latency-percentile thresholds are evaluated externally over these series.
pub struct MetricsSink;

impl Sink for MetricsSink {
    fn sample(&self, action: &'static str, latency: Duration, ok: bool) {
        metrics::histogram!(format!("{action}_duration")).record(latency.as_nanos() as f64);
        if ok {
            metrics::counter!(format!("{action}_success")).increment(1);
        } else {
            metrics::counter!(format!("{action}_error")).increment(1);
        }
    }

    fn failure(&self, action: &'static str) {
        metrics::counter!(format!("{action}_error")).increment(1);
    }
}

/// One recorded sample, as kept by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct Sample {
    pub action: &'static str,
    /// `None` for shape errors recorded via [`Sink::failure`].
    pub latency: Option<Duration>,
    pub ok: bool,
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    samples: Mutex<Vec<Sample>>,
}

impl MemorySink {
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().unwrap().clone()
    }

    pub fn count(&self, action: &str) -> usize {
        self.samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.action == action)
            .count()
    }

    pub fn successes(&self, action: &str) -> usize {
        self.samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.action == action && s.ok)
            .count()
    }

    pub fn failures(&self, action: &str) -> usize {
        self.samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.action == action && !s.ok)
            .count()
    }
}

impl Sink for MemorySink {
    fn sample(&self, action: &'static str, latency: Duration, ok: bool) {
        self.samples.lock().unwrap().push(Sample {
            action,
            latency: Some(latency),
            ok,
        });
    }

    fn failure(&self, action: &'static str) {
        self.samples.lock().unwrap().push(Sample {
            action,
            latency: None,
            ok: false,
        });
    }
}
