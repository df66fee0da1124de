//! Metric declarations for the client.
//!
//! Recording goes through the `metrics` facade and is a no-op until the
//! application installs a recorder.

use metrics::{describe_counter, describe_histogram, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A histogram for recording distributions.
    Histogram,
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name.
    pub name: &'static str,
    /// Counter or histogram.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a counter metric.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a histogram metric.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers the description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metrics recorded by the client.
pub mod metric_defs {
    use super::Metric;
    use metrics::Unit;

    /// Label key holding the endpoint path.
    pub const LABEL_ENDPOINT: &str = "endpoint";
    /// Label key holding `ok`, `transport`, `service` or `decode`.
    pub const LABEL_OUTCOME: &str = "outcome";

    /// Requests completed, by endpoint and outcome.
    pub const REQUESTS: Metric = Metric::counter("floodsync.client.requests")
        .with_description("Backend requests completed, by outcome")
        .with_unit(Unit::Count)
        .with_labels(&[LABEL_ENDPOINT, LABEL_OUTCOME]);

    /// Wall time of each request.
    pub const REQUEST_DURATION: Metric = Metric::histogram("floodsync.client.request_duration")
        .with_description("Time from sending a request to decoding its response")
        .with_unit(Unit::Seconds)
        .with_labels(&[LABEL_ENDPOINT]);

    /// Every metric, for registration.
    pub const ALL: &[Metric] = &[REQUESTS, REQUEST_DURATION];
}

/// Registers descriptions for every client metric.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Records one finished request.
pub(crate) fn record_request(endpoint: &'static str, outcome: &'static str, seconds: f64) {
    use metric_defs::{LABEL_ENDPOINT, LABEL_OUTCOME, REQUESTS, REQUEST_DURATION};

    metrics::counter!(
        REQUESTS.name,
        LABEL_ENDPOINT => endpoint,
        LABEL_OUTCOME => outcome
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION.name, LABEL_ENDPOINT => endpoint).record(seconds);
}
