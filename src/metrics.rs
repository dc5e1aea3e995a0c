//! Metrics for tracking deprecated member usage.
//!
//! Prometheus counters for monitoring how often deprecated members are
//! still being invoked, and how many members carry a deprecation mark.

use prometheus::{IntCounterVec, Opts, Registry};

/// Metrics collector for deprecated member usage.
#[derive(Clone)]
pub struct DeprecationMetrics {
    /// Registry for all metrics
    registry: Registry,

    /// Counter for reported invocations of deprecated members
    pub reports_total: IntCounterVec,

    /// Counter for members marked deprecated
    pub marks_total: IntCounterVec,
}

impl DeprecationMetrics {
    /// Create a new metrics collector with the given prefix.
    pub fn new(prefix: &str) -> Self {
        let registry = Registry::new();

        let reports_total = IntCounterVec::new(
            Opts::new(
                format!("{}_reports_total", prefix),
                "Total number of reported invocations of deprecated members",
            ),
            &["subject", "behavior"],
        )
        .expect("Failed to create reports_total metric");

        let marks_total = IntCounterVec::new(
            Opts::new(
                format!("{}_marks_total", prefix),
                "Total number of members marked deprecated",
            ),
            &["namespace", "kind"],
        )
        .expect("Failed to create marks_total metric");

        // Register all metrics
        registry
            .register(Box::new(reports_total.clone()))
            .expect("Failed to register reports_total");
        registry
            .register(Box::new(marks_total.clone()))
            .expect("Failed to register marks_total");

        Self {
            registry,
            reports_total,
            marks_total,
        }
    }

    /// Record one reported invocation of a deprecated member.
    pub fn record_report(&self, subject: &str, behavior: &str) {
        self.reports_total
            .with_label_values(&[subject, behavior])
            .inc();
    }

    /// Record a member being marked deprecated.
    pub fn record_mark(&self, namespace: &str, kind: &str) {
        self.marks_total.with_label_values(&[namespace, kind]).inc();
    }

    /// Get the Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}

impl Default for DeprecationMetrics {
    fn default() -> Self {
        Self::new("deprecations")
    }
}
