// Path: crates/telemetry/src/sinks.rs
//! Abstract metric sinks, decoupling core logic from the metrics backend.

use once_cell::sync::OnceCell;

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// The globally installed sink. Unset means metrics go to [`NopSink`].
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns the configured observer metrics sink, or a no-op sink.
pub fn observer_metrics() -> &'static dyn ObserverMetricsSink {
    match SINK.get() {
        Some(sink) => *sink,
        None => &NOP_SINK,
    }
}

/// Returns the configured error metrics sink, or a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    match SINK.get() {
        Some(sink) => *sink,
        None => &NOP_SINK,
    }
}

/// Returns the configured transition metrics sink, or a no-op sink.
pub fn transition_metrics() -> &'static dyn TransitionMetricsSink {
    match SINK.get() {
        Some(sink) => *sink,
        None => &NOP_SINK,
    }
}

/// Metrics about ballots, nonces, keygen and blame.
pub trait ObserverMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the votes counter, labeled by observation type.
    fn inc_votes_cast(&self, observation_type: &str);
    /// Increments the finalized ballots counter, labeled by type and outcome.
    fn inc_ballots_finalized(&self, observation_type: &str, outcome: &str);
    /// Increments the allocated nonces counter for a chain.
    fn inc_nonces_allocated(&self, chain_id: &str);
    /// Increments the confirmed nonces counter for a chain.
    fn inc_nonces_confirmed(&self, chain_id: &str);
    /// Sets the pending range size gauge for a chain.
    fn set_pending_nonces(&self, chain_id: &str, count: u64);
    /// Increments the stuck nonce counter for a chain.
    fn inc_stuck_nonces(&self, chain_id: &str);
    /// Increments the keygen outcome counter.
    fn inc_keygen_outcome(&self, outcome: &str);
    /// Increments the blame counter, labeled by blame kind.
    fn inc_blame_recorded(&self, kind: &str);
}
impl ObserverMetricsSink for NopSink {
    fn inc_votes_cast(&self, _observation_type: &str) {}
    fn inc_ballots_finalized(&self, _observation_type: &str, _outcome: &str) {}
    fn inc_nonces_allocated(&self, _chain_id: &str) {}
    fn inc_nonces_confirmed(&self, _chain_id: &str) {}
    fn set_pending_nonces(&self, _chain_id: &str, _count: u64) {}
    fn inc_stuck_nonces(&self, _chain_id: &str) {}
    fn inc_keygen_outcome(&self, _outcome: &str) {}
    fn inc_blame_recorded(&self, _kind: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and code.
    fn inc_error(&self, kind: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _code: &'static str) {}
}

/// Metrics about applying inputs through the commit boundary.
pub trait TransitionMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes how long one dispatched call took.
    fn observe_transition_duration(&self, service_id: &str, method: &str, duration_secs: f64);
    /// Increments the rejected transitions counter.
    fn inc_transition_rejected(&self, service_id: &str, method: &str, code: &'static str);
}
impl TransitionMetricsSink for NopSink {
    fn observe_transition_duration(&self, _service_id: &str, _method: &str, _duration_secs: f64) {}
    fn inc_transition_rejected(&self, _service_id: &str, _method: &str, _code: &'static str) {}
}

/// A unified sink implementing every domain trait.
pub trait MetricsSink: ObserverMetricsSink + ErrorMetricsSink + TransitionMetricsSink {}

impl<T> MetricsSink for T where T: ObserverMetricsSink + ErrorMetricsSink + TransitionMetricsSink {}
