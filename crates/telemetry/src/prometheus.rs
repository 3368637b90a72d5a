// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use prometheus::{
    exponential_buckets, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
};

/// Prometheus-backed sink. Every collector is registered on construction.
#[derive(Debug, Clone)]
pub struct PrometheusSink {
    votes_cast: IntCounterVec,
    ballots_finalized: IntCounterVec,
    nonces_allocated: IntCounterVec,
    nonces_confirmed: IntCounterVec,
    pending_nonces: IntGaugeVec,
    stuck_nonces: IntCounterVec,
    keygen_outcomes: IntCounterVec,
    blame_recorded: IntCounterVec,
    errors: IntCounterVec,
    transition_duration: HistogramVec,
    transitions_rejected: IntCounterVec,
}

fn counter(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<IntCounterVec, prometheus::Error> {
    let c = IntCounterVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl PrometheusSink {
    /// Creates the collectors and registers them on `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let pending_nonces = IntGaugeVec::new(
            Opts::new("xco_pending_nonces", "Outstanding nonces per chain."),
            &["chain_id"],
        )?;
        registry.register(Box::new(pending_nonces.clone()))?;
        let transition_duration = HistogramVec::new(
            HistogramOpts::new(
                "xco_transition_duration_seconds",
                "Latency of dispatched service calls.",
            )
            .buckets(exponential_buckets(0.0001, 2.0, 16)?),
            &["service_id", "method"],
        )?;
        registry.register(Box::new(transition_duration.clone()))?;

        Ok(Self {
            votes_cast: counter(
                registry,
                "xco_votes_cast_total",
                "Votes recorded on ballots.",
                &["observation_type"],
            )?,
            ballots_finalized: counter(
                registry,
                "xco_ballots_finalized_total",
                "Ballots finalized, by outcome.",
                &["observation_type", "outcome"],
            )?,
            nonces_allocated: counter(
                registry,
                "xco_nonces_allocated_total",
                "Outbound nonces assigned.",
                &["chain_id"],
            )?,
            nonces_confirmed: counter(
                registry,
                "xco_nonces_confirmed_total",
                "Outbound nonces confirmed.",
                &["chain_id"],
            )?,
            pending_nonces,
            stuck_nonces: counter(
                registry,
                "xco_stuck_nonces_total",
                "Stuck pending ranges detected.",
                &["chain_id"],
            )?,
            keygen_outcomes: counter(
                registry,
                "xco_keygen_outcomes_total",
                "Finished keygen ceremonies.",
                &["outcome"],
            )?,
            blame_recorded: counter(
                registry,
                "xco_blame_recorded_total",
                "Blame records appended.",
                &["kind"],
            )?,
            errors: counter(
                registry,
                "xco_errors_total",
                "Errors, categorized by kind and code.",
                &["kind", "code"],
            )?,
            transition_duration,
            transitions_rejected: counter(
                registry,
                "xco_transitions_rejected_total",
                "Dispatched calls rejected, by error code.",
                &["service_id", "method", "code"],
            )?,
        })
    }
}

impl ObserverMetricsSink for PrometheusSink {
    fn inc_votes_cast(&self, observation_type: &str) {
        self.votes_cast.with_label_values(&[observation_type]).inc();
    }
    fn inc_ballots_finalized(&self, observation_type: &str, outcome: &str) {
        self.ballots_finalized
            .with_label_values(&[observation_type, outcome])
            .inc();
    }
    fn inc_nonces_allocated(&self, chain_id: &str) {
        self.nonces_allocated.with_label_values(&[chain_id]).inc();
    }
    fn inc_nonces_confirmed(&self, chain_id: &str) {
        self.nonces_confirmed.with_label_values(&[chain_id]).inc();
    }
    fn set_pending_nonces(&self, chain_id: &str, count: u64) {
        self.pending_nonces
            .with_label_values(&[chain_id])
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }
    fn inc_stuck_nonces(&self, chain_id: &str) {
        self.stuck_nonces.with_label_values(&[chain_id]).inc();
    }
    fn inc_keygen_outcome(&self, outcome: &str) {
        self.keygen_outcomes.with_label_values(&[outcome]).inc();
    }
    fn inc_blame_recorded(&self, kind: &str) {
        self.blame_recorded.with_label_values(&[kind]).inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, code: &'static str) {
        self.errors.with_label_values(&[kind, code]).inc();
    }
}

impl TransitionMetricsSink for PrometheusSink {
    fn observe_transition_duration(&self, service_id: &str, method: &str, duration_secs: f64) {
        self.transition_duration
            .with_label_values(&[service_id, method])
            .observe(duration_secs);
    }
    fn inc_transition_rejected(&self, service_id: &str, method: &str, code: &'static str) {
        self.transitions_rejected
            .with_label_values(&[service_id, method, code])
            .inc();
    }
}

/// Registers a sink on the default registry and installs it as the global sink.
pub fn install() -> Result<&'static dyn MetricsSink, anyhow::Error> {
    let sink: &'static PrometheusSink =
        Box::leak(Box::new(PrometheusSink::new(prometheus::default_registry())?));
    SINK.set(sink)
        .map_err(|_| anyhow::anyhow!("metrics sink already installed"))?;
    Ok(sink)
}
