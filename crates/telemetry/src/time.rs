// Path: crates/telemetry/src/time.rs
use crate::sinks::TransitionMetricsSink;
use std::time::Instant;

/// Reports the elapsed time of one dispatched call when dropped.
pub struct Timer<'a> {
    sink: &'a dyn TransitionMetricsSink,
    service_id: &'a str,
    method: &'a str,
    start: Instant,
}

impl<'a> Timer<'a> {
    /// Starts timing a call to `service_id.method`.
    pub fn new(sink: &'a dyn TransitionMetricsSink, service_id: &'a str, method: &'a str) -> Self {
        Self {
            sink,
            service_id,
            method,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink.observe_transition_duration(
            self.service_id,
            self.method,
            self.start.elapsed().as_secs_f64(),
        );
    }
}
