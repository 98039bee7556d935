// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Internal Prometheus registry for agent self-observability — distinct
//! from the EMF scope emitted to the cloud endpoint (spec §4.8 vs ambient
//! observability). Grounded on the teacher's metrics service: one registry,
//! one namespace, counters/gauges built through `with_opts` and mapped
//! failures into the agent's own error type.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};

use tapline_domain::error::{AgentError, AgentResult};

const NAMESPACE: &str = "tapline";

pub struct PrometheusMetrics {
    registry: Registry,
    pub records_received_total: IntCounter,
    pub records_sent_total: IntCounter,
    pub send_errors_total: IntCounter,
    pub active_sources: IntGauge,
    pub active_sinks: IntGauge,
    pub send_duration_seconds: Histogram,
}

impl PrometheusMetrics {
    pub fn new() -> AgentResult<Self> {
        let registry = Registry::new();

        let records_received_total = IntCounter::with_opts(
            Opts::new("records_received_total", "Total records pulled from sources").namespace(NAMESPACE),
        )
        .map_err(metrics_error("records_received_total"))?;

        let records_sent_total = IntCounter::with_opts(
            Opts::new("records_sent_total", "Total records successfully delivered to sinks").namespace(NAMESPACE),
        )
        .map_err(metrics_error("records_sent_total"))?;

        let send_errors_total = IntCounter::with_opts(
            Opts::new("send_errors_total", "Total sink send failures").namespace(NAMESPACE),
        )
        .map_err(metrics_error("send_errors_total"))?;

        let active_sources =
            IntGauge::with_opts(Opts::new("active_sources", "Number of running sources").namespace(NAMESPACE))
                .map_err(metrics_error("active_sources"))?;

        let active_sinks =
            IntGauge::with_opts(Opts::new("active_sinks", "Number of running sinks").namespace(NAMESPACE))
                .map_err(metrics_error("active_sinks"))?;

        let send_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("send_duration_seconds", "Sink send call latency")
                .namespace(NAMESPACE)
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
        )
        .map_err(metrics_error("send_duration_seconds"))?;

        registry
            .register(Box::new(records_received_total.clone()))
            .map_err(metrics_error("records_received_total registration"))?;
        registry
            .register(Box::new(records_sent_total.clone()))
            .map_err(metrics_error("records_sent_total registration"))?;
        registry
            .register(Box::new(send_errors_total.clone()))
            .map_err(metrics_error("send_errors_total registration"))?;
        registry
            .register(Box::new(active_sources.clone()))
            .map_err(metrics_error("active_sources registration"))?;
        registry
            .register(Box::new(active_sinks.clone()))
            .map_err(metrics_error("active_sinks registration"))?;
        registry
            .register(Box::new(send_duration_seconds.clone()))
            .map_err(metrics_error("send_duration_seconds registration"))?;

        Ok(Self {
            registry,
            records_received_total,
            records_sent_total,
            send_errors_total,
            active_sources,
            active_sinks,
            send_duration_seconds,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn metrics_error(metric: &'static str) -> impl Fn(prometheus::Error) -> AgentError {
    move |e| AgentError::Configuration(format!("failed to set up '{metric}' metric: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    #[test]
    fn metrics_are_registered_under_the_tapline_namespace() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.records_received_total.inc();
        metrics.active_sources.set(2);

        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&metrics.registry().gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("tapline_records_received_total 1"));
        assert!(text.contains("tapline_active_sources 2"));
    }
}
