//! Prometheus metrics for the HTTP surface.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub requests: IntCounter,
    pub jobs_submitted: IntCounter,
    pub fallbacks: IntCounter,
    pub compliance_blocks: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let requests =
            IntCounter::new("reelforge_requests_total", "HTTP requests handled").expect("metric");
        let jobs_submitted =
            IntCounter::new("reelforge_jobs_submitted_total", "Generation jobs submitted")
                .expect("metric");
        let fallbacks = IntCounter::new(
            "reelforge_fallbacks_total",
            "Generations served by the template fallback",
        )
        .expect("metric");
        let compliance_blocks = IntCounter::new(
            "reelforge_compliance_blocks_total",
            "Requests blocked by the compliance gate",
        )
        .expect("metric");
        for metric in [&requests, &jobs_submitted, &fallbacks, &compliance_blocks] {
            registry
                .register(Box::new(metric.clone()))
                .expect("metric registration");
        }
        Self { registry, requests, jobs_submitted, fallbacks, compliance_blocks }
    }

    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buffer).to_string()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_up_in_encoding() {
        let metrics = Metrics::new();
        metrics.requests.inc();
        metrics.fallbacks.inc();
        let text = metrics.encode();
        assert!(text.contains("reelforge_requests_total 1"));
        assert!(text.contains("reelforge_fallbacks_total 1"));
    }
}
