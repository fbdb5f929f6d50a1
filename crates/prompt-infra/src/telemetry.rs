//! `TelemetryPort` implementation backed by the `metrics` facade
//! (spec.md §4.16 supplement), exported via `metrics-exporter-prometheus`
//! from `prompt-cli`'s bootstrap. Counters/histograms only — never
//! affects request outcomes, per `prompt_core::telemetry`'s contract.

use prompt_core::TelemetryPort;

pub struct PrometheusTelemetry;

impl PrometheusTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrometheusTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryPort for PrometheusTelemetry {
    fn record_knn_hit(&self, used_embeddings: bool, query: &str) {
        metrics::counter!(
            "prompt_knn_queries_total",
            "used_embeddings" => used_embeddings.to_string()
        )
        .increment(1);
        tracing::debug!(query_length = query.len(), used_embeddings, "knn query recorded");
    }

    fn record_ifeval_result(&self, score: f64, passed: bool, prompt_id: &str) {
        metrics::histogram!("prompt_ifeval_score").record(score);
        metrics::counter!("prompt_ifeval_results_total", "passed" => passed.to_string())
            .increment(1);
        tracing::debug!(prompt_id, score, passed, "ifeval result recorded");
    }

    fn record_latency(&self, operation: &str, duration_ms: f64) {
        metrics::histogram!("prompt_operation_latency_ms", "operation" => operation.to_string())
            .record(duration_ms);
    }

    fn record_cache_hit(&self, hit: bool, key: &str) {
        metrics::counter!("prompt_cache_lookups_total", "hit" => hit.to_string()).increment(1);
        tracing::debug!(key, hit, "cache lookup recorded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_never_panics_without_an_installed_recorder() {
        let telemetry = PrometheusTelemetry::new();
        telemetry.record_knn_hit(false, "query");
        telemetry.record_ifeval_result(0.9, true, "id");
        telemetry.record_latency("improve", 12.5);
        telemetry.record_cache_hit(true, "key");
    }
}
