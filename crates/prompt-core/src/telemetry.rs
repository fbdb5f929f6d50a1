//! Telemetry Port (spec.md §4.16, supplement). Grounded in
//! `original_source/hemdov/domain/ports/metrics_port.py`. Pure
//! observability — operational counters/histograms distinct from the
//! user-facing `PromptMetrics` persisted by the Metrics Repository.
//! Never affects request outcomes.

pub trait TelemetryPort: Send + Sync {
    /// Records a KNN query; `used_embeddings` is false for the bigram
    /// vectorizer and true once an embedding-backed vectorizer is
    /// wired in (spec.md §4.2's scope note).
    fn record_knn_hit(&self, used_embeddings: bool, query: &str);

    fn record_ifeval_result(&self, score: f64, passed: bool, prompt_id: &str);

    fn record_latency(&self, operation: &str, duration_ms: f64);

    fn record_cache_hit(&self, hit: bool, key: &str);
}

/// A `TelemetryPort` that discards every observation, used where no
/// telemetry backend is configured (e.g. unit tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl TelemetryPort for NullTelemetry {
    fn record_knn_hit(&self, _used_embeddings: bool, _query: &str) {}
    fn record_ifeval_result(&self, _score: f64, _passed: bool, _prompt_id: &str) {}
    fn record_latency(&self, _operation: &str, _duration_ms: f64) {}
    fn record_cache_hit(&self, _hit: bool, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_telemetry_never_panics() {
        let telemetry = NullTelemetry;
        telemetry.record_knn_hit(false, "q");
        telemetry.record_ifeval_result(0.9, true, "id");
        telemetry.record_latency("op", 1.0);
        telemetry.record_cache_hit(true, "k");
    }
}
