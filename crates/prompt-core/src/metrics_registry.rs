//! Process-wide registry of metric thresholds, grounded in
//! `original_source/hemdov/domain/metrics/registry.py`. Expressed as a
//! lazily-initialized `OnceLock` rather than a mutable global, per
//! spec.md §9's singleton guidance: init at first access, read-only
//! thereafter.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A threshold triple: the score is 0.0 at `min_acceptable` and 1.0 at
/// `excellent`, linear in between (or inverted, for "lower is better"
/// metrics such as latency).
#[derive(Debug, Clone, Copy)]
pub struct MetricThreshold {
    pub min_acceptable: f64,
    pub target: f64,
    pub excellent: f64,
    pub higher_is_better: bool,
}

impl MetricThreshold {
    /// Piecewise-linear score in [0, 1]: 1.0 at or past `excellent`,
    /// 0.0 at or past `min_acceptable`'s "bad" end, linear between.
    pub fn score_for(&self, value: f64) -> f64 {
        if self.higher_is_better {
            if value >= self.excellent {
                1.0
            } else if value <= self.min_acceptable {
                0.0
            } else {
                (value - self.min_acceptable) / (self.excellent - self.min_acceptable)
            }
        } else if value <= self.excellent {
            1.0
        } else if value >= self.min_acceptable {
            0.0
        } else {
            (self.min_acceptable - value) / (self.min_acceptable - self.excellent)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDefinition {
    pub threshold: MetricThreshold,
}

/// Default thresholds for the three named performance sub-metrics.
/// Exact figures are a deliberate calibration decision recorded in
/// DESIGN.md (the original Python thresholds were not fully
/// recoverable from the retrieved source fragment).
pub struct MetricsRegistry {
    definitions: HashMap<&'static str, MetricDefinition>,
}

static REGISTRY: OnceLock<MetricsRegistry> = OnceLock::new();

impl MetricsRegistry {
    fn build() -> Self {
        let mut definitions = HashMap::new();
        definitions.insert(
            "performance.latency_ms",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 5000.0,
                    target: 2000.0,
                    excellent: 500.0,
                    higher_is_better: false,
                },
            },
        );
        definitions.insert(
            "performance.total_tokens",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 4000.0,
                    target: 1500.0,
                    excellent: 500.0,
                    higher_is_better: false,
                },
            },
        );
        definitions.insert(
            "performance.cost_usd",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 0.05,
                    target: 0.01,
                    excellent: 0.002,
                    higher_is_better: false,
                },
            },
        );
        definitions.insert(
            "quality.overall",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 0.60,
                    target: 0.80,
                    excellent: 0.90,
                    higher_is_better: true,
                },
            },
        );
        definitions.insert(
            "performance.overall",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 0.40,
                    target: 0.70,
                    excellent: 0.85,
                    higher_is_better: true,
                },
            },
        );
        definitions.insert(
            "impact.overall",
            MetricDefinition {
                threshold: MetricThreshold {
                    min_acceptable: 0.50,
                    target: 0.75,
                    excellent: 0.90,
                    higher_is_better: true,
                },
            },
        );
        Self { definitions }
    }

    pub fn get_instance() -> &'static MetricsRegistry {
        REGISTRY.get_or_init(Self::build)
    }

    pub fn threshold(&self, key: &str) -> Option<MetricThreshold> {
        self.definitions.get(key).map(|d| d.threshold)
    }
}

/// Computes `performance_score` as `0.5*latency + 0.3*cost + 0.2*token`
/// sub-scores from `MetricsRegistry`'s calibrated thresholds
/// (spec.md §3).
pub fn performance_score(latency_ms: u64, total_tokens: u64, cost_usd: f64) -> f64 {
    let registry = MetricsRegistry::get_instance();
    let latency_score = registry
        .threshold("performance.latency_ms")
        .map(|t| t.score_for(latency_ms as f64))
        .unwrap_or(0.0);
    let cost_score = registry
        .threshold("performance.cost_usd")
        .map(|t| t.score_for(cost_usd))
        .unwrap_or(0.0);
    let token_score = registry
        .threshold("performance.total_tokens")
        .map(|t| t.score_for(total_tokens as f64))
        .unwrap_or(0.0);
    0.5 * latency_score + 0.3 * cost_score + 0.2 * token_score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faster_latency_increases_performance_score() {
        let slow = performance_score(4000, 1000, 0.01);
        let fast = performance_score(400, 1000, 0.01);
        assert!(fast > slow);
    }

    #[test]
    fn lower_cost_increases_performance_score() {
        let expensive = performance_score(1000, 1000, 0.04);
        let cheap = performance_score(1000, 1000, 0.001);
        assert!(cheap > expensive);
    }

    #[test]
    fn fewer_tokens_increases_performance_score() {
        let many = performance_score(1000, 3800, 0.01);
        let few = performance_score(1000, 400, 0.01);
        assert!(few > many);
    }
}
