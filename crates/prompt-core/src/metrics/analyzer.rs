//! Metrics Analyzer (spec.md §4.12). Summarizes a set of
//! `PromptMetrics`, reports chronological trends, and compares two
//! cohorts (e.g. baseline vs. a new release).

use std::collections::HashMap;

use crate::domain::PromptMetrics;
use crate::metrics_registry::performance_score;

/// A deviation of at least this much between the two chronological
/// halves is reported as a trend rather than noise.
const TREND_EPSILON: f64 = 0.02;

fn performance_score_of(metrics: &PromptMetrics) -> f64 {
    performance_score(
        metrics.performance.latency_ms,
        metrics.performance.total_tokens,
        metrics.performance.cost_usd,
    )
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct DimensionSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

fn summarize_dimension(values: &[f64]) -> DimensionSummary {
    DimensionSummary {
        mean: mean(values),
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub count: usize,
    pub quality: DimensionSummary,
    pub performance: DimensionSummary,
    pub impact: DimensionSummary,
    pub grade_distribution: HashMap<String, usize>,
}

/// `summarize(metrics) -> {count, quality{mean,...}, performance,
/// impact, grade_distribution}` (spec.md §4.12).
pub fn summarize(metrics: &[PromptMetrics]) -> Summary {
    if metrics.is_empty() {
        return Summary {
            count: 0,
            quality: DimensionSummary { mean: 0.0, min: 0.0, max: 0.0 },
            performance: DimensionSummary { mean: 0.0, min: 0.0, max: 0.0 },
            impact: DimensionSummary { mean: 0.0, min: 0.0, max: 0.0 },
            grade_distribution: HashMap::new(),
        };
    }

    let quality_values: Vec<f64> = metrics.iter().map(|m| m.quality.composite_score()).collect();
    let performance_values: Vec<f64> = metrics.iter().map(performance_score_of).collect();
    let impact_values: Vec<f64> = metrics.iter().map(|m| m.impact.impact_score()).collect();

    let mut grade_distribution = HashMap::new();
    for (metric, performance) in metrics.iter().zip(performance_values.iter()) {
        let grade = metric.grade(*performance);
        *grade_distribution.entry(grade.to_string()).or_insert(0) += 1;
    }

    Summary {
        count: metrics.len(),
        quality: summarize_dimension(&quality_values),
        performance: summarize_dimension(&performance_values),
        impact: summarize_dimension(&impact_values),
        grade_distribution,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        };
        write!(f, "{s}")
    }
}

fn trend_from_delta(delta: f64) -> Trend {
    if delta > TREND_EPSILON {
        Trend::Improving
    } else if delta < -TREND_EPSILON {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone)]
pub struct TrendReport {
    pub quality: Trend,
    pub performance: Trend,
    pub impact: Trend,
    pub recommendations: Vec<String>,
}

/// Splits `metrics` (assumed already sorted by `measured_at`) into two
/// chronological halves and reports a per-dimension trend (spec.md
/// §4.12).
pub fn analyze_trends(metrics: &[PromptMetrics]) -> TrendReport {
    let mut sorted: Vec<&PromptMetrics> = metrics.iter().collect();
    sorted.sort_by_key(|m| m.measured_at);

    let midpoint = sorted.len() / 2;
    let (first_half, second_half) = sorted.split_at(midpoint);

    let quality_delta = mean(&second_half.iter().map(|m| m.quality.composite_score()).collect::<Vec<_>>())
        - mean(&first_half.iter().map(|m| m.quality.composite_score()).collect::<Vec<_>>());
    let performance_delta = mean(&second_half.iter().map(|m| performance_score_of(m)).collect::<Vec<_>>())
        - mean(&first_half.iter().map(|m| performance_score_of(m)).collect::<Vec<_>>());
    let impact_delta = mean(&second_half.iter().map(|m| m.impact.impact_score()).collect::<Vec<_>>())
        - mean(&first_half.iter().map(|m| m.impact.impact_score()).collect::<Vec<_>>());

    let quality = trend_from_delta(quality_delta);
    let performance = trend_from_delta(performance_delta);
    let impact = trend_from_delta(impact_delta);

    let mut recommendations = Vec::new();
    if quality == Trend::Declining {
        recommendations.push("quality is declining; review recent template or exemplar changes".to_string());
    }
    if performance == Trend::Declining {
        recommendations.push("performance is declining; check latency, token usage, and provider costs".to_string());
    }
    if impact == Trend::Declining {
        recommendations.push("impact is declining; investigate copy/regeneration ratios".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("no concerning trends detected".to_string());
    }

    TrendReport { quality, performance, impact, recommendations }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub quality_delta: f64,
    pub performance_delta: f64,
    pub impact_delta: f64,
    pub baseline_grade_distribution: HashMap<String, usize>,
    pub treatment_grade_distribution: HashMap<String, usize>,
    pub winner: String,
    pub explanation: String,
}

/// `compare_versions(baseline, treatment) -> {...}` (spec.md §4.12).
pub fn compare_versions(baseline: &[PromptMetrics], treatment: &[PromptMetrics]) -> Comparison {
    let baseline_summary = summarize(baseline);
    let treatment_summary = summarize(treatment);

    let quality_delta = treatment_summary.quality.mean - baseline_summary.quality.mean;
    let performance_delta = treatment_summary.performance.mean - baseline_summary.performance.mean;
    let impact_delta = treatment_summary.impact.mean - baseline_summary.impact.mean;

    let composite_delta = 0.5 * quality_delta + 0.25 * performance_delta + 0.25 * impact_delta;
    let (winner, explanation) = if composite_delta > TREND_EPSILON {
        (
            "treatment".to_string(),
            format!("treatment improves the weighted composite score by {composite_delta:.3}"),
        )
    } else if composite_delta < -TREND_EPSILON {
        (
            "baseline".to_string(),
            format!("treatment regresses the weighted composite score by {:.3}", composite_delta.abs()),
        )
    } else {
        (
            "tie".to_string(),
            "the two cohorts are statistically indistinguishable on the composite score".to_string(),
        )
    };

    Comparison {
        quality_delta,
        performance_delta,
        impact_delta,
        baseline_grade_distribution: baseline_summary.grade_distribution,
        treatment_grade_distribution: treatment_summary.grade_distribution,
        winner,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImpactMetrics, PerformanceMetrics, QualityMetrics};
    use prompt_types::{current_timestamp, new_id, FrameworkType};

    fn sample(quality_score: f64) -> PromptMetrics {
        PromptMetrics {
            prompt_id: new_id(),
            original_idea: "idea".to_string(),
            improved_prompt: "improved".to_string(),
            quality: QualityMetrics {
                coherence_score: quality_score,
                relevance_score: quality_score,
                completeness_score: quality_score,
                clarity_score: quality_score,
                guardrails_count: 3,
                has_required_structure: true,
            },
            performance: PerformanceMetrics {
                latency_ms: 500,
                total_tokens: 300,
                cost_usd: 0.001,
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                backend: "dspy".to_string(),
            },
            impact: ImpactMetrics::default(),
            measured_at: current_timestamp(),
            framework: FrameworkType::ChainOfThought,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            backend: "dspy".to_string(),
        }
    }

    #[test]
    fn summarize_empty_metrics_returns_zeroed_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn summarize_counts_grade_distribution() {
        let metrics = vec![sample(0.9), sample(0.9)];
        let summary = summarize(&metrics);
        assert_eq!(summary.count, 2);
        let total: usize = summary.grade_distribution.values().sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn compare_versions_prefers_higher_quality_treatment() {
        let baseline = vec![sample(0.5), sample(0.5)];
        let treatment = vec![sample(0.9), sample(0.9)];
        let comparison = compare_versions(&baseline, &treatment);
        assert_eq!(comparison.winner, "treatment");
        assert!(comparison.quality_delta > 0.0);
    }
}
