//! Metrics Evaluator (spec.md §4.10). Computes the quality/performance/
//! impact triad for one improved prompt from deterministic structural
//! heuristics — no LLM call, no I/O.

use prompt_types::{current_timestamp, new_id, FrameworkType};
use tracing::warn;

use crate::domain::{
    ImpactMetrics, PerformanceMetrics, Prediction, PromptMetrics, QualityMetrics,
};

/// Clips `guardrails_count` to this ceiling regardless of how many the
/// strategy produced (spec.md §4.10).
pub const MAX_GUARDRAILS: u32 = 10;

const DEFAULT_RATE_PER_TOKEN: f64 = 0.000002;

/// Raw measurements gathered around the call that produced `result`;
/// `total_tokens`/`cost_usd` are estimated when absent.
pub struct RawPerformance {
    pub latency_ms: u64,
    pub total_tokens: Option<u64>,
    pub cost_usd: Option<f64>,
    pub provider: String,
    pub model: String,
    pub backend: String,
}

fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as f64 / 4.0).ceil() as u64
}

fn rate_per_token(provider: &str, model: &str) -> f64 {
    match (provider.to_lowercase().as_str(), model.to_lowercase().as_str()) {
        ("openai", "gpt-4o") => 0.000005,
        ("openai", "gpt-4o-mini") => 0.00000015,
        ("anthropic", m) if m.contains("opus") => 0.000015,
        ("anthropic", m) if m.contains("sonnet") => 0.000003,
        ("anthropic", m) if m.contains("haiku") => 0.00000025,
        _ => DEFAULT_RATE_PER_TOKEN,
    }
}

fn keyword_density(original_idea: &str, improved_prompt: &str) -> f64 {
    let idea_lower = improved_prompt.to_lowercase();
    let keywords: Vec<&str> = original_idea
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .collect();
    if keywords.is_empty() {
        return 1.0;
    }
    let matched = keywords
        .iter()
        .filter(|kw| idea_lower.contains(&kw.to_lowercase()))
        .count();
    matched as f64 / keywords.len() as f64
}

fn section_count(text: &str) -> usize {
    text.lines().filter(|line| line.trim_start().starts_with('#')).count()
}

fn coherence_score(result: &Prediction) -> f64 {
    let role_present = !result.role.trim().is_empty();
    let directive_present = !result.directive.trim().is_empty();
    match (role_present, directive_present) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.6,
        (false, false) => 0.2,
    }
}

fn relevance_score(original_idea: &str, result: &Prediction) -> f64 {
    keyword_density(original_idea, &result.improved_prompt)
}

fn completeness_score(result: &Prediction) -> f64 {
    (section_count(&result.improved_prompt) as f64 / 3.0).min(1.0)
}

fn clarity_score(result: &Prediction) -> f64 {
    let sentences: Vec<&str> = result
        .improved_prompt
        .split(['.', '\n'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return 0.0;
    }
    let average_len: f64 =
        sentences.iter().map(|s| s.chars().count() as f64).sum::<f64>() / sentences.len() as f64;
    // Penalize sentences that are either too terse or run-on; 20-120
    // characters is treated as the comfortable band.
    if average_len < 20.0 {
        (average_len / 20.0).max(0.0)
    } else if average_len <= 120.0 {
        1.0
    } else {
        (1.0 - (average_len - 120.0) / 200.0).max(0.0)
    }
}

fn framework_type(label: &str) -> FrameworkType {
    if !FrameworkType::recognized().contains(&label) {
        warn!(framework = label, "unrecognized framework label, defaulting to chain-of-thought");
    }
    FrameworkType::from_str_lenient(label)
}

/// Computes the full metrics triad for one improvement result (spec.md
/// §4.10). `impact` defaults to zeros when no usage signal is known
/// yet.
pub fn calculate(
    original_idea: &str,
    result: &Prediction,
    raw_performance: RawPerformance,
    impact: Option<ImpactMetrics>,
) -> PromptMetrics {
    let guardrails_count = (result.guardrails.len() as u32).min(MAX_GUARDRAILS);
    let has_required_structure = !result.role.trim().is_empty()
        && !result.directive.trim().is_empty()
        && !result.framework.trim().is_empty()
        && !result.guardrails.is_empty();

    let quality = QualityMetrics {
        coherence_score: coherence_score(result),
        relevance_score: relevance_score(original_idea, result),
        completeness_score: completeness_score(result),
        clarity_score: clarity_score(result),
        guardrails_count,
        has_required_structure,
    };

    let total_tokens = raw_performance
        .total_tokens
        .unwrap_or_else(|| estimate_tokens(&result.improved_prompt));
    let cost_usd = raw_performance.cost_usd.unwrap_or_else(|| {
        total_tokens as f64 * rate_per_token(&raw_performance.provider, &raw_performance.model)
    });

    let performance = PerformanceMetrics {
        latency_ms: raw_performance.latency_ms,
        total_tokens,
        cost_usd,
        provider: raw_performance.provider.clone(),
        model: raw_performance.model.clone(),
        backend: raw_performance.backend.clone(),
    };

    PromptMetrics {
        prompt_id: new_id(),
        original_idea: original_idea.to_string(),
        improved_prompt: result.improved_prompt.clone(),
        quality,
        performance,
        impact: impact.unwrap_or_default(),
        measured_at: current_timestamp(),
        framework: framework_type(&result.framework),
        provider: raw_performance.provider,
        model: raw_performance.model,
        backend: raw_performance.backend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction() -> Prediction {
        Prediction {
            improved_prompt: "# Task\nImplement a validator.\n\n# Examples\n- one".to_string(),
            role: "an engineer".to_string(),
            directive: "implement carefully".to_string(),
            framework: "chain-of-thought".to_string(),
            guardrails: vec!["be concise".to_string(), "avoid speculation".to_string()],
            reasoning: None,
            confidence: None,
        }
    }

    fn performance() -> RawPerformance {
        RawPerformance {
            latency_ms: 120,
            total_tokens: None,
            cost_usd: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            backend: "dspy".to_string(),
        }
    }

    #[test]
    fn has_required_structure_when_all_fields_present() {
        let metrics = calculate("implement a validator", &prediction(), performance(), None);
        assert!(metrics.quality.has_required_structure);
    }

    #[test]
    fn guardrails_count_is_clipped_at_the_ceiling() {
        let mut p = prediction();
        p.guardrails = (0..20).map(|i| i.to_string()).collect();
        let metrics = calculate("implement a validator", &p, performance(), None);
        assert_eq!(metrics.quality.guardrails_count, MAX_GUARDRAILS);
    }

    #[test]
    fn token_count_is_estimated_when_absent() {
        let metrics = calculate("implement a validator", &prediction(), performance(), None);
        assert!(metrics.performance.total_tokens > 0);
    }

    #[test]
    fn unrecognized_framework_label_falls_back_to_chain_of_thought() {
        let mut p = prediction();
        p.framework = "something-bespoke".to_string();
        let metrics = calculate("implement a validator", &p, performance(), None);
        assert_eq!(metrics.framework, prompt_types::FrameworkType::ChainOfThought);
    }

    #[test]
    fn impact_defaults_to_zero_when_absent() {
        let metrics = calculate("implement a validator", &prediction(), performance(), None);
        assert_eq!(metrics.impact.copy_count, 0);
    }
}
