//! Domain value types for the prompt-improvement pipeline: exemplars,
//! prompt objects, optimizer trajectories, and the quality/performance/
//! impact metric triad. All are immutable — refinement methods return
//! new values rather than mutating `self`, per spec.md §9's
//! "frozen dataclass" guidance.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use prompt_types::{current_timestamp, new_id, FrameworkType, Id, IntentType};
use serde::{Deserialize, Serialize};

/// A curated (input, output) pair retrieved from the catalog to
/// condition the improvement. Immutable after load; lives for the
/// process lifetime (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    pub input_idea: String,
    #[serde(default)]
    pub input_context: String,
    pub improved_prompt: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub directive: String,
    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub guardrails: Vec<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Exemplar {
    /// An exemplar missing either field is dropped during catalog
    /// load (spec.md §3's catalog invariant).
    pub fn is_valid(&self) -> bool {
        !self.input_idea.trim().is_empty() && !self.improved_prompt.trim().is_empty()
    }
}

/// A view of an `Exemplar` returned from KNN retrieval, carrying the
/// similarity score that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FewShotExample {
    pub input_idea: String,
    pub input_context: String,
    pub improved_prompt: String,
    pub role: String,
    pub directive: String,
    pub framework: String,
    pub guardrails: Vec<String>,
    pub expected_output: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub similarity: f64,
}

impl FewShotExample {
    pub fn from_exemplar(exemplar: &Exemplar, similarity: f64) -> Self {
        Self {
            input_idea: exemplar.input_idea.clone(),
            input_context: exemplar.input_context.clone(),
            improved_prompt: exemplar.improved_prompt.clone(),
            role: exemplar.role.clone(),
            directive: exemplar.directive.clone(),
            framework: exemplar.framework.clone(),
            guardrails: exemplar.guardrails.clone(),
            expected_output: exemplar.expected_output.clone(),
            metadata: exemplar.metadata.clone(),
            similarity,
        }
    }
}

/// Ordered, immutable pool of exemplars loaded once at process start.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exemplars: Vec<Exemplar>,
}

/// Diagnostics produced while building a `Catalog` from raw entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogLoadStats {
    pub total: usize,
    pub skipped: usize,
}

impl CatalogLoadStats {
    pub fn skip_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.skipped as f64 / self.total as f64
        }
    }
}

impl Catalog {
    /// Builds a catalog from raw entries, skipping any `Exemplar`
    /// missing `input_idea` or `improved_prompt` (spec.md §3).
    pub fn from_raw(entries: Vec<Exemplar>) -> (Self, CatalogLoadStats) {
        let total = entries.len();
        let mut exemplars = Vec::with_capacity(total);
        let mut skipped = 0usize;
        for entry in entries {
            if entry.is_valid() {
                exemplars.push(entry);
            } else {
                skipped += 1;
            }
        }
        (Self { exemplars }, CatalogLoadStats { total, skipped })
    }

    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }

    pub fn len(&self) -> usize {
        self.exemplars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }
}

/// Constraints attached to a `PromptObject`, derived from intent
/// during NLaC construction (spec.md §4.7) and checked during OPRO
/// scoring (spec.md §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    pub max_tokens: u32,
    pub format: Option<String>,
    pub include_examples: bool,
    pub include_explanation: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            format: None,
            include_examples: false,
            include_explanation: false,
        }
    }
}

/// Immutable template-plus-metadata object produced by the NLaC
/// builder and refined by OPRO. Refinement yields a new `PromptObject`
/// rather than mutating this one (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptObject {
    pub id: Id,
    pub version: u32,
    pub intent_type: IntentType,
    pub template: String,
    pub strategy_meta: HashMap<String, serde_json::Value>,
    pub constraints: Constraints,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromptObject {
    pub fn new(intent_type: IntentType, template: String, constraints: Constraints) -> Self {
        let now = current_timestamp();
        Self {
            id: new_id(),
            version: 1,
            intent_type,
            template,
            strategy_meta: HashMap::new(),
            constraints,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a new `PromptObject` with an updated template and
    /// incremented version; `self` is untouched.
    pub fn with_template(&self, template: String) -> Self {
        Self {
            id: self.id,
            version: self.version + 1,
            intent_type: self.intent_type,
            template,
            strategy_meta: self.strategy_meta.clone(),
            constraints: self.constraints.clone(),
            created_at: self.created_at,
            updated_at: current_timestamp(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.strategy_meta.insert(key.to_string(), value);
        self
    }
}

/// One step of the OPRO trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OproIteration {
    pub iteration_number: u32,
    pub meta_prompt_used: String,
    pub generated_instruction: String,
    pub score: f64,
    pub feedback: String,
}

/// Metadata about KNN failures observed while a strategy or optimizer
/// ran, surfaced so the caller can set degradation flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnFailure {
    pub count: u32,
    pub error_type: String,
}

/// Final result of an OPRO run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub prompt_id: Id,
    pub final_instruction: String,
    pub final_score: f64,
    pub iteration_count: u32,
    pub early_stopped: bool,
    pub trajectory: Vec<OproIteration>,
    pub knn_failure: Option<KnnFailure>,
    pub backend: String,
    pub model: String,
}

impl OptimizeResponse {
    /// Alias of `final_instruction`, named to match spec.md §3.
    pub fn improved_prompt(&self) -> &str {
        &self.final_instruction
    }
}

/// Per-constraint pass/fail detail from the IFEval validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintOutcome {
    pub passed: bool,
    pub reason: String,
}

/// Result of scoring a prompt string against the IFEval constraint set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub score: f64,
    pub passed: bool,
    pub details: HashMap<String, ConstraintOutcome>,
}

/// Output of a strategy's `improve` contract (spec.md §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub improved_prompt: String,
    pub role: String,
    pub directive: String,
    pub framework: String,
    pub guardrails: Vec<String>,
    pub reasoning: Option<String>,
    pub confidence: Option<f64>,
}

/// Quality sub-metrics (spec.md §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub coherence_score: f64,
    pub relevance_score: f64,
    pub completeness_score: f64,
    pub clarity_score: f64,
    pub guardrails_count: u32,
    pub has_required_structure: bool,
}

impl QualityMetrics {
    /// Weighted average of the four sub-scores (equal weight) plus a
    /// structure bonus (+0.10) and a guardrails bonus
    /// (`min(0.05 * count, 0.15)`), capped at 1.0.
    pub fn composite_score(&self) -> f64 {
        let average = (self.coherence_score
            + self.relevance_score
            + self.completeness_score
            + self.clarity_score)
            / 4.0;
        let structure_bonus = if self.has_required_structure { 0.10 } else { 0.0 };
        let guardrails_bonus = (0.05 * self.guardrails_count as f64).min(0.15);
        (average + structure_bonus + guardrails_bonus).min(1.0)
    }
}

/// Performance sub-metrics (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub latency_ms: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub provider: String,
    pub model: String,
    pub backend: String,
}

/// Impact sub-metrics (spec.md §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub copy_count: u32,
    pub regeneration_count: u32,
    pub feedback_score: Option<f64>,
    pub reuse_count: u32,
}

impl Default for ImpactMetrics {
    fn default() -> Self {
        Self {
            copy_count: 0,
            regeneration_count: 0,
            feedback_score: None,
            reuse_count: 0,
        }
    }
}

impl ImpactMetrics {
    pub fn success_rate(&self) -> f64 {
        let sum = self.copy_count + self.regeneration_count;
        if sum > 0 {
            self.copy_count as f64 / sum as f64
        } else {
            0.0
        }
    }

    pub fn impact_score(&self) -> f64 {
        let feedback_component = self.feedback_score.unwrap_or(0.0) / 5.0;
        let reuse_component = (self.reuse_count as f64 / 5.0).min(1.0);
        0.30 * (self.copy_count as f64).min(1.0)
            + 0.30 * self.success_rate()
            + 0.25 * feedback_component
            + 0.15 * reuse_component
    }
}

/// Letter grade for a `PromptMetrics`' overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricGrade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    D,
    F,
}

impl std::fmt::Display for MetricGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MetricGrade::APlus => "A+",
            MetricGrade::A => "A",
            MetricGrade::AMinus => "A-",
            MetricGrade::BPlus => "B+",
            MetricGrade::B => "B",
            MetricGrade::BMinus => "B-",
            MetricGrade::CPlus => "C+",
            MetricGrade::C => "C",
            MetricGrade::D => "D",
            MetricGrade::F => "F",
        };
        write!(f, "{s}")
    }
}

/// Fixed thresholds mapping an overall score to a `MetricGrade`.
pub fn grade_for_score(score: f64) -> MetricGrade {
    if score >= 0.97 {
        MetricGrade::APlus
    } else if score >= 0.93 {
        MetricGrade::A
    } else if score >= 0.90 {
        MetricGrade::AMinus
    } else if score >= 0.87 {
        MetricGrade::BPlus
    } else if score >= 0.83 {
        MetricGrade::B
    } else if score >= 0.80 {
        MetricGrade::BMinus
    } else if score >= 0.77 {
        MetricGrade::CPlus
    } else if score >= 0.70 {
        MetricGrade::C
    } else if score >= 0.60 {
        MetricGrade::D
    } else {
        MetricGrade::F
    }
}

/// The composite, persisted metrics record for one improved prompt
/// (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetrics {
    pub prompt_id: Id,
    pub original_idea: String,
    pub improved_prompt: String,
    pub quality: QualityMetrics,
    pub performance: PerformanceMetrics,
    pub impact: ImpactMetrics,
    pub measured_at: DateTime<Utc>,
    pub framework: FrameworkType,
    pub provider: String,
    pub model: String,
    pub backend: String,
}

impl PromptMetrics {
    pub fn overall_score(&self, performance_score: f64) -> f64 {
        0.50 * self.quality.composite_score() + 0.25 * performance_score + 0.25 * self.impact.impact_score()
    }

    pub fn grade(&self, performance_score: f64) -> MetricGrade {
        grade_for_score(self.overall_score(performance_score))
    }

    pub fn is_acceptable(&self, performance_score: f64) -> bool {
        self.quality.composite_score() >= 0.60
            && performance_score >= 0.40
            && self.impact.success_rate() >= 0.50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exemplar(idea: &str, prompt: &str) -> Exemplar {
        Exemplar {
            input_idea: idea.to_string(),
            input_context: String::new(),
            improved_prompt: prompt.to_string(),
            role: String::new(),
            directive: String::new(),
            framework: String::new(),
            guardrails: vec![],
            expected_output: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn catalog_skips_entries_missing_idea_or_prompt() {
        let entries = vec![
            exemplar("write a function", "improved"),
            exemplar("", "improved"),
            exemplar("write a function", ""),
        ];
        let (catalog, stats) = Catalog::from_raw(entries);
        assert_eq!(catalog.len(), 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn composite_score_is_monotonic_in_guardrails_count() {
        let mut metrics = QualityMetrics {
            coherence_score: 0.6,
            relevance_score: 0.6,
            completeness_score: 0.6,
            clarity_score: 0.6,
            guardrails_count: 0,
            has_required_structure: true,
        };
        let score_0 = metrics.composite_score();
        metrics.guardrails_count = 3;
        let score_3 = metrics.composite_score();
        assert!(score_3 > score_0);
        assert!(score_3 <= 1.0);
    }

    #[test]
    fn impact_success_rate_is_zero_when_no_copies_or_regenerations() {
        let impact = ImpactMetrics::default();
        assert_eq!(impact.success_rate(), 0.0);
    }
}
