//! OPRO Iterative Optimizer (spec.md §4.9). Refines a `PromptObject`'s
//! template across a bounded number of iterations, scoring each
//! candidate and stopping early once quality saturates. No direct
//! `original_source` file implements this in Python form retrievable
//! in the pack; the algorithm here follows spec.md §4.9 directly.

use prompt_types::{DomainError, ErrorCategory, Result};

use crate::domain::{Constraints, KnnFailure, OproIteration, OptimizeResponse, PromptObject};

pub const MAX_ITERATIONS: u32 = 3;
pub const QUALITY_THRESHOLD: f64 = 1.0;

/// Generates a refined instruction from a meta-prompt. Implemented by
/// infrastructure (spec.md §4.9); `ConnectionError`/`TimeoutError`-class
/// failures degrade gracefully to the deterministic fallback, while any
/// other error propagates.
pub trait LlmClient {
    fn generate(&self, meta_prompt: &str) -> Result<String>;
    fn backend(&self) -> &str;
    fn model(&self) -> &str;
}

fn is_transient_llm_failure(error: &DomainError) -> bool {
    matches!(error.category(), ErrorCategory::LlmProvider)
}

fn build_meta_prompt(original_instruction: &str, feedback: &[String]) -> String {
    let mut meta = format!("Improve the following instruction:\n{original_instruction}\n");
    if !feedback.is_empty() {
        meta.push_str("\nPrior feedback:\n");
        for item in feedback {
            meta.push_str(&format!("- {item}\n"));
        }
    }
    meta
}

/// Deterministic refinement used when no `LlmClient` is configured, or
/// when one fails transiently: appends whatever structure the
/// constraints demand but the candidate is missing.
fn simple_refinement(candidate: &str, constraints: &Constraints) -> String {
    let mut refined = candidate.to_string();

    if let Some(format) = &constraints.format {
        if format.to_lowercase().contains("code") && !refined.contains("```") {
            refined.push_str("\n\n```\n// add implementation here\n```");
        }
    }

    if constraints.include_examples && !refined.to_lowercase().contains("example") {
        refined.push_str("\n\nExample: demonstrate the expected input and output.");
    }

    if constraints.include_explanation {
        let sentence_count = refined.split('.').filter(|s| s.trim().len() > 30).count();
        if sentence_count < 2 {
            refined.push_str(
                "\n\nExplanation: walk through the reasoning behind this response before answering.",
            );
        }
    }

    if refined.trim().chars().count() <= 50 {
        refined.push_str("\n\nProvide a complete, detailed response addressing every requirement above.");
    }

    refined
}

struct EvalOutcome {
    score: f64,
    feedback: String,
}

/// Scores a candidate template against its constraints (spec.md
/// §4.9's rubric). Only applicable checks contribute to the
/// denominator.
fn evaluate(template: &str, constraints: &Constraints) -> EvalOutcome {
    let trimmed = template.trim();
    let mut total = 0u32;
    let mut passed = 0u32;
    let mut notes = Vec::new();

    total += 1;
    let estimated_tokens = (trimmed.chars().count() as f64 / 4.0).ceil() as u32;
    if estimated_tokens <= constraints.max_tokens {
        passed += 1;
    } else {
        notes.push("template too long".to_string());
    }

    if let Some(format) = &constraints.format {
        if format.to_lowercase().contains("code") {
            total += 1;
            if template.contains("```") {
                passed += 1;
            } else {
                notes.push("missing code block".to_string());
            }
        }
    }

    if constraints.include_examples {
        total += 1;
        if template.to_lowercase().contains("example") {
            passed += 1;
        } else {
            notes.push("missing example".to_string());
        }
    }

    if constraints.include_explanation {
        total += 1;
        let long_sentences = template.split('.').filter(|s| s.trim().len() > 30).count();
        if long_sentences >= 2 {
            passed += 1;
        } else {
            notes.push("missing explanation".to_string());
        }
    }

    total += 1;
    if trimmed.chars().count() > 50 {
        passed += 1;
    } else {
        notes.push("basic quality".to_string());
    }

    let score = if total == 0 { 1.0 } else { passed as f64 / total as f64 };
    let feedback = if notes.is_empty() {
        "all checks passed".to_string()
    } else {
        notes.join("; ")
    };

    EvalOutcome { score, feedback }
}

/// Runs the bounded refinement loop over `prompt_obj`'s template.
pub fn run_loop(
    prompt_obj: &PromptObject,
    llm: Option<&dyn LlmClient>,
    knn_failure: Option<KnnFailure>,
) -> Result<OptimizeResponse> {
    let original_instruction = prompt_obj.template.clone();
    let mut candidate = original_instruction.clone();
    let mut trajectory = Vec::new();
    let mut feedback_history = Vec::new();
    let (backend, model) = llm
        .map(|c| (c.backend().to_string(), c.model().to_string()))
        .unwrap_or_else(|| ("deterministic".to_string(), "simple_refinement".to_string()));

    for iteration in 1..=MAX_ITERATIONS {
        let meta_prompt = if iteration == 1 {
            String::new()
        } else {
            build_meta_prompt(&original_instruction, &feedback_history)
        };

        if iteration > 1 {
            candidate = match llm {
                Some(client) => match client.generate(&meta_prompt) {
                    Ok(generated) => generated,
                    Err(error) if is_transient_llm_failure(&error) => {
                        simple_refinement(&candidate, &prompt_obj.constraints)
                    }
                    Err(error) => return Err(error),
                },
                None => simple_refinement(&candidate, &prompt_obj.constraints),
            };
        }

        let outcome = evaluate(&candidate, &prompt_obj.constraints);

        if outcome.score >= QUALITY_THRESHOLD {
            return Ok(OptimizeResponse {
                prompt_id: prompt_obj.id,
                final_instruction: candidate,
                final_score: outcome.score,
                iteration_count: iteration,
                early_stopped: true,
                trajectory,
                knn_failure,
                backend,
                model,
            });
        }

        feedback_history.push(outcome.feedback.clone());
        trajectory.push(OproIteration {
            iteration_number: iteration,
            meta_prompt_used: meta_prompt,
            generated_instruction: candidate.clone(),
            score: outcome.score,
            feedback: outcome.feedback,
        });
    }

    let best = trajectory
        .iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
        .expect("trajectory is non-empty after MAX_ITERATIONS loop iterations");

    Ok(OptimizeResponse {
        prompt_id: prompt_obj.id,
        final_instruction: best.generated_instruction.clone(),
        final_score: best.score,
        iteration_count: MAX_ITERATIONS,
        early_stopped: false,
        trajectory,
        knn_failure,
        backend,
        model,
    })
}
