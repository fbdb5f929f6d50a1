//! Moderate strategy: balanced improvement with explicit reasoning.
//! Grounded in
//! `original_source/eval/src/strategies/moderate_strategy.py` — the
//! original drives `dspy.ChainOfThought`, which is why its `Prediction`
//! always carries a `reasoning` field; this reimplementation keeps
//! that contract without an LLM dependency.

use prompt_types::Result;

use crate::domain::Prediction;
use crate::strategy::{base, validate_inputs, Strategy};

const DEFAULT_MAX_LENGTH: usize = 2000;

pub struct ModerateStrategy {
    max_length: usize,
}

impl Default for ModerateStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl ModerateStrategy {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Strategy for ModerateStrategy {
    fn name(&self) -> &'static str {
        "moderate"
    }

    fn improve(&self, original_idea: &str, context: &str) -> Result<Prediction> {
        validate_inputs(original_idea)?;

        let role = "a senior engineer who reasons step by step".to_string();
        let directive =
            "Break the task into steps, then produce a single well-structured response".to_string();
        let reasoning = format!(
            "The idea touches {} distinct concern(s); reason through each before answering.",
            original_idea.split_whitespace().count().max(1)
        );

        let mut body = format!(
            "As {role}, {directive}.\n\n# Task\n{}",
            original_idea.trim()
        );
        if !context.trim().is_empty() {
            body.push_str(&format!("\n\n# Context\n{}", context.trim()));
        }
        body.push_str("\n\n# Reasoning\n");
        body.push_str(&reasoning);

        let improved_prompt = base::truncate(&body, self.max_length, false);

        Ok(Prediction {
            improved_prompt,
            role,
            directive,
            framework: "chain-of-thought".to_string(),
            guardrails: vec![
                "show intermediate reasoning".to_string(),
                "avoid speculation".to_string(),
                "state assumptions explicitly".to_string(),
                "keep the final answer separate from the reasoning".to_string(),
            ],
            reasoning: Some(reasoning),
            confidence: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_reasoning() {
        let strategy = ModerateStrategy::default();
        let prediction = strategy.improve("write a parser for JSON", "").unwrap();
        assert!(prediction.reasoning.is_some());
    }

    #[test]
    fn produces_four_guardrails() {
        let strategy = ModerateStrategy::default();
        let prediction = strategy.improve("write a parser", "").unwrap();
        assert_eq!(prediction.guardrails.len(), 4);
    }

    #[test]
    fn truncation_never_adds_a_suffix() {
        let strategy = ModerateStrategy::new(60);
        let idea = "a".repeat(200);
        let prediction = strategy.improve(&idea, "").unwrap();
        assert!(!prediction.improved_prompt.ends_with("..."));
    }
}
