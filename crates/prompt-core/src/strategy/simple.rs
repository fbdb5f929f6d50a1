//! Simple strategy: ultra-concise improvement for trivial inputs.
//! Grounded in `original_source/eval/src/strategies/simple_strategy.py`
//! — the original calls out to `dspy.Predict`; this reimplementation
//! keeps the same shape (validate, build, truncate with suffix) but
//! assembles the prediction deterministically since prompt-core has no
//! LLM dependency.

use prompt_types::Result;

use crate::domain::Prediction;
use crate::strategy::{base, validate_inputs, Strategy};

const DEFAULT_MAX_LENGTH: usize = 800;

pub struct SimpleStrategy {
    max_length: usize,
}

impl Default for SimpleStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl SimpleStrategy {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Strategy for SimpleStrategy {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn improve(&self, original_idea: &str, context: &str) -> Result<Prediction> {
        validate_inputs(original_idea)?;

        let role = "a precise, efficient assistant".to_string();
        let directive = "Answer directly and concisely, without unnecessary elaboration".to_string();

        let mut body = format!("As {role}, {directive}.\n\nTask: {}", original_idea.trim());
        if !context.trim().is_empty() {
            body.push_str(&format!("\nContext: {}", context.trim()));
        }
        let improved_prompt = base::truncate(&body, self.max_length, true);

        Ok(Prediction {
            improved_prompt,
            role,
            directive,
            framework: "chain-of-thought".to_string(),
            guardrails: vec![
                "be concise".to_string(),
                "avoid speculation".to_string(),
                "state assumptions explicitly".to_string(),
            ],
            reasoning: None,
            confidence: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_idea_is_rejected() {
        let strategy = SimpleStrategy::default();
        assert!(strategy.improve("", "").is_err());
    }

    #[test]
    fn produces_three_guardrails() {
        let strategy = SimpleStrategy::default();
        let prediction = strategy.improve("write a function", "").unwrap();
        assert_eq!(prediction.guardrails.len(), 3);
    }

    #[test]
    fn truncates_past_the_configured_bound() {
        let strategy = SimpleStrategy::new(60);
        let idea = "a".repeat(200);
        let prediction = strategy.improve(&idea, "").unwrap();
        assert!(prediction.improved_prompt.chars().count() <= 63);
    }
}
