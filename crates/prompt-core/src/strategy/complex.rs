//! Complex strategy: few-shot improvement for demanding inputs.
//! Grounded in
//! `original_source/eval/src/strategies/complex_strategy.py`'s use of
//! `KNNFewShot` — this reimplementation retrieves exemplars directly
//! from a `KnnProvider` rather than compiling a DSPy few-shot module.

use prompt_types::Result;

use crate::domain::Prediction;
use crate::knn::KnnProvider;
use crate::strategy::{base, validate_inputs, Strategy};

const DEFAULT_MAX_LENGTH: usize = 5000;
const DEFAULT_K: usize = 3;

pub struct ComplexStrategy<'a> {
    max_length: usize,
    k: usize,
    knn: Option<&'a KnnProvider>,
}

impl<'a> ComplexStrategy<'a> {
    pub fn new(max_length: usize, k: usize, knn: Option<&'a KnnProvider>) -> Self {
        Self { max_length, k, knn }
    }

    pub fn without_knn() -> Self {
        Self::new(DEFAULT_MAX_LENGTH, DEFAULT_K, None)
    }
}

impl<'a> Strategy for ComplexStrategy<'a> {
    fn name(&self) -> &'static str {
        "complex"
    }

    fn improve(&self, original_idea: &str, context: &str) -> Result<Prediction> {
        validate_inputs(original_idea)?;

        let role = "an expert practitioner drawing on proven examples".to_string();
        let directive =
            "Decompose the problem, ground the answer in relevant precedent, then respond fully"
                .to_string();

        let mut body = format!(
            "As {role}, {directive}.\n\n# Task\n{}",
            original_idea.trim()
        );
        if !context.trim().is_empty() {
            body.push_str(&format!("\n\n# Context\n{}", context.trim()));
        }

        let mut fewshot_count = 0usize;
        if let Some(knn) = self.knn {
            let examples = knn.find_examples(
                "GENERATE",
                "COMPLEX",
                Some(self.k),
                false,
                Some(original_idea),
                None,
            )?;
            if !examples.is_empty() {
                body.push_str("\n\n# Examples\n");
                for example in &examples {
                    body.push_str(&format!(
                        "- Idea: {}\n  Prompt: {}\n",
                        example.input_idea, example.improved_prompt
                    ));
                }
                fewshot_count = examples.len();
            }
        }

        let improved_prompt = base::truncate(&body, self.max_length, false);

        Ok(Prediction {
            improved_prompt,
            role,
            directive,
            framework: "decomposition".to_string(),
            guardrails: vec![
                "ground claims in the supplied examples".to_string(),
                "decompose before answering".to_string(),
                "avoid speculation".to_string(),
                "state assumptions explicitly".to_string(),
                format!("fewshot_count={fewshot_count}"),
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
    fn works_without_a_knn_provider() {
        let strategy = ComplexStrategy::without_knn();
        let prediction = strategy.improve("design a caching layer", "").unwrap();
        assert_eq!(prediction.guardrails.len(), 5);
        assert!(prediction.guardrails.last().unwrap().contains("fewshot_count=0"));
    }

    #[test]
    fn empty_idea_is_rejected() {
        let strategy = ComplexStrategy::without_knn();
        assert!(strategy.improve("   ", "").is_err());
    }
}
