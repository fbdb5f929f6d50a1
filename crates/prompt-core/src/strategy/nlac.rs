//! NLaC (Natural-Language-as-Code) Builder and Strategy (spec.md
//! §4.7). Assembles a `PromptObject` from role/intent scaffolds,
//! optionally conditions it on KNN few-shot exemplars, hands it to the
//! OPRO optimizer, and maps the result back into a `Prediction`.

use std::collections::HashMap;

use prompt_types::{ComplexityLevel, IntentType, Result};

use crate::domain::{Constraints, Prediction, PromptObject};
use crate::knn::KnnProvider;
use crate::opro::{self, LlmClient};

/// The outer API request translated into builder/optimizer inputs.
pub struct NlacRequest {
    pub original_idea: String,
    pub context: String,
    pub intent: IntentType,
    pub complexity: ComplexityLevel,
}

fn role_for_intent(intent: IntentType) -> &'static str {
    match intent {
        IntentType::Generate => "a skilled software engineer",
        IntentType::Debug => "a meticulous debugger",
        IntentType::Refactor => "a refactoring specialist",
        IntentType::Explain => "a clear technical communicator",
    }
}

fn constraints_for_intent(intent: IntentType) -> Constraints {
    match intent {
        IntentType::Generate => Constraints {
            max_tokens: 1024,
            format: None,
            include_examples: false,
            include_explanation: false,
        },
        IntentType::Debug => Constraints {
            max_tokens: 1536,
            format: Some("code".to_string()),
            include_examples: true,
            include_explanation: true,
        },
        IntentType::Refactor => Constraints {
            max_tokens: 2048,
            format: Some("code".to_string()),
            include_examples: true,
            include_explanation: true,
        },
        IntentType::Explain => Constraints {
            max_tokens: 1024,
            format: None,
            include_examples: false,
            include_explanation: true,
        },
    }
}

const FEWSHOT_K: usize = 3;

pub struct NlacBuilder<'a> {
    knn: Option<&'a KnnProvider>,
}

impl<'a> NlacBuilder<'a> {
    pub fn new(knn: Option<&'a KnnProvider>) -> Self {
        Self { knn }
    }

    /// Builds a `PromptObject` for `request` (spec.md §4.7).
    pub fn build(&self, request: &NlacRequest) -> Result<PromptObject> {
        let role = role_for_intent(request.intent);
        let mut constraints = constraints_for_intent(request.intent);

        let mut template = format!(
            "As {role}, address the following {} request.\n\n# Task\n{}",
            request.intent,
            request.original_idea.trim()
        );
        if !request.context.trim().is_empty() {
            template.push_str(&format!("\n\n# Context\n{}", request.context.trim()));
        }

        let mut fewshot_count = 0usize;
        let knn_enabled = self.knn.is_some();

        if let Some(knn) = self.knn {
            let has_expected_output = request.intent == IntentType::Refactor;
            let examples = knn.find_examples(
                &request.intent.to_string(),
                &request.complexity.to_string(),
                Some(FEWSHOT_K),
                has_expected_output,
                Some(&request.original_idea),
                None,
            )?;
            if !examples.is_empty() {
                template.push_str("\n\n# Examples\n");
                for example in &examples {
                    template.push_str(&format!(
                        "- Idea: {}\n  Prompt: {}\n",
                        example.input_idea, example.improved_prompt
                    ));
                }
                fewshot_count = examples.len();
                constraints.include_examples = true;
            }
        }

        let mut strategy_meta = HashMap::new();
        strategy_meta.insert("role".to_string(), serde_json::Value::String(role.to_string()));
        strategy_meta.insert(
            "knn_enabled".to_string(),
            serde_json::Value::Bool(knn_enabled),
        );
        strategy_meta.insert(
            "fewshot_count".to_string(),
            serde_json::Value::from(fewshot_count),
        );

        let mut prompt_obj = PromptObject::new(request.intent, template, constraints);
        for (key, value) in strategy_meta {
            prompt_obj = prompt_obj.with_meta(&key, value);
        }
        Ok(prompt_obj)
    }
}

pub struct NlacStrategy<'a> {
    builder: NlacBuilder<'a>,
    llm: Option<&'a dyn LlmClient>,
}

impl<'a> NlacStrategy<'a> {
    pub fn new(knn: Option<&'a KnnProvider>, llm: Option<&'a dyn LlmClient>) -> Self {
        Self {
            builder: NlacBuilder::new(knn),
            llm,
        }
    }

    pub fn name(&self) -> &'static str {
        "nlac"
    }

    /// Builds, optimizes, then maps the result into a `Prediction`
    /// (spec.md §4.7's field derivations).
    pub fn improve(&self, request: &NlacRequest) -> Result<Prediction> {
        let prompt_obj = self.builder.build(request)?;
        let response = opro::run_loop(&prompt_obj, self.llm, None)?;

        let role = prompt_obj
            .strategy_meta
            .get("role")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let framework = if request.complexity == ComplexityLevel::Simple {
            "chain-of-thought"
        } else {
            "decomposition"
        }
        .to_string();

        let guardrails = vec![
            format!("max_tokens={}", prompt_obj.constraints.max_tokens),
            format!("include_examples={}", prompt_obj.constraints.include_examples),
            format!(
                "include_explanation={}",
                prompt_obj.constraints.include_explanation
            ),
        ];

        Ok(Prediction {
            improved_prompt: response.final_instruction,
            role,
            directive: format!("{} + {}", self.name(), request.intent),
            framework,
            guardrails,
            reasoning: None,
            confidence: Some(response.final_score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(intent: IntentType) -> NlacRequest {
        NlacRequest {
            original_idea: "validate a user's email address before saving it".to_string(),
            context: String::new(),
            intent,
            complexity: ComplexityLevel::Moderate,
        }
    }

    #[test]
    fn build_without_knn_sets_knn_enabled_false() {
        let builder = NlacBuilder::new(None);
        let prompt_obj = builder.build(&request(IntentType::Generate)).unwrap();
        assert_eq!(
            prompt_obj.strategy_meta.get("knn_enabled"),
            Some(&serde_json::Value::Bool(false))
        );
    }

    #[test]
    fn directive_combines_strategy_name_and_intent() {
        let strategy = NlacStrategy::new(None, None);
        let prediction = strategy.improve(&request(IntentType::Debug)).unwrap();
        assert_eq!(prediction.directive, "nlac + DEBUG");
    }

    #[test]
    fn framework_is_chain_of_thought_for_simple_complexity() {
        let strategy = NlacStrategy::new(None, None);
        let mut req = request(IntentType::Generate);
        req.complexity = ComplexityLevel::Simple;
        let prediction = strategy.improve(&req).unwrap();
        assert_eq!(prediction.framework, "chain-of-thought");
    }

    #[test]
    fn framework_is_decomposition_for_non_simple_complexity() {
        let strategy = NlacStrategy::new(None, None);
        let prediction = strategy.improve(&request(IntentType::Refactor)).unwrap();
        assert_eq!(prediction.framework, "decomposition");
    }
}
