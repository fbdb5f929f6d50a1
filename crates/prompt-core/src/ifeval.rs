//! IFEval Validator (spec.md §4.8). Scores a rendered prompt string
//! against a small, composable set of instruction-following
//! constraints. The default three constraints are mandatory for seed
//! compatibility; additional constraints may be layered on by callers
//! that build their own `Vec<Constraint>`.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ConstraintOutcome, ValidationResult};

pub const DEFAULT_MIN_CHARS: usize = 50;
pub const DEFAULT_THRESHOLD: f64 = 0.7;

const ACTION_VERBS: &[&str] = &["create", "implement", "write", "build", "develop", "add"];

static ACTION_VERB_PATTERN: OnceLock<Regex> = OnceLock::new();

fn action_verb_pattern() -> &'static Regex {
    ACTION_VERB_PATTERN.get_or_init(|| {
        let alternation = ACTION_VERBS
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b({alternation})\b")).unwrap()
    })
}

/// A single named check against a rendered prompt.
pub struct Constraint {
    pub name: &'static str,
    pub check: fn(&str, usize) -> ConstraintOutcome,
}

fn min_length_check(prompt: &str, min_chars: usize) -> ConstraintOutcome {
    let len = prompt.trim().chars().count();
    if len >= min_chars {
        ConstraintOutcome {
            passed: true,
            reason: format!("length {len} meets the minimum of {min_chars}"),
        }
    } else {
        ConstraintOutcome {
            passed: false,
            reason: format!("length {len} is below the minimum of {min_chars}"),
        }
    }
}

fn action_verb_check(prompt: &str, _min_chars: usize) -> ConstraintOutcome {
    if action_verb_pattern().is_match(prompt) {
        ConstraintOutcome {
            passed: true,
            reason: "contains at least one action verb".to_string(),
        }
    } else {
        ConstraintOutcome {
            passed: false,
            reason: "missing an action verb (create/implement/write/build/develop/add)"
                .to_string(),
        }
    }
}

/// Permissive: prompts that don't look like JSON always pass. Prompts
/// that look JSON-shaped (start with `{` or `[`) must parse.
fn json_format_check(prompt: &str, _min_chars: usize) -> ConstraintOutcome {
    let trimmed = prompt.trim();
    let looks_like_json = trimmed.starts_with('{') || trimmed.starts_with('[');
    if !looks_like_json {
        return ConstraintOutcome {
            passed: true,
            reason: "not JSON-shaped, constraint does not apply".to_string(),
        };
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(_) => ConstraintOutcome {
            passed: true,
            reason: "valid JSON".to_string(),
        },
        Err(err) => ConstraintOutcome {
            passed: false,
            reason: format!("JSON-shaped but failed to parse: {err}"),
        },
    }
}

/// The three mandatory default constraints, in evaluation order.
pub fn default_constraints() -> Vec<Constraint> {
    vec![
        Constraint {
            name: "min_length",
            check: min_length_check,
        },
        Constraint {
            name: "action_verbs",
            check: action_verb_check,
        },
        Constraint {
            name: "json_format",
            check: json_format_check,
        },
    ]
}

/// Scores `prompt` against `constraints`; `passed` iff `score >=
/// threshold`.
pub fn validate(
    prompt: &str,
    constraints: &[Constraint],
    min_chars: usize,
    threshold: f64,
) -> ValidationResult {
    let mut details = std::collections::HashMap::new();
    let mut passed_count = 0usize;

    for (index, constraint) in constraints.iter().enumerate() {
        let outcome = (constraint.check)(prompt, min_chars);
        if outcome.passed {
            passed_count += 1;
        }
        details.insert(format!("constraint_{}", index + 1), outcome);
    }

    let score = if constraints.is_empty() {
        1.0
    } else {
        passed_count as f64 / constraints.len() as f64
    };

    ValidationResult {
        score,
        passed: score >= threshold,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompt_fails_min_length() {
        let result = validate("hi", &default_constraints(), DEFAULT_MIN_CHARS, DEFAULT_THRESHOLD);
        assert!(!result.details["constraint_1"].passed);
    }

    #[test]
    fn prompt_with_action_verb_passes_that_constraint() {
        let prompt = "Please implement a function that validates user input thoroughly.";
        let result = validate(prompt, &default_constraints(), DEFAULT_MIN_CHARS, DEFAULT_THRESHOLD);
        assert!(result.details["constraint_2"].passed);
    }

    #[test]
    fn non_json_prompt_always_passes_json_constraint() {
        let prompt = "Please build a long enough plain text prompt about something useful.";
        let result = validate(prompt, &default_constraints(), DEFAULT_MIN_CHARS, DEFAULT_THRESHOLD);
        assert!(result.details["constraint_3"].passed);
    }

    #[test]
    fn malformed_json_shaped_prompt_fails_json_constraint() {
        let prompt = "{ this is not valid json and also quite long for a test case }";
        let result = validate(prompt, &default_constraints(), DEFAULT_MIN_CHARS, DEFAULT_THRESHOLD);
        assert!(!result.details["constraint_3"].passed);
    }

    #[test]
    fn score_is_fraction_of_passed_constraints() {
        let prompt = "hi";
        let result = validate(prompt, &default_constraints(), DEFAULT_MIN_CHARS, DEFAULT_THRESHOLD);
        // min_length fails, action_verbs fails (no verb), json passes (not json-shaped)
        assert!((result.score - (1.0 / 3.0)).abs() < 1e-9);
        assert!(!result.passed);
    }
}
