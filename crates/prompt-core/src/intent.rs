//! Intent Classifier (spec.md §4.5). Rule-based, ordered keyword
//! matching over the combined `idea + " " + context` text.
//! `original_source/hemdov/domain/services/keyword_classifier.py`
//! ships a keyword-priority classifier, but it classifies filenames
//! by priority/category, not idea text by intent — not the same
//! component, so the implementation here follows spec.md §4.5
//! directly, in the same word-boundary style as `complexity.rs`.

use std::sync::OnceLock;

use prompt_types::IntentType;
use regex::Regex;

struct Rule {
    intent: IntentType,
    keywords: &'static [&'static str],
}

/// Precedence order matters: the first matching rule wins. The
/// Spanish review/audit keywords are mandatory members of `EXPLAIN`
/// (spec.md §4.5).
const RULES: &[Rule] = &[
    Rule {
        intent: IntentType::Explain,
        keywords: &[
            "explain",
            "how does",
            "why",
            "revisar",
            "revisión",
            "auditoría",
            "analizar",
            "examine",
            "review",
            "audit",
        ],
    },
    Rule {
        intent: IntentType::Debug,
        keywords: &["fix", "debug", "error", "bug", "broken", "failing", "exception"],
    },
    Rule {
        intent: IntentType::Refactor,
        keywords: &["refactor", "optimize", "clean up", "restructure", "improve"],
    },
];

static KEYWORD_PATTERNS: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();

fn keyword_patterns() -> &'static [Vec<Regex>] {
    KEYWORD_PATTERNS.get_or_init(|| {
        RULES
            .iter()
            .map(|rule| {
                rule.keywords
                    .iter()
                    .map(|kw| {
                        // Multi-word keywords ("how does", "clean up") can't use
                        // \b on both sides verbatim because of the inner space,
                        // but \b around the whole phrase still rejects partial
                        // word matches at the edges.
                        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw))).unwrap()
                    })
                    .collect()
            })
            .collect()
    })
}

/// Classifies `(idea, context)` into an `IntentType`. Defaults to
/// `GENERATE` when no rule matches (spec.md §4.5).
pub fn classify(idea: &str, context: &str) -> IntentType {
    let combined = format!("{idea} {context}");
    let patterns = keyword_patterns();

    for (rule, regexes) in RULES.iter().zip(patterns.iter()) {
        if regexes.iter().any(|re| re.is_match(&combined)) {
            return rule.intent;
        }
    }

    IntentType::Generate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_review_keyword_triggers_explain() {
        assert_eq!(
            classify("haz una revisión del sistema NLaC", ""),
            IntentType::Explain
        );
    }

    #[test]
    fn explain_takes_precedence_over_debug() {
        // "review" (EXPLAIN) appears before "error" (DEBUG) in the
        // ordered rule list, so EXPLAIN wins even though both match.
        assert_eq!(
            classify("review this error in the logs", ""),
            IntentType::Explain
        );
    }

    #[test]
    fn debug_keyword_is_detected() {
        assert_eq!(classify("fix this bug", ""), IntentType::Debug);
    }

    #[test]
    fn refactor_keyword_is_detected() {
        assert_eq!(classify("refactor this module", ""), IntentType::Refactor);
    }

    #[test]
    fn unmatched_text_defaults_to_generate() {
        assert_eq!(
            classify("write a python function to validate email addresses", ""),
            IntentType::Generate
        );
    }
}
