//! Complexity Analyzer (spec.md §4.4). Classifies combined
//! `idea + " " + context` as `SIMPLE | MODERATE | COMPLEX` via a
//! weighted four-factor score. Grounded in
//! `original_source/eval/src/complexity_analyzer.py`, with one
//! deliberate deviation mandated by spec.md §9: technical-term
//! matching is word-boundary, never substring (the original mixes
//! the two).

use std::sync::OnceLock;

use prompt_types::{ComplexityLevel, DomainError, Result};
use regex::Regex;

const SIMPLE_MAX_LENGTH: usize = 50;
const MODERATE_MAX_LENGTH: usize = 150;
const AUTO_COMPLEX_LENGTH: usize = 300;

const LENGTH_WEIGHT: f64 = 0.40;
const TECHNICAL_WEIGHT: f64 = 0.30;
const STRUCTURE_WEIGHT: f64 = 0.20;
const CONTEXT_WEIGHT: f64 = 0.10;

const SIMPLE_MAX_SCORE: f64 = 0.25;
const MODERATE_MAX_SCORE: f64 = 0.60;

/// Recognized technical terms (bilingual — the source domain mixes
/// English and Spanish vocabulary), matched with word boundaries so
/// "api" never matches inside "capacity" (spec.md §4.4/§9).
const TECHNICAL_TERMS: &[&str] = &[
    "framework",
    "arquitectura",
    "patrón",
    "diseño",
    "metrics",
    "metrica",
    "evaluación",
    "calidad",
    "optimización",
    "sistema",
    "componente",
    "integración",
    "pipeline",
    "api",
    "repositorio",
    "adaptador",
    "dominio",
    "infraestructura",
];

static TERM_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn term_patterns() -> &'static [Regex] {
    TERM_PATTERNS.get_or_init(|| {
        TECHNICAL_TERMS
            .iter()
            .map(|term| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).unwrap())
            .collect()
    })
}

static PUNCTUATION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn punctuation_pattern() -> &'static Regex {
    PUNCTUATION_PATTERN.get_or_init(|| Regex::new(r"[.,;]").unwrap())
}

fn length_score(total_length: usize) -> f64 {
    if total_length <= SIMPLE_MAX_LENGTH {
        0.0
    } else if total_length <= MODERATE_MAX_LENGTH {
        0.5
    } else {
        1.0
    }
}

fn technical_density_score(combined_lower: &str) -> f64 {
    let count = term_patterns()
        .iter()
        .filter(|re| re.is_match(combined_lower))
        .count();
    (0.5 * count as f64).min(1.0)
}

fn structure_score(combined_lower: &str) -> f64 {
    let count = punctuation_pattern().find_iter(combined_lower).count();
    (0.1 * count as f64).min(1.0)
}

fn context_score(context: &str) -> f64 {
    if context.trim().is_empty() {
        0.0
    } else {
        1.0
    }
}

/// Classifies `(idea, context)` into a `ComplexityLevel`. `None`
/// inputs fail with `VALIDATION`, matching spec.md §4.4's "None or
/// non-string inputs fail" rule.
pub fn analyze(idea: Option<&str>, context: Option<&str>) -> Result<ComplexityLevel> {
    let idea = idea.ok_or_else(|| DomainError::validation("idea must be a string"))?;
    let context = context.unwrap_or("");

    let total_length = idea.chars().count() + context.chars().count();
    let combined_lower = format!("{idea} {context}").to_lowercase();

    if total_length > AUTO_COMPLEX_LENGTH {
        return Ok(ComplexityLevel::Complex);
    }

    let score = LENGTH_WEIGHT * length_score(total_length)
        + TECHNICAL_WEIGHT * technical_density_score(&combined_lower)
        + STRUCTURE_WEIGHT * structure_score(&combined_lower)
        + CONTEXT_WEIGHT * context_score(context);

    Ok(if score < SIMPLE_MAX_SCORE {
        ComplexityLevel::Simple
    } else if score < MODERATE_MAX_SCORE {
        ComplexityLevel::Moderate
    } else {
        ComplexityLevel::Complex
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_idea_fails_validation() {
        let result = analyze(None, Some(""));
        assert!(result.is_err());
    }

    #[test]
    fn length_exactly_300_is_not_auto_complex() {
        // 300 does not exceed AUTO_COMPLEX_LENGTH (the bypass is strictly
        // "> 300"), so this falls through to the weighted score: length
        // alone contributes 0.4*1.0 = 0.4, landing in the MODERATE band.
        let idea = "a".repeat(300);
        let level = analyze(Some(&idea), Some("")).unwrap();
        assert_eq!(level, ComplexityLevel::Moderate);
    }

    #[test]
    fn length_301_is_auto_complex() {
        let idea = "a".repeat(301);
        let level = analyze(Some(&idea), Some("")).unwrap();
        assert_eq!(level, ComplexityLevel::Complex);
    }

    #[test]
    fn technical_term_does_not_match_inside_other_words() {
        // "capacity" must not trigger the "api" technical term.
        let score = technical_density_score("the capacity of the system");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn spanish_review_with_one_technical_term_is_moderate() {
        // spec.md §8 scenario 5: moderate length plus one technical term.
        let level = analyze(
            Some("haz una revisión detallada y completa del sistema de autenticación"),
            Some(""),
        )
        .unwrap();
        assert_eq!(level, ComplexityLevel::Moderate);
    }

    #[test]
    fn short_plain_text_is_simple() {
        let level = analyze(Some("hello"), Some("")).unwrap();
        assert_eq!(level, ComplexityLevel::Simple);
    }

    #[test]
    fn complexity_is_pure_and_deterministic() {
        let a = analyze(Some("write a parser"), Some("for JSON")).unwrap();
        let b = analyze(Some("write a parser"), Some("for JSON")).unwrap();
        assert_eq!(a, b);
    }
}
