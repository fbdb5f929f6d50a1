//! Shared value types used across every crate in the workspace: opaque
//! identifiers, timestamps, and the small tagged-variant enums
//! (`IntentType`, `ComplexityLevel`, `FrameworkType`) that both the
//! API boundary and the domain layer need to name without depending
//! on `prompt-core`'s heavier types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic identifier type, used for prompt ids and request ids.
pub type Id = Uuid;

pub fn new_id() -> Id {
    Uuid::new_v4()
}

pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

pub fn default_true() -> bool {
    true
}

/// `GENERATE | DEBUG | REFACTOR | EXPLAIN` per spec.md §3/§4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentType {
    Generate,
    Debug,
    Refactor,
    Explain,
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntentType::Generate => "GENERATE",
            IntentType::Debug => "DEBUG",
            IntentType::Refactor => "REFACTOR",
            IntentType::Explain => "EXPLAIN",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for IntentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GENERATE" => Ok(IntentType::Generate),
            "DEBUG" => Ok(IntentType::Debug),
            "REFACTOR" => Ok(IntentType::Refactor),
            "EXPLAIN" => Ok(IntentType::Explain),
            other => Err(format!("unrecognized intent type: {other}")),
        }
    }
}

/// `SIMPLE | MODERATE | COMPLEX` per spec.md §3/§4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplexityLevel::Simple => "SIMPLE",
            ComplexityLevel::Moderate => "MODERATE",
            ComplexityLevel::Complex => "COMPLEX",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ComplexityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SIMPLE" => Ok(ComplexityLevel::Simple),
            "MODERATE" => Ok(ComplexityLevel::Moderate),
            "COMPLEX" => Ok(ComplexityLevel::Complex),
            other => Err(format!("unrecognized complexity level: {other}")),
        }
    }
}

/// Prompting framework used by a generated prompt. Grounded in
/// `original_source/hemdov/domain/metrics/dimensions.py`; unrecognized
/// framework strings are mapped to `ChainOfThought` with a logged
/// warning (spec.md §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkType {
    ChainOfThought,
    TreeOfThoughts,
    Decomposition,
    RolePlaying,
}

impl std::fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FrameworkType::ChainOfThought => "chain-of-thought",
            FrameworkType::TreeOfThoughts => "tree-of-thoughts",
            FrameworkType::Decomposition => "decomposition",
            FrameworkType::RolePlaying => "role-playing",
        };
        write!(f, "{s}")
    }
}

impl FrameworkType {
    /// Never fails: unrecognized strings fall back to `ChainOfThought`.
    /// Callers that want to log the fallback should compare the input
    /// against `Self::recognized()` first.
    pub fn from_str_lenient(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "chain-of-thought" => FrameworkType::ChainOfThought,
            "tree-of-thoughts" => FrameworkType::TreeOfThoughts,
            "decomposition" => FrameworkType::Decomposition,
            "role-playing" => FrameworkType::RolePlaying,
            _ => FrameworkType::ChainOfThought,
        }
    }

    pub fn recognized() -> &'static [&'static str] {
        &[
            "chain-of-thought",
            "tree-of-thoughts",
            "decomposition",
            "role-playing",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_framework_falls_back_to_chain_of_thought() {
        assert_eq!(
            FrameworkType::from_str_lenient("something-else"),
            FrameworkType::ChainOfThought
        );
    }

    #[test]
    fn intent_type_round_trips_through_display_and_from_str() {
        for variant in [
            IntentType::Generate,
            IntentType::Debug,
            IntentType::Refactor,
            IntentType::Explain,
        ] {
            let parsed: IntentType = variant.to_string().parse().unwrap();
            assert_eq!(parsed, variant);
        }
    }
}
