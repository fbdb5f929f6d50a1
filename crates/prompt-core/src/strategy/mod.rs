//! Strategy Family and Selector (spec.md §4.6). Four strategy variants
//! share the `Strategy` contract; the `Selector` routes a request to
//! one of them based on legacy-vs-NLaC mode and, in legacy mode, the
//! complexity level. Grounded in
//! `original_source/eval/src/strategies/{base,simple,moderate,complex}.py`
//! and `strategy_selector.py`.

pub mod base;
pub mod complex;
pub mod moderate;
pub mod nlac;
pub mod simple;
mod selector;

pub use complex::ComplexStrategy;
pub use moderate::ModerateStrategy;
pub use nlac::{NlacBuilder, NlacStrategy};
pub use selector::{DegradationFlags, SelectorMode, Selector, SharedLlmClient};
pub use simple::SimpleStrategy;

use prompt_types::Result;

use crate::domain::Prediction;

/// Shared contract for every strategy (spec.md §4.6).
pub trait Strategy {
    fn name(&self) -> &'static str;
    fn improve(&self, original_idea: &str, context: &str) -> Result<Prediction>;
}

/// Rejects inputs that are effectively empty once trimmed, mirroring
/// the original's `_validate_inputs` non-None/non-empty check.
pub(crate) fn validate_inputs(original_idea: &str) -> Result<()> {
    if original_idea.trim().is_empty() {
        return Err(prompt_types::DomainError::validation(
            "original_idea must be a non-empty string",
        ));
    }
    Ok(())
}
