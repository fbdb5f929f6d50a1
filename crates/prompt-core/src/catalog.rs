//! Catalog Repository contract (spec.md §4.1). The repository itself
//! is pure I/O and lives in `prompt-infra`; this module defines the
//! trait it implements plus the catalog-construction/validation logic
//! that stays in the domain layer (deserializing raw JSON into
//! `Exemplar`s and applying the skip-rate policy in the KNN Provider).

use prompt_types::Result;
use serde_json::Value;

use crate::domain::{Catalog, CatalogLoadStats, Exemplar};

/// Implemented by infrastructure. Returns either the wrapped
/// (`{"examples": [...]}`) or bare-list JSON shape already unwrapped
/// into a flat array of raw exemplar values — no domain validation
/// happens at this layer (spec.md §4.1).
pub trait CatalogSource {
    fn load_catalog(&self) -> Result<Vec<Value>>;
}

/// Deserializes raw JSON values into `Exemplar`s and builds a
/// `Catalog`, skipping entries that fail to parse or that are missing
/// `input_idea`/`improved_prompt` (spec.md §3).
pub fn build_catalog(raw: Vec<Value>) -> (Catalog, CatalogLoadStats) {
    let total = raw.len();
    let mut entries = Vec::with_capacity(total);
    let mut parse_failures = 0usize;

    for value in raw {
        match serde_json::from_value::<Exemplar>(value) {
            Ok(exemplar) => entries.push(exemplar),
            Err(_) => parse_failures += 1,
        }
    }

    let (catalog, mut stats) = Catalog::from_raw(entries);
    stats.skipped += parse_failures;
    stats.total = total;
    (catalog, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_catalog_skips_malformed_and_empty_entries() {
        let raw = vec![
            json!({"input_idea": "write a function", "improved_prompt": "a better version"}),
            json!({"input_idea": "", "improved_prompt": "a better version"}),
            json!({"not_an_exemplar": true}),
        ];
        let (catalog, stats) = build_catalog(raw);
        assert_eq!(catalog.len(), 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.skipped, 2);
    }
}
