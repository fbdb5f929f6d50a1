//! KNN Few-Shot Retrieval Engine (spec.md §4.3). Grounded in
//! `original_source/hemdov/domain/services/knn_provider.py`'s
//! `KNNProvider`. The vectorizer and catalog vector matrix are built
//! once at construction and shared read-only thereafter (spec.md §5).

use prompt_types::{ComplexityLevel, DomainError, IntentType, Result};
use tracing::{error, warn};

use crate::catalog::{build_catalog, CatalogSource};
use crate::domain::{Catalog, FewShotExample};
use crate::vectorizer::{cosine_similarity, contains_non_finite, BigramVectorizer, Vector};

/// `< 5%` invalid: warn. `5% ..= 20%`: log ERROR labeled "quality
/// degradation". `>= 20%`, or zero valid examples: fail with
/// `DATA_CORRUPTION` (spec.md §4.3).
const WARN_SKIP_RATE: f64 = 0.05;
const FAIL_SKIP_RATE: f64 = 0.20;

pub const MIN_SIMILARITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_K: usize = 3;

/// Diagnostics returned by `find_examples_with_metadata`.
#[derive(Debug, Clone)]
pub struct FindExamplesMetadata {
    pub highest_similarity: f64,
    pub total_candidates: usize,
    pub met_threshold: usize,
    pub empty: bool,
}

pub struct KnnProvider {
    catalog: Catalog,
    vectorizer: BigramVectorizer,
    catalog_vectors: Vec<Vector>,
    k: usize,
}

impl KnnProvider {
    /// Loads the catalog via `source`, applies the skip-rate policy,
    /// fits the vectorizer, and precomputes catalog vectors.
    pub fn new(source: &dyn CatalogSource, k: usize) -> Result<Self> {
        let raw = source.load_catalog()?;
        let (catalog, stats) = build_catalog(raw);

        if stats.total == 0 || catalog.is_empty() {
            return Err(DomainError::data_corruption(
                "catalog contains zero valid examples",
                prompt_types::error::ids::DATA_CORRUPTION_CATALOG,
            ));
        }

        let skip_rate = stats.skip_rate();
        if skip_rate >= FAIL_SKIP_RATE {
            return Err(DomainError::data_corruption(
                format!(
                    "catalog skip rate {:.1}% exceeds the {:.0}% failure threshold",
                    skip_rate * 100.0,
                    FAIL_SKIP_RATE * 100.0
                ),
                prompt_types::error::ids::DATA_CORRUPTION_CATALOG,
            )
            .with_context("skip_rate", skip_rate.to_string()));
        } else if skip_rate >= WARN_SKIP_RATE {
            error!(
                skip_rate = skip_rate,
                skipped = stats.skipped,
                total = stats.total,
                "quality degradation: catalog skip rate between 5% and 20%"
            );
        } else if stats.skipped > 0 {
            warn!(
                skip_rate = skip_rate,
                skipped = stats.skipped,
                total = stats.total,
                "catalog load skipped some invalid examples"
            );
        }

        let mut vectorizer = BigramVectorizer::default();
        let texts: Vec<String> = catalog
            .exemplars()
            .iter()
            .map(|e| e.input_idea.clone())
            .collect();
        let catalog_vectors = vectorizer.fit_transform(&texts);

        Ok(Self {
            catalog,
            vectorizer,
            catalog_vectors,
            k: if k == 0 { DEFAULT_K } else { k },
        })
    }

    fn validate_query(intent: &str, complexity: &str) -> Result<()> {
        intent
            .parse::<IntentType>()
            .map_err(DomainError::validation)?;
        complexity
            .parse::<ComplexityLevel>()
            .map_err(DomainError::validation)?;
        Ok(())
    }

    /// Returns up to `k` relevant exemplars (spec.md §4.3).
    pub fn find_examples(
        &self,
        intent: &str,
        complexity: &str,
        k: Option<usize>,
        has_expected_output: bool,
        user_input: Option<&str>,
        min_similarity: Option<f64>,
    ) -> Result<Vec<FewShotExample>> {
        let (examples, _) = self.find_examples_with_metadata(
            intent,
            complexity,
            k,
            has_expected_output,
            user_input,
            min_similarity,
        )?;
        Ok(examples)
    }

    pub fn find_examples_with_metadata(
        &self,
        intent: &str,
        complexity: &str,
        k: Option<usize>,
        has_expected_output: bool,
        user_input: Option<&str>,
        min_similarity: Option<f64>,
    ) -> Result<(Vec<FewShotExample>, FindExamplesMetadata)> {
        Self::validate_query(intent, complexity)?;

        let k = k.unwrap_or(self.k);
        let min_similarity = min_similarity.unwrap_or(MIN_SIMILARITY_THRESHOLD);

        let all_exemplars = self.catalog.exemplars();
        let filtered_indices: Vec<usize> = if has_expected_output {
            all_exemplars
                .iter()
                .enumerate()
                .filter(|(_, e)| e.expected_output.is_some())
                .map(|(i, _)| i)
                .collect()
        } else {
            (0..all_exemplars.len()).collect()
        };

        if filtered_indices.is_empty() {
            return Ok((
                Vec::new(),
                FindExamplesMetadata {
                    highest_similarity: 0.0,
                    total_candidates: 0,
                    met_threshold: 0,
                    empty: true,
                },
            ));
        }

        let mut query_parts = vec![intent.to_string(), complexity.to_string()];
        if let Some(input) = user_input {
            let trimmed = input.trim();
            if !trimmed.is_empty() {
                query_parts.push(trimmed.to_string());
            }
        }
        let query_text = query_parts.join(" ");

        let mut scratch_vectorizer = self.vectorizer.clone();
        let query_vector = scratch_vectorizer.transform(&[query_text]).remove(0);

        if contains_non_finite(&query_vector) {
            return Err(DomainError::validation(
                "query vector contains NaN or infinite values",
            ));
        }

        let mut similarities: Vec<(usize, f64)> = filtered_indices
            .iter()
            .map(|&idx| {
                let vector: &Vector = &self.catalog_vectors[idx];
                if contains_non_finite(vector) {
                    (idx, f64::NAN)
                } else {
                    (idx, cosine_similarity(vector, &query_vector))
                }
            })
            .collect();

        if similarities.iter().any(|(_, s)| s.is_nan()) {
            return Err(DomainError::validation(
                "candidate vector contains NaN or infinite values",
            ));
        }

        let highest_similarity = similarities
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::MIN, f64::max);

        similarities.retain(|(_, s)| *s >= min_similarity);
        let met_threshold = similarities.len();

        if similarities.is_empty() {
            warn!(
                highest_similarity = highest_similarity,
                min_similarity = min_similarity,
                "no catalog examples met the similarity threshold"
            );
            return Ok((
                Vec::new(),
                FindExamplesMetadata {
                    highest_similarity,
                    total_candidates: filtered_indices.len(),
                    met_threshold: 0,
                    empty: true,
                },
            ));
        }

        similarities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        similarities.truncate(k);

        let results = similarities
            .iter()
            .map(|(idx, score)| FewShotExample::from_exemplar(&all_exemplars[*idx], *score))
            .collect();

        Ok((
            results,
            FindExamplesMetadata {
                highest_similarity,
                total_candidates: filtered_indices.len(),
                met_threshold,
                empty: false,
            },
        ))
    }
}
