//! Vectorizer (spec.md §4.2): text → numeric vector. Two modes share
//! one contract — `bigram` (implemented here, grounded in
//! `original_source/hemdov/domain/services/knn_provider.py`'s
//! `FixedVocabularyVectorizer`) and `embedding` (declared per
//! spec.md's scope note but left as an external collaborator — the
//! embedding provider itself is explicitly out of scope).

/// `"bigram"` or `"embedding"` per spec.md §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorizerMode {
    Bigram,
    Embedding,
}

impl VectorizerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorizerMode::Bigram => "bigram",
            VectorizerMode::Embedding => "embedding",
        }
    }
}

/// A dense vector of fixed dimensionality.
pub type Vector = Vec<f64>;

/// Character-bigram vectorizer with a fixed, insertion-ordered
/// vocabulary. Once fit, the vocabulary never changes (spec.md §3's
/// invariant on `Vectorizer State`).
#[derive(Debug, Clone, Default)]
pub struct BigramVectorizer {
    vocabulary: Vec<String>,
}

fn lowercase_bigrams(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    if chars.len() < 2 {
        return Vec::new();
    }
    chars
        .windows(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect()
}

impl BigramVectorizer {
    pub fn mode(&self) -> VectorizerMode {
        VectorizerMode::Bigram
    }

    pub fn is_fit(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Builds the vocabulary as the union of bigrams across the
    /// corpus, in insertion order of first sight (spec.md §4.2).
    pub fn fit(&mut self, texts: &[String]) -> &mut Self {
        let mut seen = std::collections::HashSet::new();
        let mut vocabulary = Vec::new();
        for text in texts {
            for bigram in lowercase_bigrams(text) {
                if seen.insert(bigram.clone()) {
                    vocabulary.push(bigram);
                }
            }
        }
        self.vocabulary = vocabulary;
        self
    }

    /// Counts bigrams over the fixed vocabulary, then L1-normalizes;
    /// if the count sum is zero the vector is left as zeros (spec.md
    /// §4.2).
    pub fn transform(&self, texts: &[String]) -> Vec<Vector> {
        texts
            .iter()
            .map(|text| {
                let bigrams = lowercase_bigrams(text);
                let mut counts: std::collections::HashMap<&str, f64> =
                    std::collections::HashMap::new();
                for bigram in &bigrams {
                    *counts.entry(bigram.as_str()).or_insert(0.0) += 1.0;
                }
                let raw: Vec<f64> = self
                    .vocabulary
                    .iter()
                    .map(|term| *counts.get(term.as_str()).unwrap_or(&0.0))
                    .collect();
                let total: f64 = raw.iter().sum();
                if total > 0.0 {
                    raw.into_iter().map(|v| v / total).collect()
                } else {
                    raw
                }
            })
            .collect()
    }

    pub fn fit_transform(&mut self, texts: &[String]) -> Vec<Vector> {
        self.fit(texts);
        self.transform(texts)
    }

    /// Equivalent to `transform`, fitting first if not yet fit
    /// (spec.md §4.2's `__call__` contract).
    pub fn call(&mut self, texts: &[String]) -> Vec<Vector> {
        if !self.is_fit() {
            self.fit_transform(texts)
        } else {
            self.transform(texts)
        }
    }
}

/// `(A . B) / (|A| * |B|)`; zero-norm rows are mapped to 0.0 rather
/// than NaN (spec.md §4.3).
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

pub fn contains_non_finite(vector: &[f64]) -> bool {
    vector.iter().any(|v| !v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_transform_is_deterministic() {
        let texts = vec!["hello world".to_string(), "goodbye world".to_string()];
        let mut v1 = BigramVectorizer::default();
        let mut v2 = BigramVectorizer::default();
        assert_eq!(v1.fit_transform(&texts), v2.fit_transform(&texts));
    }

    #[test]
    fn transform_l1_normalizes_rows() {
        let texts = vec!["aabb".to_string()];
        let mut v = BigramVectorizer::default();
        let vectors = v.fit_transform(&texts);
        let sum: f64 = vectors[0].iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let texts = vec!["ab".to_string(), "".to_string()];
        let mut v = BigramVectorizer::default();
        let vectors = v.fit_transform(&texts);
        assert!(vectors[1].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        let zero = vec![0.0, 0.0];
        let nonzero = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &nonzero), 0.0);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }
}
