//! TF-IDF feature extraction with a fit-once vocabulary.
//!
//! The vectorizer is fitted exactly once, on training text only, and is
//! read-only afterwards: transforming held-out or live text never touches
//! the learned vocabulary or document-frequency statistics. Re-fitting would
//! silently invalidate every trained model (column indices change), so a
//! second `fit` is an error rather than a refit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenize;
use crate::error::{MailsiftError, Result};

/// Maximum number of vocabulary terms retained by the vectorizer.
pub const MAX_FEATURES: usize = 5000;

/// A sparse feature vector over a fixed-dimension feature space.
///
/// Only non-zero entries are stored; `indices` is strictly increasing and
/// parallel to `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Total dimension of the feature space.
    pub dim: usize,
    /// Column indices of the non-zero entries, strictly increasing.
    pub indices: Vec<usize>,
    /// Values of the non-zero entries.
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create an all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over `(column, value)` pairs of the non-zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense weight slice of length `dim`.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter().map(|(idx, value)| value * weights[idx]).sum()
    }

    /// Euclidean norm of the non-zero entries.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// TF-IDF vectorizer mapping normalized text into a fixed feature space.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> column index mapping.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    /// Cap on the vocabulary size.
    max_features: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("max_features", &self.max_features)
            .finish()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfVectorizer {
    /// Create a new, unfitted vectorizer with the default vocabulary cap.
    pub fn new() -> Self {
        Self::with_max_features(MAX_FEATURES)
    }

    /// Create a new, unfitted vectorizer with a custom vocabulary cap.
    pub fn with_max_features(max_features: usize) -> Self {
        TfIdfVectorizer {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            max_features,
        }
    }

    /// Whether the vectorizer has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Fit the vectorizer on normalized training documents.
    ///
    /// Builds the vocabulary (capped at `max_features` terms, kept by
    /// highest corpus term count with alphabetical tie-break) and the
    /// smoothed IDF statistics. Fitting twice is an error.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if self.is_fitted() {
            return Err(MailsiftError::vectorizer(
                "vectorizer is already fitted; re-fitting would invalidate trained models",
            ));
        }
        if documents.is_empty() {
            return Err(MailsiftError::vectorizer(
                "cannot fit on an empty document collection",
            ));
        }

        let mut term_count: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            for &token in &tokens {
                *term_count.entry(token).or_insert(0) += 1;
            }
            let unique: std::collections::HashSet<&str> = tokens.into_iter().collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        // Keep the most frequent terms; sort by descending corpus count with
        // alphabetical tie-break so column indices are deterministic.
        let mut terms: Vec<(&str, usize)> = term_count.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(self.max_features);

        // Assign columns in alphabetical term order.
        let mut kept: Vec<&str> = terms.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, term) in kept.into_iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
            // Smoothed IDF: ln((1 + n) / (1 + df)) + 1
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term.to_string(), idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = documents.len();

        Ok(())
    }

    /// Transform a normalized document into an L2-normalized TF-IDF vector.
    ///
    /// Read-only: learned state is never modified, and unknown terms are
    /// ignored. Transforming before fitting is an error.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(MailsiftError::vectorizer(
                "vectorizer must be fitted before transform",
            ));
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut entries {
                *value /= norm;
            }
        }

        let (indices, values) = entries.into_iter().unzip();
        Ok(SparseVector {
            dim: self.vocabulary.len(),
            indices,
            values,
        })
    }

    /// Transform a batch of normalized documents.
    pub fn transform_batch(&self, documents: &[String]) -> Result<Vec<SparseVector>> {
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}
