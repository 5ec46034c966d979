//! Multinomial naive Bayes classifier.
//!
//! Works on non-negative feature weights (TF-IDF here), with Laplace
//! smoothing and all scoring done in log space.

use serde::{Deserialize, Serialize};

use crate::error::{MailsiftError, Result};
use crate::features::SparseVector;
use crate::model::{Classifier, ClassProbabilities, Label, softmax2};

/// Multinomial generative classifier over TF-IDF features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Laplace smoothing strength.
    alpha: f64,
    /// Log prior per class, indexed by `Label::index()`.
    class_log_prior: Vec<f64>,
    /// Log likelihood per class and feature column.
    feature_log_prob: Vec<Vec<f64>>,
    /// Feature dimension the model was fitted on.
    n_features: usize,
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new()
    }
}

impl MultinomialNb {
    /// Create an unfitted classifier with the default smoothing (alpha = 1).
    pub fn new() -> Self {
        Self::with_alpha(1.0)
    }

    /// Create an unfitted classifier with a custom smoothing strength.
    pub fn with_alpha(alpha: f64) -> Self {
        MultinomialNb {
            alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
            n_features: 0,
        }
    }
}

impl Classifier for MultinomialNb {
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(MailsiftError::training(
                "naive Bayes requires a non-empty feature/label set of equal length",
            ));
        }
        let n_features = features[0].dim;
        let n_samples = features.len() as f64;

        let mut class_counts = [0usize; 2];
        let mut feature_sums = vec![vec![0.0f64; n_features]; 2];

        for (x, &y) in features.iter().zip(labels) {
            let class = y.index();
            class_counts[class] += 1;
            for (idx, value) in x.iter() {
                feature_sums[class][idx] += value;
            }
        }

        let mut class_log_prior = Vec::with_capacity(2);
        let mut feature_log_prob = Vec::with_capacity(2);
        for class in 0..2 {
            class_log_prior.push((class_counts[class] as f64 / n_samples).ln());

            let total: f64 = feature_sums[class].iter().sum();
            let denom = total + self.alpha * n_features as f64;
            let log_probs = feature_sums[class]
                .iter()
                .map(|&sum| ((sum + self.alpha) / denom).ln())
                .collect();
            feature_log_prob.push(log_probs);
        }

        self.class_log_prior = class_log_prior;
        self.feature_log_prob = feature_log_prob;
        self.n_features = n_features;
        Ok(())
    }

    fn predict_proba(&self, features: &SparseVector) -> Result<ClassProbabilities> {
        if !self.is_trained() {
            return Err(MailsiftError::training("naive Bayes model is not fitted"));
        }

        let mut joint = [0.0f64; 2];
        for class in 0..2 {
            let mut log_likelihood = self.class_log_prior[class];
            for (idx, value) in features.iter() {
                if idx < self.n_features {
                    log_likelihood += value * self.feature_log_prob[class][idx];
                }
            }
            joint[class] = log_likelihood;
        }

        Ok(softmax2(joint[0], joint[1]))
    }

    fn is_trained(&self) -> bool {
        !self.class_log_prior.is_empty()
    }

    fn name(&self) -> &'static str {
        "naive_bayes"
    }
}
