//! Linear maximum-margin classifier with calibrated probabilities.
//!
//! Training minimizes the L2-regularized hinge loss with Pegasos-style SGD,
//! then fits a Platt sigmoid on the training decision values so the model
//! can report class probabilities alongside the margin decision.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{MailsiftError, Result};
use crate::features::SparseVector;
use crate::model::{Classifier, ClassProbabilities, Label, sigmoid};

/// Linear SVM trained with SGD on hinge loss, plus Platt scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    /// Inverse regularization strength.
    c: f64,
    /// Number of passes over the training set.
    epochs: usize,
    /// Seed for the per-epoch sample shuffle.
    seed: u64,
    /// Weight per feature column.
    weights: Vec<f64>,
    /// Bias term.
    bias: f64,
    /// Platt sigmoid slope.
    platt_a: f64,
    /// Platt sigmoid intercept.
    platt_b: f64,
    trained: bool,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvm {
    /// Create an unfitted SVM with C = 1.0 and the fixed training seed.
    pub fn new() -> Self {
        LinearSvm {
            c: 1.0,
            epochs: 30,
            seed: 42,
            weights: Vec::new(),
            bias: 0.0,
            platt_a: 1.0,
            platt_b: 0.0,
            trained: false,
        }
    }

    /// Raw margin decision value for a feature vector. Columns beyond the
    /// fitted width contribute nothing, same as the other models.
    pub fn decision_function(&self, features: &SparseVector) -> f64 {
        let mut decision = self.bias;
        for (idx, value) in features.iter() {
            if idx < self.weights.len() {
                decision += value * self.weights[idx];
            }
        }
        decision
    }

    /// Fit the Platt sigmoid `p(spam) = sigmoid(a * f + b)` on decision
    /// values from the training set, using Platt's smoothed targets.
    fn fit_platt(&mut self, decisions: &[f64], labels: &[Label]) {
        let n_spam = labels.iter().filter(|&&y| y == Label::Spam).count() as f64;
        let n_ham = labels.len() as f64 - n_spam;
        let target_spam = (n_spam + 1.0) / (n_spam + 2.0);
        let target_ham = 1.0 / (n_ham + 2.0);

        let mut a = 1.0f64;
        let mut b = 0.0f64;
        let lr = 0.05;
        let n = decisions.len() as f64;

        for _ in 0..300 {
            let mut grad_a = 0.0;
            let mut grad_b = 0.0;
            for (&f, &y) in decisions.iter().zip(labels) {
                let target = if y == Label::Spam { target_spam } else { target_ham };
                let p = sigmoid(a * f + b);
                grad_a += (p - target) * f;
                grad_b += p - target;
            }
            a -= lr * grad_a / n;
            b -= lr * grad_b / n;
        }

        self.platt_a = a;
        self.platt_b = b;
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(MailsiftError::training(
                "SVM requires a non-empty feature/label set of equal length",
            ));
        }

        let n_features = features[0].dim;
        let n_samples = features.len();
        let lambda = 1.0 / (self.c * n_samples as f64);

        // Hinge-loss targets: spam = +1, ham = -1.
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y == Label::Spam { 1.0 } else { -1.0 })
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_samples).collect();

        // Weights are kept as `scale * raw` so the per-step L2 shrink is a
        // scalar multiply instead of a pass over every column.
        let mut raw = vec![0.0f64; n_features];
        let mut scale = 1.0f64;
        let mut bias = 0.0f64;
        let mut t = 1.0f64;

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                t += 1.0;
                let eta = 1.0 / (lambda * t);
                let x = &features[i];
                let y = targets[i];

                let margin = y * (scale * x.dot(&raw) + bias);
                scale *= 1.0 - eta * lambda;
                if margin < 1.0 {
                    for (idx, value) in x.iter() {
                        raw[idx] += eta * y * value / scale;
                    }
                    bias += eta * y;
                }
            }
        }

        let weights: Vec<f64> = raw.into_iter().map(|w| w * scale).collect();
        self.weights = weights;
        self.bias = bias;
        self.trained = true;

        let decisions: Vec<f64> = features.iter().map(|x| self.decision_function(x)).collect();
        self.fit_platt(&decisions, labels);

        Ok(())
    }

    fn predict_proba(&self, features: &SparseVector) -> Result<ClassProbabilities> {
        if !self.is_trained() {
            return Err(MailsiftError::training("SVM model is not fitted"));
        }

        let decision = self.decision_function(features);
        let spam = sigmoid(self.platt_a * decision + self.platt_b);
        Ok(ClassProbabilities {
            ham: 1.0 - spam,
            spam,
        })
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn name(&self) -> &'static str {
        "svm"
    }
}
