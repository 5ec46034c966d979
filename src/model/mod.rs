//! Classification models for spam filtering.
//!
//! The model set is closed by design: exactly three classifiers, selected
//! through [`ModelKind`] and used through the uniform [`Classifier`] trait.

pub mod linear_svm;
pub mod naive_bayes;
pub mod neural_net;

pub use linear_svm::LinearSvm;
pub use naive_bayes::MultinomialNb;
pub use neural_net::MlpClassifier;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::SparseVector;

/// Binary message label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Legitimate message, encoded as class 0.
    Ham,
    /// Unsolicited message, encoded as class 1.
    Spam,
}

impl Label {
    /// Class index used by the models (ham = 0, spam = 1).
    pub fn index(self) -> usize {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }

    /// Label for a class index.
    pub fn from_index(index: usize) -> Label {
        if index == 1 { Label::Spam } else { Label::Ham }
    }

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Parse a canonical label name. Case-sensitive: only the exact
    /// strings `"ham"` and `"spam"` are accepted.
    pub fn parse(s: &str) -> Option<Label> {
        match s {
            "ham" => Some(Label::Ham),
            "spam" => Some(Label::Spam),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three model kinds supported by the classifier.
///
/// This set is fixed by design, not user-extensible, so it is a closed enum
/// rather than an open registry of dynamic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    NaiveBayes,
    Svm,
    NeuralNetwork,
}

impl ModelKind {
    /// All model kinds, in canonical order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::NaiveBayes,
        ModelKind::Svm,
        ModelKind::NeuralNetwork,
    ];

    /// Canonical wire name of this model kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::Svm => "svm",
            ModelKind::NeuralNetwork => "neural_network",
        }
    }

    /// Parse a wire name into a model kind.
    pub fn parse(s: &str) -> Option<ModelKind> {
        match s {
            "naive_bayes" => Some(ModelKind::NaiveBayes),
            "svm" => Some(ModelKind::Svm),
            "neural_network" => Some(ModelKind::NeuralNetwork),
            _ => None,
        }
    }

    /// File name of the persisted artifact for this model kind.
    pub fn artifact_name(self) -> String {
        format!("{}_model.json", self.as_str())
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Posterior probabilities over the two classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub ham: f64,
    pub spam: f64,
}

impl ClassProbabilities {
    /// Build from raw per-class values, renormalizing so they sum to one.
    pub fn from_scores(ham: f64, spam: f64) -> Self {
        let total = ham + spam;
        if total > 0.0 && total.is_finite() {
            ClassProbabilities {
                ham: ham / total,
                spam: spam / total,
            }
        } else {
            ClassProbabilities { ham: 0.5, spam: 0.5 }
        }
    }

    /// Predicted label: the class with the higher posterior.
    ///
    /// An exact tie at 0.5/0.5 resolves to ham; a message is only called
    /// spam when its spam probability is strictly greater.
    pub fn label(&self) -> Label {
        if self.spam > self.ham {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.ham.max(self.spam)
    }
}

/// Uniform interface over the three classifier implementations.
///
/// A classifier is fitted once against a fixed feature/label training set
/// and is immutable afterwards; retraining replaces it wholesale.
pub trait Classifier: Send + Sync {
    /// Fit the classifier on training features and labels.
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()>;

    /// Posterior class probabilities for a single feature vector.
    fn predict_proba(&self, features: &SparseVector) -> Result<ClassProbabilities>;

    /// Whether the classifier has been fitted.
    fn is_trained(&self) -> bool;

    /// Get the name of this classifier (for debugging and reports).
    fn name(&self) -> &'static str;

    /// Predicted label for a single feature vector.
    fn predict(&self, features: &SparseVector) -> Result<Label> {
        Ok(self.predict_proba(features)?.label())
    }
}

/// Fraction of exact label matches over an evaluation set.
pub fn accuracy(
    classifier: &dyn Classifier,
    features: &[SparseVector],
    labels: &[Label],
) -> Result<f64> {
    if features.is_empty() {
        return Ok(0.0);
    }
    let mut hits = 0usize;
    for (x, &y) in features.iter().zip(labels) {
        if classifier.predict(x)? == y {
            hits += 1;
        }
    }
    Ok(hits as f64 / features.len() as f64)
}

/// Numerically stable logistic sigmoid.
pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Softmax over two log-scores, stabilized by subtracting the max.
pub(crate) fn softmax2(log_ham: f64, log_spam: f64) -> ClassProbabilities {
    let max = log_ham.max(log_spam);
    let e_ham = (log_ham - max).exp();
    let e_spam = (log_spam - max).exp();
    ClassProbabilities::from_scores(e_ham, e_spam)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(Label::Ham.index(), 0);
        assert_eq!(Label::Spam.index(), 1);
        assert_eq!(Label::from_index(0), Label::Ham);
        assert_eq!(Label::from_index(1), Label::Spam);
        assert_eq!(Label::parse("ham"), Some(Label::Ham));
        assert_eq!(Label::parse("spam"), Some(Label::Spam));
        // Case-sensitive on the canonical names.
        assert_eq!(Label::parse("Ham"), None);
        assert_eq!(Label::parse("SPAM"), None);
    }

    #[test]
    fn test_model_kind_names() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ModelKind::parse("gradient_boost"), None);
        assert_eq!(
            ModelKind::NaiveBayes.artifact_name(),
            "naive_bayes_model.json"
        );
    }

    #[test]
    fn test_tie_breaks_to_ham() {
        let probs = ClassProbabilities { ham: 0.5, spam: 0.5 };
        assert_eq!(probs.label(), Label::Ham);
        assert_eq!(probs.confidence(), 0.5);

        let probs = ClassProbabilities::from_scores(1.0, 1.0 + 1e-9);
        assert_eq!(probs.label(), Label::Spam);
    }

    #[test]
    fn test_sigmoid_extremes() {
        assert!(sigmoid(100.0) > 0.999_999);
        assert!(sigmoid(-100.0) < 1e-6);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_softmax2_normalizes() {
        let probs = softmax2(-1000.0, -999.0);
        assert!((probs.ham + probs.spam - 1.0).abs() < 1e-12);
        assert!(probs.spam > probs.ham);
    }
}
