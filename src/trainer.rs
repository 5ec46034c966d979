//! Batch training pipeline: stratified split, vectorizer fit, parallel
//! model fitting, and held-out evaluation.
//!
//! A training run either fully succeeds (a complete [`TrainedState`] plus a
//! [`TrainReport`]) or fails with no partial output; installing the result
//! into a registry is the caller's single atomic step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::Sample;
use crate::error::{MailsiftError, Result};
use crate::features::TfIdfVectorizer;
use crate::model::{
    Classifier, Label, LinearSvm, MlpClassifier, ModelKind, MultinomialNb, accuracy,
};

/// Fixed seed for the train/test shuffle.
const SPLIT_SEED: u64 = 42;

/// Fraction of samples held out for evaluation.
const TEST_RATIO: f64 = 0.2;

/// A complete set of trained artifacts: the fitted vectorizer plus all
/// three models. Constructed only by a fully successful training run, so a
/// value of this type is always internally consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedState {
    pub vectorizer: TfIdfVectorizer,
    pub naive_bayes: MultinomialNb,
    pub svm: LinearSvm,
    pub neural_network: MlpClassifier,
}

impl TrainedState {
    /// The classifier for a model kind.
    pub fn classifier(&self, kind: ModelKind) -> &dyn Classifier {
        match kind {
            ModelKind::NaiveBayes => &self.naive_bayes,
            ModelKind::Svm => &self.svm,
            ModelKind::NeuralNetwork => &self.neural_network,
        }
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    /// Held-out accuracy per model wire name.
    pub accuracies: HashMap<String, f64>,
    /// Samples in the training partition.
    pub training_samples: usize,
    /// Samples in the held-out partition.
    pub test_samples: usize,
    /// Ham samples in the full corpus.
    pub ham_samples: usize,
    /// Spam samples in the full corpus.
    pub spam_samples: usize,
    /// When the run finished.
    pub trained_at: DateTime<Utc>,
}

/// Deterministic label-stratified split into training and held-out index
/// sets. Both partitions preserve the overall ham/spam ratio within
/// rounding, and the result depends only on the input order and the seed.
fn stratified_split(samples: &[Sample]) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for label in [Label::Ham, Label::Spam] {
        let mut indices: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.label == label)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        let n_test = ((indices.len() as f64) * TEST_RATIO).round() as usize;
        test.extend(indices.drain(..n_test.min(indices.len())));
        train.extend(indices);
    }

    (train, test)
}

/// Train all three models on a labeled corpus.
///
/// The vectorizer is fitted on the training partition's text only, so
/// held-out text never influences the vocabulary or document-frequency
/// statistics. The three fits are independent and run in parallel; any
/// single failure fails the whole run and no partial state escapes.
pub fn train(samples: &[Sample]) -> Result<(TrainedState, TrainReport)> {
    let (train_idx, test_idx) = stratified_split(samples);
    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(MailsiftError::training(format!(
            "corpus of {} samples is too small to split into train and held-out partitions",
            samples.len()
        )));
    }

    let train_texts: Vec<String> = train_idx.iter().map(|&i| samples[i].text.clone()).collect();
    let train_labels: Vec<Label> = train_idx.iter().map(|&i| samples[i].label).collect();
    let test_texts: Vec<String> = test_idx.iter().map(|&i| samples[i].text.clone()).collect();
    let test_labels: Vec<Label> = test_idx.iter().map(|&i| samples[i].label).collect();

    let mut vectorizer = TfIdfVectorizer::new();
    vectorizer.fit(&train_texts)?;
    let train_features = vectorizer.transform_batch(&train_texts)?;
    let test_features = vectorizer.transform_batch(&test_texts)?;

    // The three fits are independent, so run them on worker threads.
    let (nb_result, (svm_result, mlp_result)) = rayon::join(
        || {
            let mut model = MultinomialNb::new();
            model.fit(&train_features, &train_labels)?;
            let acc = accuracy(&model, &test_features, &test_labels)?;
            Ok::<_, MailsiftError>((model, acc))
        },
        || {
            rayon::join(
                || {
                    let mut model = LinearSvm::new();
                    model.fit(&train_features, &train_labels)?;
                    let acc = accuracy(&model, &test_features, &test_labels)?;
                    Ok::<_, MailsiftError>((model, acc))
                },
                || {
                    let mut model = MlpClassifier::new();
                    model.fit(&train_features, &train_labels)?;
                    let acc = accuracy(&model, &test_features, &test_labels)?;
                    Ok::<_, MailsiftError>((model, acc))
                },
            )
        },
    );

    let (naive_bayes, nb_acc) = nb_result?;
    let (svm, svm_acc) = svm_result?;
    let (neural_network, mlp_acc) = mlp_result?;

    let state = TrainedState {
        vectorizer,
        naive_bayes,
        svm,
        neural_network,
    };

    let mut accuracies = HashMap::new();
    accuracies.insert(ModelKind::NaiveBayes.as_str().to_string(), nb_acc);
    accuracies.insert(ModelKind::Svm.as_str().to_string(), svm_acc);
    accuracies.insert(ModelKind::NeuralNetwork.as_str().to_string(), mlp_acc);

    let ham_samples = samples.iter().filter(|s| s.label == Label::Ham).count();
    let report = TrainReport {
        accuracies,
        training_samples: train_idx.len(),
        test_samples: test_idx.len(),
        ham_samples,
        spam_samples: samples.len() - ham_samples,
        trained_at: Utc::now(),
    };

    Ok((state, report))
}
