//! Classification service: the train / predict / health operations.
//!
//! [`ClassifierService`] is an explicitly owned object intended to be
//! shared behind an `Arc` by whatever request layer sits on top (CLI here,
//! an HTTP boundary elsewhere). Concurrency discipline:
//!
//! - the registry sits behind a `RwLock`; prediction takes read locks and
//!   is freely parallel, while installing a new trained state is one short
//!   write-lock swap, so readers never observe a half-replaced model set;
//! - a separate mutex serializes training runs against each other, and the
//!   long CPU-bound fit happens outside any registry lock.

use std::path::PathBuf;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::dataset;
use crate::error::{MailsiftError, Result};
use crate::model::{Label, ModelKind};
use crate::registry::ModelRegistry;
use crate::trainer::{self, TrainReport};

/// Configuration for the classification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding the persisted artifacts.
    pub model_dir: PathBuf,
    /// Prioritized candidate dataset paths; training uses the first one
    /// that parses.
    pub dataset_candidates: Vec<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            model_dir: PathBuf::from("./models"),
            dataset_candidates: vec![
                PathBuf::from("spam_dataset.txt"),
                PathBuf::from("enron_spam_data.csv"),
            ],
        }
    }
}

/// A single-model prediction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted label (class with the higher posterior; ties go to ham).
    pub label: Label,
    /// Probability of the predicted class.
    pub confidence: f64,
    pub spam_probability: f64,
    pub ham_probability: f64,
}

/// Outcome of a prediction request: either a prediction or a structured
/// reason it is unavailable. Never an error across the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictOutcome {
    Available { prediction: Prediction },
    Unavailable { reason: UnavailableReason },
}

/// Why a prediction could not be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No text was provided after concatenating subject and message.
    EmptyText,
    /// The registry is untrained and no persisted artifacts were found.
    NotTrained,
    /// The requested model name is not one of the three known models.
    UnknownModel,
}

impl UnavailableReason {
    pub fn message(self) -> &'static str {
        match self {
            UnavailableReason::EmptyText => "please provide some text to analyze",
            UnavailableReason::NotTrained => "models not trained; train models first",
            UnavailableReason::UnknownModel => "unknown model name",
        }
    }
}

/// Response of the predict operation: one payload per trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<(ModelKind, Prediction)>,
}

/// Response of the health operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthStatus {
    pub trained: bool,
}

/// Thread-safe classification service over a model registry.
pub struct ClassifierService {
    config: ServiceConfig,
    registry: RwLock<ModelRegistry>,
    /// Serializes training runs; prediction never takes this.
    train_lock: Mutex<()>,
}

impl ClassifierService {
    /// Create a service with an empty registry.
    pub fn new(config: ServiceConfig) -> Self {
        ClassifierService {
            config,
            registry: RwLock::new(ModelRegistry::new()),
            train_lock: Mutex::new(()),
        }
    }

    /// Create a service and attempt to load persisted artifacts, matching
    /// the startup behavior of a long-running process. Returns the service
    /// and whether artifacts were loaded.
    pub fn with_loaded(config: ServiceConfig) -> (Self, bool) {
        let service = Self::new(config);
        let loaded = service.try_load();
        (service, loaded)
    }

    /// Whether the registry currently holds trained models.
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            trained: self.registry.read().is_trained(),
        }
    }

    /// Train against the first parseable candidate dataset.
    ///
    /// On success the registry is replaced wholesale and the artifacts are
    /// persisted before returning. On failure the registry and any prior
    /// artifacts are untouched, and the error aggregates every candidate's
    /// failure.
    pub fn train(&self) -> Result<TrainReport> {
        let _guard = self.train_lock.lock();

        let mut failures = Vec::new();
        for candidate in &self.config.dataset_candidates {
            match self.train_with(candidate) {
                Ok(report) => return Ok(report),
                Err(e) => failures.push(format!("{}: {}", candidate.display(), e)),
            }
        }

        Err(MailsiftError::training(format!(
            "failed to train with any candidate dataset [{}]",
            failures.join("; ")
        )))
    }

    /// Train against one specific dataset path.
    pub fn train_on(&self, path: &std::path::Path) -> Result<TrainReport> {
        let _guard = self.train_lock.lock();
        self.train_with(path)
    }

    fn train_with(&self, path: &std::path::Path) -> Result<TrainReport> {
        let samples = dataset::load(path)?;
        // The long CPU-bound part runs without any registry lock held, so
        // concurrent predictions keep serving the previous state.
        let (state, report) = trainer::train(&samples)?;

        // Persist before the swap: if saving fails the registry still
        // holds the previous consistent state.
        let mut staged = ModelRegistry::new();
        staged.install(state);
        staged.save(&self.config.model_dir)?;

        let mut registry = self.registry.write();
        *registry = staged;
        Ok(report)
    }

    /// Predict on raw subject and message text with every trained model.
    ///
    /// Mirrors a request boundary: subject and message are concatenated
    /// with a single space, empty combined text is rejected, and persisted
    /// artifacts are auto-loaded on first use if the registry is empty.
    pub fn predict(&self, subject: &str, message: &str) -> std::result::Result<PredictResponse, UnavailableReason> {
        let text = format!("{} {}", subject, message);
        if text.trim().is_empty() {
            return Err(UnavailableReason::EmptyText);
        }

        let trained = self.registry.read().is_trained();
        if !trained && !self.try_load() {
            return Err(UnavailableReason::NotTrained);
        }

        let registry = self.registry.read();
        let Some(state) = registry.state() else {
            return Err(UnavailableReason::NotTrained);
        };

        let mut predictions = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            if let PredictOutcome::Available { prediction } = predict_with(state, &text, kind) {
                predictions.push((kind, prediction));
            }
        }
        Ok(PredictResponse { predictions })
    }

    /// Predict with one named model. Blank text, unknown names and an
    /// untrained registry produce structured unavailable outcomes, never
    /// errors.
    pub fn predict_one(&self, text: &str, model_name: &str) -> PredictOutcome {
        if text.trim().is_empty() {
            return PredictOutcome::Unavailable {
                reason: UnavailableReason::EmptyText,
            };
        }

        let Some(kind) = ModelKind::parse(model_name) else {
            return PredictOutcome::Unavailable {
                reason: UnavailableReason::UnknownModel,
            };
        };

        let trained = self.registry.read().is_trained();
        if !trained {
            self.try_load();
        }

        let registry = self.registry.read();
        match registry.state() {
            Some(state) => predict_with(state, text, kind),
            None => PredictOutcome::Unavailable {
                reason: UnavailableReason::NotTrained,
            },
        }
    }

    /// Attempt to load persisted artifacts; false if anything is missing.
    fn try_load(&self) -> bool {
        let mut registry = self.registry.write();
        if registry.is_trained() {
            return true;
        }
        registry.load(&self.config.model_dir).is_ok()
    }
}

/// Run one model over normalized, vectorized text.
fn predict_with(
    state: &crate::trainer::TrainedState,
    text: &str,
    kind: ModelKind,
) -> PredictOutcome {
    let normalized = crate::analysis::normalize(text);
    let features = match state.vectorizer.transform(&normalized) {
        Ok(features) => features,
        Err(_) => {
            return PredictOutcome::Unavailable {
                reason: UnavailableReason::NotTrained,
            };
        }
    };

    match state.classifier(kind).predict_proba(&features) {
        Ok(probs) => PredictOutcome::Available {
            prediction: Prediction {
                label: probs.label(),
                confidence: probs.confidence(),
                spam_probability: probs.spam,
                ham_probability: probs.ham,
            },
        },
        Err(_) => PredictOutcome::Unavailable {
            reason: UnavailableReason::NotTrained,
        },
    }
}
