//! Trained-model registry and JSON persistence.
//!
//! The registry holds the complete trained state as a single unit: either
//! nothing is trained, or the vectorizer and all three models are present
//! together. Readers can therefore never observe a half-replaced set.
//!
//! Durable storage is one pretty-printed JSON artifact per item
//! (`vectorizer.json` plus one file per model), each written to a temp file
//! and renamed so a prior snapshot is replaced atomically per artifact.
//! Loading is all-or-nothing: if any artifact is missing the registry is
//! left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MailsiftError, Result};
use crate::model::ModelKind;
use crate::trainer::TrainedState;

/// File name of the persisted vectorizer artifact.
pub const VECTORIZER_FILE: &str = "vectorizer.json";

/// In-memory registry of trained models and the shared vectorizer.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    state: Option<TrainedState>,
}

impl ModelRegistry {
    /// Create an empty, untrained registry.
    pub fn new() -> Self {
        ModelRegistry { state: None }
    }

    /// Whether a complete trained state is present.
    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// The current trained state, if any.
    pub fn state(&self) -> Option<&TrainedState> {
        self.state.as_ref()
    }

    /// Replace the registry contents wholesale with a freshly trained
    /// state. This is the only mutation besides [`ModelRegistry::load`].
    pub fn install(&mut self, state: TrainedState) {
        self.state = Some(state);
    }

    /// Serialize the vectorizer and every model to `dir`, one artifact
    /// each. Fails if the registry is untrained.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let state = self.state.as_ref().ok_or_else(|| {
            MailsiftError::model_not_available("registry is untrained; nothing to save")
        })?;

        fs::create_dir_all(dir)?;
        write_artifact(&dir.join(VECTORIZER_FILE), &state.vectorizer)?;
        write_artifact(
            &dir.join(ModelKind::NaiveBayes.artifact_name()),
            &state.naive_bayes,
        )?;
        write_artifact(&dir.join(ModelKind::Svm.artifact_name()), &state.svm)?;
        write_artifact(
            &dir.join(ModelKind::NeuralNetwork.artifact_name()),
            &state.neural_network,
        )?;
        Ok(())
    }

    /// Deserialize all artifacts from `dir` and replace the registry
    /// contents. If any artifact is absent the registry is left exactly as
    /// it was and a `PersistenceMissing` error is returned.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        let paths: Vec<PathBuf> = std::iter::once(dir.join(VECTORIZER_FILE))
            .chain(ModelKind::ALL.iter().map(|kind| dir.join(kind.artifact_name())))
            .collect();

        let missing: Vec<String> = paths
            .iter()
            .filter(|path| !path.exists())
            .map(|path| path.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MailsiftError::persistence_missing(format!(
                "missing artifacts: {}",
                missing.join(", ")
            )));
        }

        let state = TrainedState {
            vectorizer: read_artifact(&paths[0])?,
            naive_bayes: read_artifact(&paths[1])?,
            svm: read_artifact(&paths[2])?,
            neural_network: read_artifact(&paths[3])?,
        };
        self.state = Some(state);
        Ok(())
    }
}

/// Write one artifact via a temp file and rename.
fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::dataset::Sample;
    use crate::model::Label;
    use crate::trainer;

    fn trained_registry() -> ModelRegistry {
        let mut samples = Vec::new();
        for _ in 0..10 {
            samples.push(Sample {
                text: "win free cash now click here".to_string(),
                label: Label::Spam,
            });
            samples.push(Sample {
                text: "see you at the meeting tomorrow".to_string(),
                label: Label::Ham,
            });
        }
        let (state, _) = trainer::train(&samples).unwrap();
        let mut registry = ModelRegistry::new();
        registry.install(state);
        registry
    }

    #[test]
    fn test_new_registry_is_untrained() {
        let registry = ModelRegistry::new();
        assert!(!registry.is_trained());
        assert!(registry.state().is_none());
    }

    #[test]
    fn test_save_untrained_is_rejected() {
        let dir = TempDir::new().unwrap();
        let registry = ModelRegistry::new();
        let err = registry.save(dir.path()).unwrap_err();
        assert!(matches!(err, MailsiftError::ModelNotAvailable(_)));
    }

    #[test]
    fn test_save_writes_one_artifact_per_item() {
        let dir = TempDir::new().unwrap();
        let registry = trained_registry();
        registry.save(dir.path()).unwrap();

        assert!(dir.path().join(VECTORIZER_FILE).exists());
        for kind in ModelKind::ALL {
            assert!(dir.path().join(kind.artifact_name()).exists());
        }
    }

    #[test]
    fn test_load_missing_artifact_leaves_registry_untouched() {
        let dir = TempDir::new().unwrap();
        let registry = trained_registry();
        registry.save(dir.path()).unwrap();
        fs::remove_file(dir.path().join(ModelKind::Svm.artifact_name())).unwrap();

        let mut fresh = ModelRegistry::new();
        let err = fresh.load(dir.path()).unwrap_err();
        assert!(matches!(err, MailsiftError::PersistenceMissing(_)));
        assert!(!fresh.is_trained());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let registry = trained_registry();
        registry.save(dir.path()).unwrap();

        let mut restored = ModelRegistry::new();
        restored.load(dir.path()).unwrap();
        assert!(restored.is_trained());

        let original = registry.state().unwrap();
        let loaded = restored.state().unwrap();
        let probe = original
            .vectorizer
            .transform("free cash prize meeting")
            .unwrap();
        for kind in ModelKind::ALL {
            let before = original.classifier(kind).predict_proba(&probe).unwrap();
            let after = loaded.classifier(kind).predict_proba(&probe).unwrap();
            assert_eq!(before, after, "{kind} predictions drifted after reload");
        }
    }
}
