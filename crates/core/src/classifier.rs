//! Classifier adapter.
//!
//! The trained model sits behind the narrow [`DiseaseModel`] port: one binary feature vector in,
//! one label out. [`ClassifierAdapter`] is the only caller of the port and checks the input
//! shape before every prediction.
//!
//! [`LinearSvmModel`] is the concrete model: a linear support-vector classifier whose weights are
//! exported from the training pipeline to `model.json`.

use crate::catalog::DiseaseLabel;
use crate::constants::FEATURE_COUNT;
use crate::encoder::FeatureVector;
use crate::{DiagnosisError, DiagnosisResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Errors raised by a model implementation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    InputShape { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Port for a pre-trained disease classifier.
///
/// Implementations must be deterministic and free of side effects.
pub trait DiseaseModel: Send + Sync {
    /// Predict a label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InputShape` if `features` has the wrong width.
    fn predict(&self, features: &[u8]) -> Result<DiseaseLabel, ModelError>;

    /// Input width the model was trained with.
    fn n_features(&self) -> usize;
}

/// Shape-checking wrapper around a [`DiseaseModel`].
#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Arc<dyn DiseaseModel>,
    input_len: usize,
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("input_len", &self.input_len)
            .finish_non_exhaustive()
    }
}

impl ClassifierAdapter {
    /// Wrap a model that takes the standard 132-wide symptom vector.
    pub fn new(model: Arc<dyn DiseaseModel>) -> Self {
        Self {
            model,
            input_len: FEATURE_COUNT,
        }
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Run a single prediction.
    ///
    /// # Errors
    ///
    /// - `DiagnosisError::InvalidFeatureVector` if the vector width is wrong, or the model
    ///   rejects the input shape.
    /// - `DiagnosisError::NonBinaryFeature` if any value is not 0 or 1.
    /// - `DiagnosisError::Classifier` for any other model failure.
    pub fn classify(&self, features: &FeatureVector) -> DiagnosisResult<DiseaseLabel> {
        if features.len() != self.input_len {
            return Err(DiagnosisError::InvalidFeatureVector {
                expected: self.input_len,
                actual: features.len(),
            });
        }

        if let Some((position, value)) = features
            .as_slice()
            .iter()
            .enumerate()
            .find(|(_, value)| **value > 1)
        {
            return Err(DiagnosisError::NonBinaryFeature {
                position,
                value: *value,
            });
        }

        self.model
            .predict(features.as_slice())
            .map_err(|e| match e {
                ModelError::InputShape { expected, actual } => {
                    DiagnosisError::InvalidFeatureVector { expected, actual }
                }
                ModelError::Inference(msg) => DiagnosisError::Classifier(msg),
            })
    }
}

/// How pairwise or per-class decision values are turned into a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStrategy {
    /// One row per class pair `(i, j)`, `i < j`, in lexicographic order. A positive decision
    /// votes for `i`, otherwise `j`; the class with most votes wins, ties to the earlier class.
    #[default]
    Ovo,
    /// One row per class; the highest decision value wins, ties to the earlier class.
    Ovr,
}

/// Model parameters exported by the training pipeline.
///
/// `model.json` is written from the pickled scikit-learn `SVC(kernel="linear")` (`svc.pkl`):
///
/// - `classes` is `classes_`, the sorted training labels.
/// - `coef` is `coef_` and `intercept` is `intercept_`. With `strategy: "ovo"` there is one row
///   per class pair in libsvm order `(0,1), (0,2), .., (0,n-1), (1,2), ..`, indices into
///   `classes`.
/// - A positive decision `coef[k] . x + intercept[k]` votes for the first class of pair `k`.
///   That matches libsvm's own vote and scikit-learn's multi-class `coef_`.
/// - For two classes scikit-learn negates `coef_` and `intercept_` so that a positive value
///   means `classes_[1]`. The exporter flips both signs back, so the single row still votes for
///   `classes[0]` when positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearSvm {
    pub n_features: usize,
    pub classes: Vec<u32>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub strategy: DecisionStrategy,
}

/// Linear support-vector classifier evaluated in plain floating point.
#[derive(Debug, Clone)]
pub struct LinearSvmModel {
    n_features: usize,
    classes: Vec<DiseaseLabel>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    strategy: DecisionStrategy,
}

impl LinearSvmModel {
    /// Validate exported parameters and build the model.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::ModelLoad` if the parameter shapes are inconsistent.
    pub fn from_exported(exported: ExportedLinearSvm) -> DiagnosisResult<Self> {
        let n_classes = exported.classes.len();
        if exported.n_features == 0 {
            return Err(DiagnosisError::ModelLoad("n_features must be positive".into()));
        }
        if n_classes < 2 {
            return Err(DiagnosisError::ModelLoad(format!(
                "model needs at least 2 classes, found {n_classes}"
            )));
        }

        let expected_rows = match exported.strategy {
            DecisionStrategy::Ovo => n_classes * (n_classes - 1) / 2,
            DecisionStrategy::Ovr => n_classes,
        };
        if exported.coef.len() != expected_rows || exported.intercept.len() != expected_rows {
            return Err(DiagnosisError::ModelLoad(format!(
                "expected {expected_rows} coefficient rows and intercepts for {n_classes} classes, found {} and {}",
                exported.coef.len(),
                exported.intercept.len()
            )));
        }
        if let Some(row) = exported
            .coef
            .iter()
            .position(|row| row.len() != exported.n_features)
        {
            return Err(DiagnosisError::ModelLoad(format!(
                "coefficient row {row} does not have {} values",
                exported.n_features
            )));
        }

        Ok(Self {
            n_features: exported.n_features,
            classes: exported.classes.into_iter().map(DiseaseLabel).collect(),
            coef: exported.coef,
            intercept: exported.intercept,
            strategy: exported.strategy,
        })
    }

    /// # Errors
    ///
    /// Returns `DiagnosisError::ModelLoad` if the JSON is malformed or inconsistent.
    pub fn from_json_str(json: &str) -> DiagnosisResult<Self> {
        let exported: ExportedLinearSvm =
            serde_json::from_str(json).map_err(|e| DiagnosisError::ModelLoad(e.to_string()))?;
        Self::from_exported(exported)
    }

    /// # Errors
    ///
    /// Returns `DiagnosisError::DataLoad` if the file cannot be read, otherwise as
    /// [`LinearSvmModel::from_json_str`].
    pub fn from_path(path: &Path) -> DiagnosisResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| DiagnosisError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded model from {:?} (classes={}, n_features={}, strategy={:?})",
            path,
            model.classes.len(),
            model.n_features,
            model.strategy
        );

        Ok(model)
    }

    fn decision(&self, row: usize, features: &[u8]) -> f64 {
        self.coef[row]
            .iter()
            .zip(features)
            .map(|(w, x)| w * f64::from(*x))
            .sum::<f64>()
            + self.intercept[row]
    }

    fn predict_ovo(&self, features: &[u8]) -> usize {
        let n = self.classes.len();
        let mut votes = vec![0usize; n];
        let mut row = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.decision(row, features) > 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                row += 1;
            }
        }
        first_max_index(votes.iter().map(|v| *v as f64))
    }

    fn predict_ovr(&self, features: &[u8]) -> usize {
        first_max_index((0..self.classes.len()).map(|row| self.decision(row, features)))
    }
}

fn first_max_index(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, value) in values.enumerate() {
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}

impl DiseaseModel for LinearSvmModel {
    fn predict(&self, features: &[u8]) -> Result<DiseaseLabel, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::InputShape {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let winner = match self.strategy {
            DecisionStrategy::Ovo => self.predict_ovo(features),
            DecisionStrategy::Ovr => self.predict_ovr(features),
        };

        self.classes
            .get(winner)
            .copied()
            .ok_or_else(|| ModelError::Inference(format!("no class at index {winner}")))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
