//! Classifier artifacts
//!
//! Trained models are exported as JSON objects tagged by `kind`. Decoding
//! only checks the JSON shape; internal consistency (node indices, feature
//! counts, matrix sizes) is checked when `predict` runs, so a broken
//! artifact can be selected and then fails per request.

pub mod boosting;
pub mod linear;
pub mod mlp;
pub mod tree;

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::models::errors::{AppError, AppResult};

pub use boosting::GradientBoosting;
pub use linear::LogisticRegression;
pub use mlp::{Activation, DenseLayer, Mlp};
pub use tree::{Node, RandomForest, Tree};

/// Failure raised by a model while predicting
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Row length differs from what the model was trained on
    FeatureCount { expected: usize, got: usize },
    /// Artifact is internally inconsistent
    InvalidModel(String),
    /// Scores came out NaN/inf
    NonFiniteScore,
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureCount { expected, got } => write!(
                f,
                "X has {} features, but the model is expecting {} features as input",
                got, expected
            ),
            Self::InvalidModel(msg) => write!(f, "invalid model: {}", msg),
            Self::NonFiniteScore => f.write_str("model produced a non-finite score"),
        }
    }
}

impl std::error::Error for InferenceError {}

/// `predict(features) -> labels` capability
pub trait Classifier: Send + Sync {
    /// One label per input row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError>;

    /// Model family name, for logs and the model listing
    fn family(&self) -> &'static str;
}

/// On-disk model artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticRegression),
    Mlp(Mlp),
}

impl ModelArtifact {
    /// Read and decode an artifact file
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| AppError::model_decode_failed(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::model_decode_failed(path, e))
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::RandomForest(m) => m,
            Self::GradientBoosting(m) => m,
            Self::LogisticRegression(m) => m,
            Self::Mlp(m) => m,
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
        self.inner().predict(rows)
    }

    fn family(&self) -> &'static str {
        self.inner().family()
    }
}

/// Per-feature standardisation applied before linear and MLP models
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_features(self.mean.len(), row)?;
        if self.scale.len() != self.mean.len() {
            return Err(InferenceError::InvalidModel(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // zero-variance features are left unscaled
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

pub(crate) fn check_features(expected: usize, row: &[f64]) -> Result<(), InferenceError> {
    if row.len() != expected {
        return Err(InferenceError::FeatureCount {
            expected,
            got: row.len(),
        });
    }
    Ok(())
}

/// Index of the largest score, first one on ties
pub(crate) fn argmax(scores: &[f64]) -> Result<usize, InferenceError> {
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(InferenceError::NonFiniteScore);
    }
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx)
        .ok_or_else(|| InferenceError::InvalidModel("no class scores".to_string()))
}

/// Label for a class index
pub(crate) fn class_label(classes: &[f64], idx: usize) -> Result<f64, InferenceError> {
    classes.get(idx).copied().ok_or_else(|| {
        InferenceError::InvalidModel(format!(
            "class index {} out of range for {} classes",
            idx,
            classes.len()
        ))
    })
}

/// Dot product with a length check
pub(crate) fn dot(weights: &[f64], row: &[f64]) -> Result<f64, InferenceError> {
    check_features(weights.len(), row)?;
    Ok(weights.iter().zip(row).map(|(w, x)| w * x).sum())
}
