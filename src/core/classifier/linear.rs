//! Logistic regression
//!
//! Softmax and the sigmoid are monotonic, so the predicted class is read
//! straight off the linear decision scores.

use serde::Deserialize;

use super::{argmax, class_label, dot, Classifier, InferenceError, StandardScaler};

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<f64>,
    /// One row per class, or a single row for binary models
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    pub fn decision_function(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if self.coef.len() != self.intercept.len() {
            return Err(InferenceError::InvalidModel(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }

        let scaled;
        let row = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(row)?;
                &scaled[..]
            }
            None => row,
        };

        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, b)| Ok(dot(weights, row)? + b))
            .collect()
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let scores = self.decision_function(row)?;
        if let [score] = scores.as_slice() {
            if !score.is_finite() {
                return Err(InferenceError::NonFiniteScore);
            }
            let idx = if *score > 0.0 { 1 } else { 0 };
            return class_label(&self.classes, idx);
        }
        class_label(&self.classes, argmax(&scores)?)
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn family(&self) -> &'static str {
        "logistic_regression"
    }
}
